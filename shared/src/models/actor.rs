//! Buyer identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// The party a cart or order belongs to
///
/// A registered buyer wins over a guest token when a request carries both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    Buyer { user_id: String },
    Guest { token: String },
}

impl Actor {
    pub fn buyer(user_id: impl Into<String>) -> Self {
        Self::Buyer {
            user_id: user_id.into(),
        }
    }

    pub fn guest(token: impl Into<String>) -> Self {
        Self::Guest {
            token: token.into(),
        }
    }

    /// Resolve an actor from optional request identities (user preferred).
    pub fn from_parts(buyer_user_id: Option<&str>, guest_token: Option<&str>) -> Option<Self> {
        let user_id = buyer_user_id.map(str::trim).filter(|s| !s.is_empty());
        let token = guest_token.map(str::trim).filter(|s| !s.is_empty());
        match (user_id, token) {
            (Some(user_id), _) => Some(Self::buyer(user_id)),
            (None, Some(token)) => Some(Self::guest(token)),
            (None, None) => None,
        }
    }

    /// Stable ownership key, `None` when the identity is blank
    pub fn key(&self) -> Option<ActorKey> {
        match self {
            Self::Buyer { user_id } => {
                let user_id = user_id.trim();
                (!user_id.is_empty()).then(|| ActorKey(format!("user:{}", user_id)))
            }
            Self::Guest { token } => {
                let token = token.trim();
                (!token.is_empty()).then(|| ActorKey(format!("guest:{}", token)))
            }
        }
    }

    pub fn buyer_user_id(&self) -> Option<&str> {
        match self {
            Self::Buyer { user_id } => Some(user_id.trim()),
            Self::Guest { .. } => None,
        }
    }

    pub fn guest_token(&self) -> Option<&str> {
        match self {
            Self::Guest { token } => Some(token.trim()),
            Self::Buyer { .. } => None,
        }
    }
}

/// `user:<id>` or `guest:<token>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorKey(String);

impl ActorKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
