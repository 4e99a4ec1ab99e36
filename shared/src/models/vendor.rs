//! Vendor Model

use serde::{Deserialize, Serialize};

/// Vendor onboarding state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    #[default]
    Pending,
    Verified,
    Rejected,
    Suspended,
}

/// What the engine needs to know about a vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorProfile {
    pub vendor_id: String,
    pub verification_state: VerificationState,
    /// Per-vendor commission in basis points; `None` uses the platform default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_override_bps: Option<u32>,
}

impl VendorProfile {
    pub fn is_verified(&self) -> bool {
        self.verification_state == VerificationState::Verified
    }

    pub fn commission_bps(&self, default_bps: u32) -> u32 {
        self.commission_override_bps.unwrap_or(default_bps)
    }
}
