//! Core - engine config, errors and service wiring
//!
//! # Layout
//!
//! - [`EngineConfig`] - engine configuration
//! - [`Marketplace`] - wiring and entry point
//! - [`CommerceError`] / [`MarketError`] - error types

pub mod config;
pub mod error;
pub mod marketplace;

pub use config::EngineConfig;
pub use error::{CommerceError, CommerceResult, MarketError, MarketResult};
pub use marketplace::Marketplace;
