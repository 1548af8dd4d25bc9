//! potfi-claims
//!
//! Claim Orchestrator: sequences identity resolution, engagement checks,
//! outcome evaluation and permit signing for each claim, and serves the
//! administrative initialize / status / reclaim operations against the same
//! store instance.

pub mod config;
pub mod service;

pub use config::ServiceConfig;
pub use service::{ClaimReceipt, ClaimRequest, ClaimService, PotStatus};
