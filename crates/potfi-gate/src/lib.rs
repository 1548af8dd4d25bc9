//! potfi-gate
//!
//! Engagement Gate and the off-chain collaborators it talks to:
//!   IdentityResolver — address / platform id → canonical identity
//!   EngagementOracle — did this identity like / recast / reply to content?
//!   PotLedger        — per-pot requirement flags from the on-chain ledger
//!
//! HTTP-backed implementations live in `social` and `ledger`; `memory`
//! holds in-process ones for local development and tests.

pub mod gate;
pub mod ledger;
pub mod memory;
pub mod oracle;
pub mod social;

pub use gate::EngagementGate;
pub use ledger::{EthCallLedger, PotLedger, StaticLedger};
pub use memory::InMemorySocialGraph;
pub use oracle::{EngagementOracle, EngagementStatus, Identity, IdentityResolver};
pub use social::HttpSocialApi;
