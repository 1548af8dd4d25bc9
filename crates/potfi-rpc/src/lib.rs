//! potfi-rpc
//!
//! JSON-RPC 2.0 front end for the claim service.
//!
//! Namespace: "potfi"
//! Methods:
//!   potfi_claim       — gate a claim and return a signed permit
//!   potfi_pots        — pot administration (`action`: initialize | status | reclaim)
//!   potfi_signerInfo  — signer address and permit domain

pub mod api;
pub mod server;
pub mod types;

pub use jsonrpsee::server::ServerHandle;
pub use server::{RpcServer, RpcServerState};
pub use types::{
    RpcClaimOutcome, RpcClaimRequest, RpcClaimResponse, RpcPotAdminRequest, RpcPotAdminResponse,
    RpcPotStatus, RpcReclaimResult, RpcSignerInfo,
};
