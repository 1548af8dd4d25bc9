use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use crate::types::{
    RpcClaimRequest, RpcClaimResponse, RpcPotAdminRequest, RpcPotAdminResponse, RpcSignerInfo,
};

/// PotFi JSON-RPC 2.0 API definition.
///
/// All method names are prefixed with "potfi_" via `namespace = "potfi"`.
#[rpc(server, namespace = "potfi")]
pub trait PotfiApi {
    /// Verify identity and engagement, decide the outcome and return a
    /// signed permit for the pot ledger's `claim()`.
    #[method(name = "claim")]
    async fn claim(&self, request: RpcClaimRequest) -> RpcResult<RpcClaimResponse>;

    /// Initialize a pot, read its status, or reclaim it after expiry.
    #[method(name = "pots")]
    async fn pots(&self, request: RpcPotAdminRequest) -> RpcResult<RpcPotAdminResponse>;

    /// Address the ledger must trust, and the domain permits are bound to.
    #[method(name = "signerInfo")]
    async fn signer_info(&self) -> RpcResult<RpcSignerInfo>;
}
