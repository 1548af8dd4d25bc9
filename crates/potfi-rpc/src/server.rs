use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObject;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use potfi_claims::ClaimService;
use potfi_core::amount::format_token_amount;
use potfi_core::error::PotfiError;
use potfi_state::PotStore;

use crate::api::PotfiApiServer;
use crate::types::{
    PotAdminCommand, RpcClaimRequest, RpcClaimResponse, RpcPotAdminRequest, RpcPotAdminResponse,
    RpcReclaimResult, RpcSignerInfo,
};

const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;
/// Application errors (gate, pot and reclaim failures).
const SERVER_ERROR: i32 = -32000;

/// Map a service error to a JSON-RPC error object.
///
/// `message` is the public message; `data` carries the stable error code,
/// the HTTP-style status and whether the request may be retried unchanged.
pub fn rpc_err(e: &PotfiError) -> ErrorObject<'static> {
    let code = match e.http_status() {
        400 => INVALID_PARAMS,
        500 => INTERNAL_ERROR,
        _ => SERVER_ERROR,
    };
    if code == INTERNAL_ERROR {
        error!(error = %e, "internal error");
    }
    ErrorObject::owned(
        code,
        e.public_message(),
        Some(serde_json::json!({
            "error": e.code(),
            "status": e.http_status(),
            "retryable": e.is_retryable(),
        })),
    )
}

/// Shared state passed to the RPC server.
pub struct RpcServerState<S: PotStore> {
    pub service: Arc<ClaimService<S>>,
}

/// The RPC server implementation.
pub struct RpcServer<S: PotStore> {
    state: Arc<RpcServerState<S>>,
}

impl<S: PotStore> RpcServer<S> {
    pub fn new(state: Arc<RpcServerState<S>>) -> Self {
        Self { state }
    }

    /// Start the JSON-RPC server on `addr` with permissive CORS. Returns a
    /// handle to stop it and the bound address.
    pub async fn start(self, addr: SocketAddr) -> anyhow::Result<(ServerHandle, SocketAddr)> {
        let middleware = tower::ServiceBuilder::new().layer(CorsLayer::permissive());
        let server = Server::builder()
            .set_http_middleware(middleware)
            .build(addr)
            .await?;
        let local = server.local_addr()?;
        let module = self.into_rpc();
        let handle = server.start(module);
        info!(addr = %local, "RPC server started");
        Ok((handle, local))
    }
}

#[async_trait]
impl<S: PotStore> PotfiApiServer for RpcServer<S> {
    async fn claim(&self, request: RpcClaimRequest) -> RpcResult<RpcClaimResponse> {
        let req = request.parse().map_err(|e| rpc_err(&e))?;
        let receipt = self
            .state
            .service
            .claim(&req)
            .await
            .map_err(|e| rpc_err(&e))?;
        Ok(receipt.into())
    }

    async fn pots(&self, request: RpcPotAdminRequest) -> RpcResult<RpcPotAdminResponse> {
        let service = &self.state.service;
        let command = request.parse().map_err(|e| rpc_err(&e))?;
        let resp = match command {
            PotAdminCommand::Initialize { pot_id, total_amount, creator } => service
                .initialize(&pot_id, total_amount, creator)
                .map(|s| RpcPotAdminResponse::Status(s.into())),
            PotAdminCommand::Status { pot_id } => service
                .status(&pot_id)
                .map(|s| RpcPotAdminResponse::Status(s.into())),
            PotAdminCommand::Reclaim { pot_id, creator } => {
                service.reclaim(&pot_id, &creator).map(|amount| {
                    RpcPotAdminResponse::Reclaimed(RpcReclaimResult {
                        pot_id: pot_id.to_hex(),
                        reclaimed_amount: amount.to_string(),
                        reclaimed_amount_display: format_token_amount(amount),
                    })
                })
            }
        };
        resp.map_err(|e| rpc_err(&e))
    }

    async fn signer_info(&self) -> RpcResult<RpcSignerInfo> {
        let service = &self.state.service;
        Ok(RpcSignerInfo {
            signer_address: service.signer_address().to_checksum(),
            chain_id: service.config().chain_id,
            ledger_address: service.config().ledger_address.to_checksum(),
        })
    }
}
