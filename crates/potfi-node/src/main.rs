//! potfi-node: the PotFi gating/permit service binary.
//!
//! Startup sequence:
//!   1. Open the pot store (sled under `--data-dir`, or in-memory)
//!   2. Load the permit signer key
//!   3. Wire the ledger reader and social API clients into the engagement gate
//!   4. Start the JSON-RPC 2.0 server and serve until Ctrl-C
//!   5. Stop the server, then flush the pot store

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use potfi_claims::{ClaimService, ServiceConfig};
use potfi_core::amount::parse_token_amount;
use potfi_core::constants::{DEFAULT_CHAIN_ID, DEFAULT_UPSTREAM_TIMEOUT_MS};
use potfi_core::types::EthAddress;
use potfi_crypto::PermitSigner;
use potfi_gate::{
    EngagementGate, EngagementOracle, EthCallLedger, HttpSocialApi, IdentityResolver,
    InMemorySocialGraph, PotLedger, StaticLedger,
};
use potfi_jackpot::OsRandom;
use potfi_rpc::{RpcServer, RpcServerState};
use potfi_state::{MemoryPotStore, PotStore, SledPotStore};

#[derive(Parser, Debug)]
#[command(
    name = "potfi-node",
    version,
    about = "PotFi gating service: engagement checks, jackpot draws and claim permits"
)]
struct Args {
    /// JSON-RPC listen address.
    #[arg(long, env = "POTFI_RPC_ADDR", default_value = "127.0.0.1:8547")]
    rpc_addr: SocketAddr,

    /// Directory for the persistent pot store.
    #[arg(long, env = "POTFI_DATA_DIR", default_value = "~/.potfi/data")]
    data_dir: PathBuf,

    /// Keep pot state in memory only; it is lost on restart.
    #[arg(long, env = "POTFI_IN_MEMORY")]
    in_memory: bool,

    /// Hex secp256k1 secret key used to sign permits.
    #[arg(long, env = "POTFI_SIGNER_KEY", hide_env_values = true)]
    signer_key: Option<String>,

    /// Chain id bound into V2 permits.
    #[arg(long, env = "POTFI_CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    chain_id: u64,

    /// Pot ledger contract address bound into V2 permits.
    #[arg(long, env = "POTFI_LEDGER_ADDRESS")]
    ledger_address: Option<EthAddress>,

    /// EVM JSON-RPC endpoint used to read pot requirements from the ledger.
    #[arg(long, env = "POTFI_ETH_RPC_URL")]
    eth_rpc_url: Option<String>,

    /// Base URL of the social platform API.
    #[arg(long, env = "POTFI_SOCIAL_API_URL")]
    social_api_url: Option<String>,

    /// API key sent as `x-api-key` to the social platform API.
    #[arg(long, env = "POTFI_SOCIAL_API_KEY", hide_env_values = true)]
    social_api_key: Option<String>,

    /// Reject claims whose platform user id is not linked to the claimer address.
    #[arg(long, env = "POTFI_REQUIRE_LINKED_ADDRESS")]
    require_linked_address: bool,

    /// Bound on each upstream call, in milliseconds.
    #[arg(long, env = "POTFI_UPSTREAM_TIMEOUT_MS", default_value_t = DEFAULT_UPSTREAM_TIMEOUT_MS)]
    upstream_timeout_ms: u64,

    /// Token total assumed for pots first seen through a claim.
    #[arg(long, env = "POTFI_DEFAULT_POT_AMOUNT", default_value = "50")]
    default_pot_amount: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,potfi=debug")),
        )
        .init();

    let args = Args::parse();
    info!("PotFi node starting");

    // ── Pot store ─────────────────────────────────────────────────────────────
    if args.in_memory {
        warn!("--in-memory: pot state will not survive a restart");
        run(MemoryPotStore::new(), &args).await
    } else {
        let data_dir = expand_tilde(&args.data_dir);
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("creating data dir {}", data_dir.display()))?;
        let store = SledPotStore::open(&data_dir).context("opening pot store")?;
        info!(path = %data_dir.display(), pots = store.len(), "pot store opened");
        run(store, &args).await
    }
}

async fn run<S: PotStore>(store: S, args: &Args) -> anyhow::Result<()> {
    // ── Signer ────────────────────────────────────────────────────────────────
    let signer = match &args.signer_key {
        Some(key) => PermitSigner::from_hex(key).context("parsing --signer-key")?,
        None => {
            warn!("No --signer-key provided. Generating ephemeral key. DO NOT USE IN PRODUCTION.");
            PermitSigner::generate()
        }
    };
    info!(signer = %signer.address(), "permit signer loaded");

    let ledger_address = args.ledger_address.unwrap_or_else(|| {
        warn!("No --ledger-address provided; permits are bound to the zero address");
        EthAddress::default()
    });

    let config = ServiceConfig {
        chain_id: args.chain_id,
        ledger_address,
        upstream_timeout: Duration::from_millis(args.upstream_timeout_ms),
        default_pot_amount: parse_token_amount(&args.default_pot_amount)
            .context("parsing --default-pot-amount")?,
    };

    // ── Upstream clients ──────────────────────────────────────────────────────
    let ledger: Arc<dyn PotLedger> = match &args.eth_rpc_url {
        Some(url) => {
            info!(%url, ledger = %ledger_address, "reading pot requirements via eth_call");
            Arc::new(EthCallLedger::new(url, ledger_address))
        }
        None => {
            warn!("No --eth-rpc-url provided; pots have no engagement requirements");
            Arc::new(StaticLedger::open())
        }
    };

    let (resolver, oracle): (Arc<dyn IdentityResolver>, Arc<dyn EngagementOracle>) =
        match &args.social_api_url {
            Some(url) => {
                let api = Arc::new(HttpSocialApi::new(url, args.social_api_key.clone()));
                (api.clone(), api)
            }
            None => {
                warn!("No --social-api-url provided; no claimer identity will resolve");
                let graph = Arc::new(InMemorySocialGraph::new());
                (graph.clone(), graph)
            }
        };

    let store = Arc::new(store);
    let gate = EngagementGate::new(resolver, oracle, ledger, config.upstream_timeout)
        .require_linked_address(args.require_linked_address);
    let service = Arc::new(ClaimService::new(
        Arc::clone(&store),
        gate,
        Arc::new(signer),
        Arc::new(OsRandom),
        config,
    ));

    // ── RPC server ────────────────────────────────────────────────────────────
    let rpc_state = Arc::new(RpcServerState { service });
    let (rpc_handle, _) = RpcServer::new(rpc_state)
        .start(args.rpc_addr)
        .await
        .context("starting RPC server")?;

    info!("node ready");
    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("shutting down");
    rpc_handle.stop().ok();
    rpc_handle.stopped().await;
    store.flush().context("flushing pot store")?;
    info!("pot store flushed");
    Ok(())
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
