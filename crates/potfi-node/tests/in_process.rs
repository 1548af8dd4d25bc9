//! Claim flow through the JSON-RPC server, run in process with in-memory
//! social graph, ledger and store.
//!
//! Run with:
//!   cargo test -p potfi-node --test in_process

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use potfi_claims::{ClaimService, ServiceConfig};
use potfi_core::pot::{PotConfig, Requirements};
use potfi_core::types::{Bytes32, EthAddress};
use potfi_crypto::{recover_signer, PermitSigner};
use potfi_gate::{EngagementGate, EngagementStatus, Identity, InMemorySocialGraph, StaticLedger};
use potfi_jackpot::SequenceRandom;
use potfi_rpc::{RpcServer, RpcServerState, ServerHandle};
use potfi_state::MemoryPotStore;

const CLAIMER: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";
const OPEN_POT: &str = "0x0101010101010101010101010101010101010101010101010101010101010101";
const GATED_POT: &str = "0x0202020202020202020202020202020202020202020202020202020202020202";
const CONTENT: &str = "0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0";

struct TestNode {
    url: String,
    signer: EthAddress,
    _handle: ServerHandle,
}

async fn start_node(roll: f64) -> TestNode {
    let claimer = EthAddress::from_hex(CLAIMER).unwrap();
    let content = Bytes32::from_hex(CONTENT).unwrap();

    let graph = Arc::new(InMemorySocialGraph::new());
    graph.add_user(
        Identity { platform_user_id: 3, handle: "carol".into(), display_name: "Carol".into() },
        [claimer],
    );
    graph.set_engagement(3, content, EngagementStatus { liked: false, recasted: true, replied: true });

    let gated = PotConfig {
        content_id: content,
        requirements: Requirements { require_like: true, require_recast: true, require_comment: false },
    };
    let ledger = Arc::new(StaticLedger::open().with_pot(Bytes32::from_hex(GATED_POT).unwrap(), gated));

    let signer = PermitSigner::generate();
    let signer_address = signer.address();
    let gate = EngagementGate::new(graph.clone(), graph, ledger, Duration::from_secs(2));
    let service = Arc::new(ClaimService::new(
        Arc::new(MemoryPotStore::new()),
        gate,
        Arc::new(signer),
        Arc::new(SequenceRandom::constant(roll)),
        ServiceConfig { chain_id: 31337, ..ServiceConfig::default() },
    ));

    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let (handle, local) = RpcServer::new(Arc::new(RpcServerState { service }))
        .start(addr)
        .await
        .expect("start rpc server");

    TestNode { url: format!("http://{local}"), signer: signer_address, _handle: handle }
}

async fn rpc_raw(url: &str, method: &str, params: serde_json::Value) -> serde_json::Value {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1
    });
    reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap_or_else(|e| panic!("RPC call {method} failed: {e}"))
        .json()
        .await
        .expect("parse RPC JSON")
}

fn claim_params(pot: &str) -> serde_json::Value {
    serde_json::json!([{
        "potId": pot,
        "claimerAddress": CLAIMER,
        "contentId": CONTENT,
        "platformUserId": 3,
    }])
}

fn decode_hex<const N: usize>(s: &str) -> [u8; N] {
    let bytes = hex::decode(s.trim_start_matches("0x")).unwrap();
    bytes.try_into().unwrap()
}

#[tokio::test]
async fn standard_claim_returns_verifiable_permit() {
    let node = start_node(0.9).await;

    let resp = rpc_raw(&node.url, "potfi_claim", claim_params(OPEN_POT)).await;
    let result = &resp["result"];
    assert!(resp.get("error").is_none(), "unexpected error: {resp}");

    assert_eq!(result["identity"]["platformUserId"], 3);
    assert_eq!(result["identity"]["handle"], "carol");
    assert_eq!(result["contentId"], CONTENT);
    assert_eq!(result["outcome"]["isJackpot"], false);
    assert_eq!(result["outcome"]["claimAmountDisplay"], "0.01");
    assert_eq!(result["outcome"]["claimAmount"], "10000000000000000");
    assert_eq!(result["outcome"]["claimIndex"], 0);
    assert_eq!(result["outcome"]["totalClaims"], 1);
    assert_eq!(result["outcome"]["remainingAmountDisplay"], "49.99");

    let hash_v2: [u8; 32] = decode_hex(result["hashV2"].as_str().unwrap());
    let signature: [u8; 65] = decode_hex(result["signature"].as_str().unwrap());
    assert_eq!(recover_signer(&hash_v2, &signature).unwrap(), node.signer);
    assert_ne!(result["hashV1"], result["hashV2"]);

    let second = rpc_raw(&node.url, "potfi_claim", claim_params(OPEN_POT)).await;
    assert_eq!(second["result"]["outcome"]["claimIndex"], 1);
}

#[tokio::test]
async fn gated_pot_reports_first_missing_engagement() {
    let node = start_node(0.9).await;

    let resp = rpc_raw(&node.url, "potfi_claim", claim_params(GATED_POT)).await;
    assert_eq!(resp["error"]["data"]["error"], "engagement_missing");
    assert_eq!(resp["error"]["data"]["status"], 403);
    assert_eq!(resp["error"]["message"], "required engagement missing: like");

    let status = rpc_raw(
        &node.url,
        "potfi_pots",
        serde_json::json!([{ "action": "status", "potId": GATED_POT }]),
    )
    .await;
    assert_eq!(status["error"]["data"]["error"], "pot_not_found");
}

#[tokio::test]
async fn jackpot_closes_the_pot() {
    let node = start_node(0.0001).await;

    let resp = rpc_raw(&node.url, "potfi_claim", claim_params(OPEN_POT)).await;
    assert_eq!(resp["result"]["outcome"]["isJackpot"], true);
    assert_eq!(resp["result"]["outcome"]["claimAmountDisplay"], "50");
    assert_eq!(resp["result"]["outcome"]["potClosed"], true);

    let again = rpc_raw(&node.url, "potfi_claim", claim_params(OPEN_POT)).await;
    assert_eq!(again["error"]["data"]["error"], "pot_inactive");

    let status = rpc_raw(
        &node.url,
        "potfi_pots",
        serde_json::json!([{ "action": "status", "potId": OPEN_POT }]),
    )
    .await;
    assert_eq!(status["result"]["closure"], "jackpot");
    assert_eq!(status["result"]["claimCount"], 1);
    assert_eq!(status["result"]["remainingAmount"], "0");
}
