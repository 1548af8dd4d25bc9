use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use potfi_core::error::PotfiError;
use potfi_core::pot::{PotConfig, Requirements};
use potfi_core::types::{Bytes32, EthAddress, PotId};
use potfi_crypto::selector;
use tracing::warn;

/// View function on the pot ledger returning
/// `(bytes32 contentId, bool requireLike, bool requireRecast, bool requireComment)`.
pub const POT_REQUIREMENTS_SIGNATURE: &str = "potRequirements(bytes32)";

/// Read access to the authoritative on-chain pot parameters.
#[async_trait]
pub trait PotLedger: Send + Sync {
    async fn pot_config(&self, pot_id: &PotId) -> Result<PotConfig, PotfiError>;
}

/// ABI-decode the `potRequirements` return data (four 32-byte words).
pub fn decode_pot_config(data: &[u8]) -> Result<PotConfig, PotfiError> {
    if data.len() < 4 * 32 {
        return Err(PotfiError::UpstreamUnavailable(format!(
            "malformed ledger response: {} bytes",
            data.len()
        )));
    }
    let word = |i: usize| &data[i * 32..(i + 1) * 32];
    let flag = |i: usize| word(i).iter().any(|b| *b != 0);

    let mut content_id = [0u8; 32];
    content_id.copy_from_slice(word(0));
    Ok(PotConfig {
        content_id: Bytes32::from_bytes(content_id),
        requirements: Requirements {
            require_like: flag(1),
            require_recast: flag(2),
            require_comment: flag(3),
        },
    })
}

// ── EthCallLedger ────────────────────────────────────────────────────────────

/// Reads pot parameters with `eth_call` against an EVM JSON-RPC endpoint.
pub struct EthCallLedger {
    rpc_url: String,
    ledger: EthAddress,
    client: reqwest::Client,
}

impl EthCallLedger {
    pub fn new(rpc_url: &str, ledger: EthAddress) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            ledger,
            client: reqwest::Client::new(),
        }
    }

    fn call_data(pot_id: &PotId) -> String {
        let mut data = selector(POT_REQUIREMENTS_SIGNATURE).to_vec();
        data.extend_from_slice(pot_id.as_bytes());
        format!("0x{}", hex::encode(data))
    }
}

#[async_trait]
impl PotLedger for EthCallLedger {
    async fn pot_config(&self, pot_id: &PotId) -> Result<PotConfig, PotfiError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [
                { "to": self.ledger.to_hex(), "data": Self::call_data(pot_id) },
                "latest"
            ],
            "id": 1
        });

        let resp = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "ledger rpc unreachable");
                PotfiError::UpstreamUnavailable("ledger rpc unreachable".into())
            })?;

        let json: serde_json::Value = resp.json().await.map_err(|e| {
            warn!(error = %e, "ledger rpc returned non-json");
            PotfiError::UpstreamUnavailable("ledger rpc returned invalid response".into())
        })?;

        if let Some(err) = json.get("error") {
            warn!(%pot_id, error = %err, "ledger eth_call failed");
            return Err(PotfiError::UpstreamUnavailable("ledger eth_call failed".into()));
        }

        let result = json["result"]
            .as_str()
            .ok_or_else(|| PotfiError::UpstreamUnavailable("ledger eth_call missing result".into()))?;
        let bytes = hex::decode(result.trim_start_matches("0x"))
            .map_err(|_| PotfiError::UpstreamUnavailable("ledger eth_call result not hex".into()))?;
        decode_pot_config(&bytes)
    }
}

// ── StaticLedger ─────────────────────────────────────────────────────────────

/// Fixed pot parameters held in memory. Unknown pots get `fallback`.
#[derive(Default)]
pub struct StaticLedger {
    pots: RwLock<HashMap<PotId, PotConfig>>,
    fallback: PotConfig,
}

impl StaticLedger {
    /// No requirements and no bound content for any pot.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn with_pot(self, pot_id: PotId, config: PotConfig) -> Self {
        self.set_pot(pot_id, config);
        self
    }

    pub fn set_pot(&self, pot_id: PotId, config: PotConfig) {
        self.pots.write().insert(pot_id, config);
    }
}

#[async_trait]
impl PotLedger for StaticLedger {
    async fn pot_config(&self, pot_id: &PotId) -> Result<PotConfig, PotfiError> {
        Ok(self.pots.read().get(pot_id).copied().unwrap_or(self.fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_four_words() {
        let mut data = vec![0u8; 128];
        data[..32].copy_from_slice(&[0x5c; 32]);
        data[63] = 1; // like
        data[127] = 1; // comment
        let cfg = decode_pot_config(&data).unwrap();
        assert_eq!(cfg.content_id, Bytes32::from_bytes([0x5c; 32]));
        assert!(cfg.requirements.require_like);
        assert!(!cfg.requirements.require_recast);
        assert!(cfg.requirements.require_comment);
    }

    #[test]
    fn short_response_is_upstream_failure() {
        let err = decode_pot_config(&[0u8; 96]).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn call_data_is_selector_plus_pot_id() {
        let pot_id = Bytes32::from_bytes([0xee; 32]);
        let data = EthCallLedger::call_data(&pot_id);
        assert_eq!(data.len(), 2 + 2 * (4 + 32));
        assert!(data.starts_with(&format!("0x{}", hex::encode(selector(POT_REQUIREMENTS_SIGNATURE)))));
        assert!(data.ends_with(&"ee".repeat(32)));
    }

    #[tokio::test]
    async fn static_ledger_falls_back_to_open_config() {
        let bound = PotConfig {
            content_id: Bytes32::from_bytes([1; 32]),
            requirements: Requirements { require_like: true, ..Default::default() },
        };
        let ledger = StaticLedger::open().with_pot(Bytes32::from_bytes([9; 32]), bound);
        assert_eq!(ledger.pot_config(&Bytes32::from_bytes([9; 32])).await.unwrap(), bound);
        assert_eq!(ledger.pot_config(&Bytes32::ZERO).await.unwrap(), PotConfig::default());
    }
}
