use potfi_claims::{ClaimReceipt, ClaimRequest, PotStatus};
use potfi_core::amount::{format_token_amount, parse_token_amount};
use potfi_core::error::PotfiError;
use potfi_core::pot::PotClosure;
use potfi_core::types::{Balance, Bytes32, EthAddress, PotId};
use potfi_gate::Identity;
use serde::{Deserialize, Serialize};

fn parse_bytes32(field: &str, value: &str) -> Result<Bytes32, PotfiError> {
    Bytes32::from_hex(value).map_err(|_| PotfiError::InvalidRequest(format!("{field}: expected 32-byte hex")))
}

fn parse_address(field: &str, value: &str) -> Result<EthAddress, PotfiError> {
    EthAddress::from_hex(value).map_err(|_| PotfiError::InvalidRequest(format!("{field}: expected 20-byte hex address")))
}

fn hex0x(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

// ── Claim ────────────────────────────────────────────────────────────────────

/// Body of `potfi_claim`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcClaimRequest {
    pub pot_id: String,
    pub claimer_address: String,
    pub content_id: String,
    #[serde(default)]
    pub platform_user_id: Option<u64>,
}

impl RpcClaimRequest {
    pub fn parse(&self) -> Result<ClaimRequest, PotfiError> {
        Ok(ClaimRequest {
            pot_id: parse_bytes32("potId", &self.pot_id)?,
            claimer: parse_address("claimerAddress", &self.claimer_address)?,
            content_id: parse_bytes32("contentId", &self.content_id)?,
            platform_user_id: self.platform_user_id,
        })
    }
}

/// Outcome block of a claim response. Amounts are base units (u128 as
/// string) with a decimal `*Display` companion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcClaimOutcome {
    pub is_jackpot: bool,
    pub claim_amount: String,
    pub claim_amount_display: String,
    pub claim_index: u64,
    pub total_claims: u64,
    pub remaining_amount: String,
    pub remaining_amount_display: String,
    pub pot_closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcClaimResponse {
    /// Unix seconds.
    pub deadline: u64,
    pub content_id: String,
    /// 65-byte r ‖ s ‖ v, 0x-hex.
    pub signature: String,
    pub identity: Identity,
    pub outcome: RpcClaimOutcome,
    pub hash_v2: String,
    pub hash_v1: String,
}

impl From<ClaimReceipt> for RpcClaimResponse {
    fn from(r: ClaimReceipt) -> Self {
        let o = r.outcome;
        Self {
            deadline: r.deadline,
            content_id: r.content_id.to_hex(),
            signature: hex0x(&r.signature),
            identity: r.identity,
            outcome: RpcClaimOutcome {
                is_jackpot: o.is_jackpot,
                claim_amount: o.claim_amount.to_string(),
                claim_amount_display: format_token_amount(o.claim_amount),
                claim_index: o.claim_index,
                total_claims: o.total_claims,
                remaining_amount: o.remaining_amount.to_string(),
                remaining_amount_display: format_token_amount(o.remaining_amount),
                pot_closed: o.pot_closed,
            },
            hash_v2: hex0x(&r.hash_v2),
            hash_v1: hex0x(&r.hash_v1),
        }
    }
}

// ── Pot administration ───────────────────────────────────────────────────────

/// Body of `potfi_pots`, discriminated by `action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RpcPotAdminRequest {
    #[serde(rename_all = "camelCase")]
    Initialize {
        pot_id: String,
        /// Decimal token amount, e.g. "50" or "12.5".
        total_amount: String,
        #[serde(default)]
        creator_address: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Status { pot_id: String },
    #[serde(rename_all = "camelCase")]
    Reclaim { pot_id: String, creator_address: String },
}

/// Parsed form of [`RpcPotAdminRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PotAdminCommand {
    Initialize { pot_id: PotId, total_amount: Balance, creator: Option<EthAddress> },
    Status { pot_id: PotId },
    Reclaim { pot_id: PotId, creator: EthAddress },
}

impl RpcPotAdminRequest {
    pub fn parse(&self) -> Result<PotAdminCommand, PotfiError> {
        match self {
            Self::Initialize { pot_id, total_amount, creator_address } => Ok(PotAdminCommand::Initialize {
                pot_id: parse_bytes32("potId", pot_id)?,
                total_amount: parse_token_amount(total_amount)?,
                creator: creator_address
                    .as_deref()
                    .map(|a| parse_address("creatorAddress", a))
                    .transpose()?,
            }),
            Self::Status { pot_id } => Ok(PotAdminCommand::Status { pot_id: parse_bytes32("potId", pot_id)? }),
            Self::Reclaim { pot_id, creator_address } => Ok(PotAdminCommand::Reclaim {
                pot_id: parse_bytes32("potId", pot_id)?,
                creator: parse_address("creatorAddress", creator_address)?,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcPotStatus {
    pub pot_id: String,
    pub total_amount: String,
    pub total_amount_display: String,
    pub claim_count: u64,
    pub standard_claim_amount: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub is_active: bool,
    pub creator: Option<String>,
    /// "jackpot" or "reclaimed" once the pot is closed.
    pub closure: Option<String>,
    pub closed_at: Option<i64>,
    pub claimed_amount: String,
    pub claimed_amount_display: String,
    pub remaining_amount: String,
    pub remaining_amount_display: String,
    pub max_possible_claims: u64,
}

impl From<PotStatus> for RpcPotStatus {
    fn from(s: PotStatus) -> Self {
        let (closure, closed_at) = match s.state.closure {
            Some(PotClosure::Jackpot { at, .. }) => (Some("jackpot".to_string()), Some(at)),
            Some(PotClosure::Reclaimed { at, .. }) => (Some("reclaimed".to_string()), Some(at)),
            None => (None, None),
        };
        Self {
            pot_id: s.pot_id.to_hex(),
            total_amount: s.state.total_amount.to_string(),
            total_amount_display: format_token_amount(s.state.total_amount),
            claim_count: s.state.claim_count,
            standard_claim_amount: s.state.standard_claim_amount.to_string(),
            created_at: s.state.created_at,
            expires_at: s.expires_at,
            is_active: s.state.is_active,
            creator: s.state.creator.map(|c| c.to_checksum()),
            closure,
            closed_at,
            claimed_amount: s.claimed_amount.to_string(),
            claimed_amount_display: format_token_amount(s.claimed_amount),
            remaining_amount: s.remaining_amount.to_string(),
            remaining_amount_display: format_token_amount(s.remaining_amount),
            max_possible_claims: s.max_possible_claims,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReclaimResult {
    pub pot_id: String,
    pub reclaimed_amount: String,
    pub reclaimed_amount_display: String,
}

/// `initialize` and `status` return the pot status; `reclaim` the swept amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcPotAdminResponse {
    Status(RpcPotStatus),
    Reclaimed(RpcReclaimResult),
}

// ── Signer ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcSignerInfo {
    pub signer_address: String,
    pub chain_id: u64,
    pub ledger_address: String,
}
