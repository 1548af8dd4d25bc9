/// ─── PotFi Gating Constants ─────────────────────────────────────────────────
///
/// Values shared with the on-chain pot ledger. Changing any of them changes
/// what the ledger will accept, so they are not runtime-configurable.
///
/// Base unit: wei-style integer, 18 decimals (1 token = 10^18 units).

// ── Amounts ──────────────────────────────────────────────────────────────────

/// Number of fractional decimal digits of the claimable asset.
pub const TOKEN_DECIMALS: u32 = 18;

/// 1 token expressed in base units.
pub const UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Fixed payout for a non-jackpot claim: 0.01 token.
pub const STANDARD_CLAIM_AMOUNT: u128 = UNITS_PER_TOKEN / 100;

/// Total assumed for a pot first seen through a claim (50 tokens).
pub const DEFAULT_POT_AMOUNT: u128 = 50 * UNITS_PER_TOKEN;

// ── Pot lifetime ─────────────────────────────────────────────────────────────

/// A pot stops accepting claims this long after creation; the creator may
/// then reclaim whatever is left.
pub const POT_EXPIRY_SECS: i64 = 12 * 3600;

// ── Jackpot probability model ────────────────────────────────────────────────

pub const JACKPOT_BASE_CHANCE: f64 = 0.01;

/// Added per claim already processed.
pub const JACKPOT_CHANCE_PER_CLAIM: f64 = 0.001;

/// Added per hour elapsed since pot creation.
pub const JACKPOT_CHANCE_PER_HOUR: f64 = 0.0005;

/// Hard ceiling on the jackpot probability.
pub const JACKPOT_MAX_CHANCE: f64 = 0.50;

// ── Permits ──────────────────────────────────────────────────────────────────

/// Permit validity window. Not configurable per request.
pub const PERMIT_TTL_SECS: i64 = 3600;

/// Type string bound into V2 (domain-separated) permit digests.
pub const PERMIT_V2_TYPE: &str = "PotFiPermit(address,bytes32,uint256,bytes32,address,uint256)";

/// Type string bound into legacy V1 permit digests.
pub const PERMIT_V1_TYPE: &str = "PotFiPermit(address,bytes32,uint256,bytes32)";

// ── Upstream calls ───────────────────────────────────────────────────────────

/// Default bound on each identity / engagement / ledger call.
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 5_000;

/// Base mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 8453;
