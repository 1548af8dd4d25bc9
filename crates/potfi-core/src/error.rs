use thiserror::Error;

use crate::pot::EngagementKind;

#[derive(Debug, Error)]
pub enum PotfiError {
    // ── Request errors ───────────────────────────────────────────────────────
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // ── Gate errors ──────────────────────────────────────────────────────────
    #[error("no identity found for the given platform id or address")]
    IdentityNotFound,

    #[error("required engagement missing: {0}")]
    EngagementMissing(EngagementKind),

    #[error("upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    // ── Pot errors ───────────────────────────────────────────────────────────
    #[error("pot not found: {0}")]
    PotNotFound(String),

    #[error("pot already initialized: {0}")]
    PotAlreadyExists(String),

    #[error("pot is closed")]
    PotInactive,

    #[error("pot expired at {expired_at}")]
    PotExpired { expired_at: i64 },

    #[error("pot has no claimable balance left")]
    PotExhausted,

    // ── Reclaim errors ───────────────────────────────────────────────────────
    #[error("pot cannot be reclaimed before {reclaimable_at}")]
    NotExpired { reclaimable_at: i64 },

    #[error("nothing left to reclaim")]
    NothingToReclaim,

    #[error("only the pot creator may reclaim")]
    NotPotCreator,

    // ── Serialization / storage / signing ────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("signing error: {0}")]
    Signing(String),
}

impl PotfiError {
    /// Stable machine-readable code returned to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::IdentityNotFound => "identity_not_found",
            Self::EngagementMissing(_) => "engagement_missing",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::PotNotFound(_) => "pot_not_found",
            Self::PotAlreadyExists(_) => "pot_already_exists",
            Self::PotInactive => "pot_inactive",
            Self::PotExpired { .. } => "pot_expired",
            Self::PotExhausted => "pot_exhausted",
            Self::NotExpired { .. } => "not_expired",
            Self::NothingToReclaim => "nothing_to_reclaim",
            Self::NotPotCreator => "not_pot_creator",
            Self::Serialization(_) | Self::Storage(_) | Self::Signing(_) => "internal_error",
        }
    }

    /// HTTP-style status for the error class.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::NotPotCreator => 403,
            Self::IdentityNotFound | Self::PotNotFound(_) => 404,
            Self::EngagementMissing(_) => 403,
            Self::PotAlreadyExists(_)
            | Self::PotExhausted
            | Self::NotExpired { .. }
            | Self::NothingToReclaim => 409,
            Self::PotInactive | Self::PotExpired { .. } => 410,
            Self::UpstreamUnavailable(_) => 503,
            Self::Serialization(_) | Self::Storage(_) | Self::Signing(_) => 500,
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_))
    }

    /// Message safe to hand back to callers. Internal failures are collapsed
    /// so that storage or upstream detail never leaves the service.
    pub fn public_message(&self) -> String {
        match self {
            Self::UpstreamUnavailable(_) => "upstream service unavailable, retry later".into(),
            Self::Serialization(_) | Self::Storage(_) | Self::Signing(_) => "internal error".into(),
            other => other.to_string(),
        }
    }
}
