//! potfi-core::pot
//!
//! Claim-progress state for a single pot, plus the engagement requirements the
//! ledger attaches to it.
//!
//! The ledger is authoritative for funds; `total_amount` here is advisory and
//! only drives jackpot sizing and budget checks.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{POT_EXPIRY_SECS, STANDARD_CLAIM_AMOUNT};
use crate::types::{Balance, ContentId, EthAddress, Timestamp};

// ── PotClosure ───────────────────────────────────────────────────────────────

/// Why a pot stopped accepting claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PotClosure {
    /// A jackpot paid out the unclaimed remainder.
    Jackpot { amount: Balance, at: Timestamp },
    /// The creator swept the remainder after expiry.
    Reclaimed { amount: Balance, at: Timestamp },
}

// ── PotState ─────────────────────────────────────────────────────────────────

/// Mutable claim progress for one pot.
///
/// Invariants:
/// - `claim_count` never decreases.
/// - `is_active` only ever goes `true → false`; `closure` is set at the same time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotState {
    pub total_amount: Balance,
    pub claim_count: u64,
    pub standard_claim_amount: Balance,
    pub created_at: Timestamp,
    pub is_active: bool,
    /// Set when the pot was explicitly initialized by its creator.
    pub creator: Option<EthAddress>,
    pub closure: Option<PotClosure>,
}

impl PotState {
    pub fn new(total_amount: Balance, created_at: Timestamp, creator: Option<EthAddress>) -> Self {
        Self {
            total_amount,
            claim_count: 0,
            standard_claim_amount: STANDARD_CLAIM_AMOUNT,
            created_at,
            is_active: true,
            creator,
            closure: None,
        }
    }

    /// Sum of standard claims processed so far, capped at the pot total.
    fn standard_claims_total(&self) -> Balance {
        (self.claim_count as Balance)
            .saturating_mul(self.standard_claim_amount)
            .min(self.total_amount)
    }

    /// Funds still claimable. Always zero once the pot is closed.
    pub fn remaining_amount(&self) -> Balance {
        if !self.is_active {
            return 0;
        }
        self.total_amount.saturating_sub(self.standard_claims_total())
    }

    /// Funds that have left the pot through claims (standard or jackpot).
    pub fn claimed_amount(&self) -> Balance {
        match &self.closure {
            Some(PotClosure::Jackpot { .. }) => self.total_amount,
            _ => self.standard_claims_total(),
        }
    }

    /// Upper bound on standard claims the pot total can fund.
    pub fn max_possible_claims(&self) -> u64 {
        if self.standard_claim_amount == 0 {
            return 0;
        }
        (self.total_amount / self.standard_claim_amount).min(u64::MAX as u128) as u64
    }

    /// Moment after which claims stop and reclaim becomes possible.
    pub fn expires_at(&self) -> Timestamp {
        self.created_at.saturating_add(POT_EXPIRY_SECS)
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at()
    }
}

// ── Engagement ───────────────────────────────────────────────────────────────

/// A social action a pot may require. Order of declaration is the order in
/// which requirements are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementKind {
    Like,
    Recast,
    Comment,
}

impl fmt::Display for EngagementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Like => "like",
            Self::Recast => "recast",
            Self::Comment => "comment",
        };
        f.write_str(s)
    }
}

/// Engagement flags configured on the ledger for a pot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    pub require_like: bool,
    pub require_recast: bool,
    pub require_comment: bool,
}

impl Requirements {
    pub fn any(&self) -> bool {
        self.require_like || self.require_recast || self.require_comment
    }

    /// Required kinds in check order (like, recast, comment).
    pub fn required(&self) -> impl Iterator<Item = EngagementKind> {
        [
            (self.require_like, EngagementKind::Like),
            (self.require_recast, EngagementKind::Recast),
            (self.require_comment, EngagementKind::Comment),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
    }
}

/// Per-pot parameters read from the on-chain ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotConfig {
    /// Zero when the pot is not bound to a particular piece of content.
    pub content_id: ContentId,
    #[serde(flatten)]
    pub requirements: Requirements,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNITS_PER_TOKEN;

    #[test]
    fn fresh_pot_accounting() {
        let pot = PotState::new(50 * UNITS_PER_TOKEN, 1_000, None);
        assert!(pot.is_active);
        assert_eq!(pot.claimed_amount(), 0);
        assert_eq!(pot.remaining_amount(), 50 * UNITS_PER_TOKEN);
        assert_eq!(pot.max_possible_claims(), 5_000);
        assert_eq!(pot.expires_at(), 1_000 + 12 * 3600);
    }

    #[test]
    fn closed_pot_has_nothing_remaining() {
        let mut pot = PotState::new(UNITS_PER_TOKEN, 0, None);
        pot.claim_count = 3;
        pot.is_active = false;
        pot.closure = Some(PotClosure::Jackpot { amount: 97 * STANDARD_CLAIM_AMOUNT, at: 10 });
        assert_eq!(pot.remaining_amount(), 0);
        assert_eq!(pot.claimed_amount(), UNITS_PER_TOKEN);
    }

    #[test]
    fn expiry_is_strictly_after_twelve_hours() {
        let pot = PotState::new(UNITS_PER_TOKEN, 0, None);
        assert!(!pot.is_expired(12 * 3600));
        assert!(pot.is_expired(12 * 3600 + 1));
    }

    #[test]
    fn requirements_iterate_in_check_order() {
        let req = Requirements { require_like: true, require_recast: false, require_comment: true };
        let kinds: Vec<_> = req.required().collect();
        assert_eq!(kinds, vec![EngagementKind::Like, EngagementKind::Comment]);
        assert!(!Requirements::default().any());
    }
}
