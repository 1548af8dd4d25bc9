use potfi_core::constants::{
    JACKPOT_BASE_CHANCE, JACKPOT_CHANCE_PER_CLAIM, JACKPOT_CHANCE_PER_HOUR, JACKPOT_MAX_CHANCE,
};
use potfi_core::pot::{PotClosure, PotState};
use potfi_core::types::{Balance, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::random::RandomSource;

/// Result of one outcome evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimOutcome {
    pub is_jackpot: bool,
    pub claim_amount: Balance,
    /// `claim_count` observed before this claim.
    pub claim_index: u64,
    /// `claim_count` after this claim.
    pub total_claims: u64,
    pub remaining_amount: Balance,
    pub pot_closed: bool,
    /// Probability the draw was compared against.
    pub chance: f64,
}

/// Jackpot probability for a pot that has processed `claim_count` claims and
/// was created at `created_at`:
///
///   min(0.01 + claim_count·0.001 + hours_elapsed·0.0005, 0.50)
///
/// Elapsed time before creation (clock skew) counts as zero.
pub fn jackpot_chance(claim_count: u64, created_at: Timestamp, now: Timestamp) -> f64 {
    let hours_elapsed = now.saturating_sub(created_at).max(0) as f64 / 3600.0;
    let chance = JACKPOT_BASE_CHANCE
        + claim_count as f64 * JACKPOT_CHANCE_PER_CLAIM
        + hours_elapsed * JACKPOT_CHANCE_PER_HOUR;
    chance.min(JACKPOT_MAX_CHANCE)
}

/// Decide the outcome of one claim and apply it to `state`.
///
/// Always increments `claim_count`. A jackpot pays the unclaimed remainder
/// (possibly zero) and closes the pot for good. The caller is responsible
/// for only evaluating active pots and for serializing calls per pot.
pub fn evaluate_claim(state: &mut PotState, now: Timestamp, rng: &dyn RandomSource) -> ClaimOutcome {
    let claim_index = state.claim_count;
    let chance = jackpot_chance(claim_index, state.created_at, now);
    let roll = rng.next_unit();
    let is_jackpot = roll < chance;

    let claim_amount = if is_jackpot {
        state
            .total_amount
            .saturating_sub((claim_index as Balance).saturating_mul(state.standard_claim_amount))
    } else {
        state.standard_claim_amount
    };

    state.claim_count = claim_index.saturating_add(1);
    if is_jackpot {
        state.is_active = false;
        state.closure = Some(PotClosure::Jackpot { amount: claim_amount, at: now });
    }

    debug!(claim_index, chance, roll, is_jackpot, "claim outcome evaluated");

    ClaimOutcome {
        is_jackpot,
        claim_amount,
        claim_index,
        total_claims: state.claim_count,
        remaining_amount: state.remaining_amount(),
        pot_closed: !state.is_active,
        chance,
    }
}
