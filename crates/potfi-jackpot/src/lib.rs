//! potfi-jackpot
//!
//! Jackpot Trigger Engine: decides whether a claim drains the pot and how
//! much it pays. Pure apart from the injected `RandomSource`.

pub mod engine;
pub mod random;

pub use engine::{evaluate_claim, jackpot_chance, ClaimOutcome};
pub use random::{OsRandom, RandomSource, SequenceRandom};
