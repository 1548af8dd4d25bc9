//! potfi-state
//!
//! Pot State Store: a keyed store of `PotState` behind the `PotStore` trait.
//!
//! Two backends:
//!   MemoryPotStore — process-local map with one mutex per pot id
//!   SledPotStore   — sled tree with compare-and-swap retry
//!
//! Both guarantee that `update` closures for the same pot never interleave
//! their read-modify-write, so each committed value of `claim_count` is
//! observed by exactly one committed evaluation.

pub mod db;
pub mod memory;
pub mod store;

pub use db::SledPotStore;
pub use memory::MemoryPotStore;
pub use store::PotStore;
