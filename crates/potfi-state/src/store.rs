use potfi_core::error::PotfiError;
use potfi_core::pot::PotState;
use potfi_core::types::{Balance, EthAddress, PotId, Timestamp};

/// Keyed storage for pot claim progress.
///
/// Implementations must make `update` atomic per pot id: no other `update`
/// or `put` for the same id may commit between the read handed to the
/// closure and the write of its result. Different pot ids are independent.
pub trait PotStore: Send + Sync + 'static {
    fn get(&self, pot_id: &PotId) -> Result<Option<PotState>, PotfiError>;

    /// Unconditional overwrite.
    fn put(&self, pot_id: &PotId, state: &PotState) -> Result<(), PotfiError>;

    /// Atomic read-modify-write.
    ///
    /// `f` receives the current state (`None` for an unseen pot) and returns
    /// the state to store plus a value handed back to the caller. If `f`
    /// fails nothing is written. Optimistic backends may call `f` more than
    /// once, but only the last call's result is committed.
    fn update<T, F>(&self, pot_id: &PotId, f: F) -> Result<T, PotfiError>
    where
        F: FnMut(Option<PotState>) -> Result<(PotState, T), PotfiError>;

    /// Make every committed update durable. A no-op for volatile stores.
    fn flush(&self) -> Result<(), PotfiError> {
        Ok(())
    }

    /// Return the pot, creating it with `default_total` if it has never been seen.
    fn get_or_initialize(
        &self,
        pot_id: &PotId,
        default_total: Balance,
        now: Timestamp,
    ) -> Result<PotState, PotfiError> {
        self.update(pot_id, |current| {
            let state = current.unwrap_or_else(|| PotState::new(default_total, now, None));
            Ok((state.clone(), state))
        })
    }

    /// Create a pot, failing if the id is already known.
    fn initialize(
        &self,
        pot_id: &PotId,
        total_amount: Balance,
        creator: Option<EthAddress>,
        now: Timestamp,
    ) -> Result<PotState, PotfiError> {
        self.update(pot_id, |current| match current {
            Some(_) => Err(PotfiError::PotAlreadyExists(pot_id.to_hex())),
            None => {
                let state = PotState::new(total_amount, now, creator);
                Ok((state.clone(), state))
            }
        })
    }
}
