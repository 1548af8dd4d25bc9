use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use potfi_core::error::PotfiError;
use potfi_core::pot::PotState;
use potfi_core::types::PotId;

use crate::store::PotStore;

type Slot = Arc<Mutex<Option<PotState>>>;

/// Volatile in-process store. State is lost on restart.
///
/// The outer map lock is held only long enough to find or create a pot's
/// slot; the slot's own mutex serializes updates for that pot.
#[derive(Default)]
pub struct MemoryPotStore {
    slots: Mutex<HashMap<PotId, Slot>>,
}

impl MemoryPotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, pot_id: &PotId) -> Slot {
        Arc::clone(self.slots.lock().entry(*pot_id).or_default())
    }

    /// Drop a slot that was created for a pot that never got any state.
    /// Slots still shared with another caller are left alone.
    fn release_if_empty(&self, pot_id: &PotId, slot: Slot) {
        let mut slots = self.slots.lock();
        let unused = slots
            .get(pot_id)
            .is_some_and(|s| Arc::ptr_eq(s, &slot) && Arc::strong_count(s) == 2);
        if unused && slot.lock().is_none() {
            slots.remove(pot_id);
        }
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PotStore for MemoryPotStore {
    fn get(&self, pot_id: &PotId) -> Result<Option<PotState>, PotfiError> {
        let slot = match self.slots.lock().get(pot_id) {
            Some(slot) => Arc::clone(slot),
            None => return Ok(None),
        };
        let state = slot.lock().clone();
        Ok(state)
    }

    fn put(&self, pot_id: &PotId, state: &PotState) -> Result<(), PotfiError> {
        *self.slot(pot_id).lock() = Some(state.clone());
        Ok(())
    }

    fn update<T, F>(&self, pot_id: &PotId, mut f: F) -> Result<T, PotfiError>
    where
        F: FnMut(Option<PotState>) -> Result<(PotState, T), PotfiError>,
    {
        let slot = self.slot(pot_id);
        let mut guard = slot.lock();
        match f(guard.clone()) {
            Ok((next, out)) => {
                *guard = Some(next);
                Ok(out)
            }
            Err(e) => {
                drop(guard);
                self.release_if_empty(pot_id, slot);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potfi_core::constants::UNITS_PER_TOKEN;
    use potfi_core::types::Bytes32;
    use std::thread;

    fn pot(n: u8) -> PotId {
        Bytes32::from_bytes([n; 32])
    }

    #[test]
    fn get_or_initialize_is_idempotent() {
        let store = MemoryPotStore::new();
        let first = store.get_or_initialize(&pot(1), 50 * UNITS_PER_TOKEN, 100).unwrap();
        let again = store.get_or_initialize(&pot(1), 7, 999).unwrap();
        assert_eq!(first, again);
        assert_eq!(again.total_amount, 50 * UNITS_PER_TOKEN);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn initialize_rejects_existing_pot() {
        let store = MemoryPotStore::new();
        store.initialize(&pot(2), UNITS_PER_TOKEN, None, 0).unwrap();
        assert!(matches!(
            store.initialize(&pot(2), UNITS_PER_TOKEN, None, 0),
            Err(PotfiError::PotAlreadyExists(_))
        ));
    }

    #[test]
    fn failed_update_writes_nothing() {
        let store = MemoryPotStore::new();
        let res: Result<(), _> =
            store.update(&pot(3), |_| Err(PotfiError::InvalidRequest("nope".into())));
        assert!(res.is_err());
        assert!(store.get(&pot(3)).unwrap().is_none());
        assert!(store.is_empty());
        assert_eq!(store.slot_count(), 0);
    }

    #[test]
    fn rejected_lookups_of_unknown_pots_leave_no_slots() {
        let store = MemoryPotStore::new();
        for n in 0..=255u8 {
            let res: Result<(), _> = store.update(&pot(n), |current| match current {
                Some(_) => Ok((PotState::new(1, 0, None), ())),
                None => Err(PotfiError::PotNotFound(pot(n).to_hex())),
            });
            assert!(matches!(res, Err(PotfiError::PotNotFound(_))));
        }
        assert_eq!(store.slot_count(), 0);

        // A failed update on a pot that exists keeps its slot and state.
        store.put(&pot(9), &PotState::new(UNITS_PER_TOKEN, 0, None)).unwrap();
        let res: Result<(), _> = store.update(&pot(9), |_| Err(PotfiError::PotInactive));
        assert!(res.is_err());
        assert_eq!(store.slot_count(), 1);
        assert!(store.get(&pot(9)).unwrap().is_some());
    }

    #[test]
    fn concurrent_updates_do_not_lose_increments() {
        let store = Arc::new(MemoryPotStore::new());
        store.put(&pot(4), &PotState::new(UNITS_PER_TOKEN, 0, None)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..250 {
                        store
                            .update(&pot(4), |s| {
                                let mut s = s.unwrap();
                                s.claim_count += 1;
                                Ok((s, ()))
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.get(&pot(4)).unwrap().unwrap().claim_count, 2_000);
    }
}
