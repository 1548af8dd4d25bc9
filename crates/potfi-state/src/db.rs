use std::path::Path;

use potfi_core::error::PotfiError;
use potfi_core::pot::PotState;
use potfi_core::types::PotId;
use tracing::debug;

use crate::store::PotStore;

fn storage_err(e: sled::Error) -> PotfiError {
    PotfiError::Storage(e.to_string())
}

fn decode(bytes: &[u8]) -> Result<PotState, PotfiError> {
    bincode::deserialize(bytes).map_err(|e| PotfiError::Serialization(e.to_string()))
}

fn encode(state: &PotState) -> Result<Vec<u8>, PotfiError> {
    bincode::serialize(state).map_err(|e| PotfiError::Serialization(e.to_string()))
}

/// Persistent pot store backed by sled (pure-Rust, no C dependencies).
///
/// Named trees:
///   pots — PotId bytes → bincode(PotState)
///
/// `update` is optimistic: read, run the closure, then compare-and-swap the
/// result against the bytes that were read. A lost race re-reads and re-runs
/// the closure, so writers sharing the database directory (or the same
/// process) never commit on top of a stale read.
pub struct SledPotStore {
    db: sled::Db,
    pots: sled::Tree,
}

impl SledPotStore {
    /// Open or create the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PotfiError> {
        let db = sled::open(path).map_err(storage_err)?;
        let pots = db.open_tree("pots").map_err(storage_err)?;
        Ok(Self { db, pots })
    }

    pub fn len(&self) -> usize {
        self.pots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pots.is_empty()
    }
}

impl PotStore for SledPotStore {
    fn get(&self, pot_id: &PotId) -> Result<Option<PotState>, PotfiError> {
        match self.pots.get(pot_id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, pot_id: &PotId, state: &PotState) -> Result<(), PotfiError> {
        self.pots
            .insert(pot_id.as_bytes(), encode(state)?)
            .map_err(storage_err)?;
        Ok(())
    }

    fn update<T, F>(&self, pot_id: &PotId, mut f: F) -> Result<T, PotfiError>
    where
        F: FnMut(Option<PotState>) -> Result<(PotState, T), PotfiError>,
    {
        loop {
            let current = self.pots.get(pot_id.as_bytes()).map_err(storage_err)?;
            let decoded = current.as_deref().map(decode).transpose()?;
            let (next, out) = f(decoded)?;
            let next_bytes = encode(&next)?;

            if current.as_deref() == Some(next_bytes.as_slice()) {
                return Ok(out);
            }

            match self
                .pots
                .compare_and_swap(pot_id.as_bytes(), current, Some(next_bytes))
                .map_err(storage_err)?
            {
                Ok(()) => return Ok(out),
                Err(_) => debug!(pot_id = %pot_id, "pot update raced, retrying"),
            }
        }
    }

    /// Flush all pending writes to disk.
    fn flush(&self) -> Result<(), PotfiError> {
        let bytes = self.db.flush().map_err(storage_err)?;
        debug!(bytes, "pot store flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potfi_core::constants::UNITS_PER_TOKEN;
    use potfi_core::pot::PotClosure;
    use potfi_core::types::{Bytes32, EthAddress};
    use std::sync::Arc;
    use std::thread;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("potfi_test_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn temp_store(name: &str) -> SledPotStore {
        SledPotStore::open(temp_dir(name)).unwrap()
    }

    fn pot(n: u8) -> PotId {
        Bytes32::from_bytes([n; 32])
    }

    #[test]
    fn flushed_claims_survive_reopen() {
        let dir = temp_dir("reopen");
        {
            let store = SledPotStore::open(&dir).unwrap();
            store.initialize(&pot(7), UNITS_PER_TOKEN, None, 100).unwrap();
            store
                .update(&pot(7), |s| {
                    let mut s = s.unwrap();
                    s.claim_count += 1;
                    Ok((s, ()))
                })
                .unwrap();
            store.flush().unwrap();
        }
        let reopened = SledPotStore::open(&dir).unwrap();
        assert_eq!(reopened.get(&pot(7)).unwrap().unwrap().claim_count, 1);
    }

    #[test]
    fn put_get_preserves_every_field() {
        let store = temp_store("roundtrip");
        let mut state = PotState::new(3 * UNITS_PER_TOKEN, 1_234, Some(EthAddress::from_bytes([9; 20])));
        state.claim_count = 17;
        state.is_active = false;
        state.closure = Some(PotClosure::Reclaimed { amount: 42, at: 5_000 });
        store.put(&pot(1), &state).unwrap();
        assert_eq!(store.get(&pot(1)).unwrap(), Some(state));
        assert!(store.get(&pot(2)).unwrap().is_none());
    }

    #[test]
    fn initialize_then_reinitialize_fails() {
        let store = temp_store("init");
        store.initialize(&pot(3), UNITS_PER_TOKEN, None, 10).unwrap();
        assert!(matches!(
            store.initialize(&pot(3), UNITS_PER_TOKEN, None, 10),
            Err(PotfiError::PotAlreadyExists(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_or_initialize_writes_once() {
        let store = temp_store("lazy");
        let a = store.get_or_initialize(&pot(4), 50 * UNITS_PER_TOKEN, 1).unwrap();
        let b = store.get_or_initialize(&pot(4), UNITS_PER_TOKEN, 2).unwrap();
        assert_eq!(a, b);
        assert_eq!(b.created_at, 1);
    }

    #[test]
    fn concurrent_cas_updates_do_not_lose_increments() {
        let store = Arc::new(temp_store("cas"));
        store.put(&pot(5), &PotState::new(UNITS_PER_TOKEN, 0, None)).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..50 {
                        store
                            .update(&pot(5), |s| {
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
        assert_eq!(store.get(&pot(5)).unwrap().unwrap().claim_count, 200);
    }
}
