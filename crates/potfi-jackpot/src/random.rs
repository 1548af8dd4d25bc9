use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::RngCore;

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Operating-system CSPRNG.
///
/// Draws 64 bits and keeps the top 53 so the result is an exactly
/// representable multiple of 2^-53, strictly below 1.0.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_unit(&self) -> f64 {
        let bits = rand::rngs::OsRng.next_u64();
        (bits >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Replays a fixed sequence of draws, then repeats the last one.
/// For deterministic tests.
#[derive(Debug)]
pub struct SequenceRandom {
    values: Mutex<VecDeque<f64>>,
    last: Mutex<f64>,
}

impl SequenceRandom {
    pub fn new<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let values: VecDeque<f64> = values.into_iter().collect();
        let last = values.back().copied().unwrap_or(0.0);
        Self {
            values: Mutex::new(values),
            last: Mutex::new(last),
        }
    }

    /// Always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&self) -> f64 {
        match self.values.lock().pop_front() {
            Some(v) => {
                *self.last.lock() = v;
                v
            }
            None => *self.last.lock(),
        }
    }
}
