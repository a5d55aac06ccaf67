use super::{Replace, Set};

/// Uniform random victim selection. Keeps no per-line state.
#[derive(Debug)]
pub struct Random {
    rng: fastrand::Rng,
}

impl Random {
    pub fn new() -> Self {
        Random {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Random {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for Random {
    fn default() -> Self {
        Random::new()
    }
}

impl Replace for Random {
    fn on_access(&mut self, _set: Set<'_>, _tag: u64) {}

    fn eviction_index(&mut self, set: Set<'_>) -> Option<usize> {
        if set.lines.is_empty() {
            return None;
        }
        Some(self.rng.usize(0..set.lines.len()))
    }
}
