use crate::cache::Status;

use super::{Replace, Set};

/// LRU that prefers clean victims.
///
/// Recency is tracked exactly as in [`super::lru::Lru`], with a parallel dirty
/// bit per slot. A slot turns dirty when it is touched while MODIFIED and only
/// turns clean again when it is chosen for eviction. The oldest clean line is
/// always evicted before any dirty line, however cold the dirty lines are.
#[derive(Debug)]
pub struct LruPreferClean {
    last_access: Vec<u64>,
    dirty: Vec<bool>,
    clock: u64,
}

impl LruPreferClean {
    pub fn new(n_sets: usize, n_ways: usize) -> Self {
        LruPreferClean {
            last_access: vec![0; n_sets * n_ways],
            dirty: vec![false; n_sets * n_ways],
            clock: 0,
        }
    }

    fn oldest(&self, base: usize, n_ways: usize, dirty: bool) -> Option<usize> {
        (0..n_ways)
            .filter(|&way| self.dirty[base + way] == dirty)
            .min_by_key(|&way| self.last_access[base + way])
    }
}

impl Replace for LruPreferClean {
    fn on_access(&mut self, set: Set<'_>, tag: u64) {
        self.clock += 1;
        if let Some(way) = set.find(tag) {
            let slot = set.base() + way;
            self.last_access[slot] = self.clock;
            if set.lines[way].status == Status::Modified {
                self.dirty[slot] = true;
            }
        }
    }

    fn eviction_index(&mut self, set: Set<'_>) -> Option<usize> {
        let base = set.base();
        let n_ways = set.lines.len();
        let way = self
            .oldest(base, n_ways, false)
            .or_else(|| self.oldest(base, n_ways, true))?;
        // The slot is about to be refilled; it is clean until written again.
        self.dirty[base + way] = false;
        Some(way)
    }
}
