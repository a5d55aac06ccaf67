pub mod lru;
pub mod lru_clean;
pub mod random;

use crate::cache::Line;

/// Read-only view of one set handed to a replacement policy.
#[derive(Debug, Clone, Copy)]
pub struct Set<'a> {
    pub index: usize,
    pub lines: &'a [Line],
}

impl<'a> Set<'a> {
    pub fn new(index: usize, lines: &'a [Line]) -> Self {
        Set { index, lines }
    }

    /// Offset of way 0 of this set in a flat `sets * ways` metadata array.
    pub fn base(&self) -> usize {
        self.index * self.lines.len()
    }

    /// Way holding `tag`, ignoring invalid lines.
    pub fn find(&self, tag: u64) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.is_valid() && line.tag == tag)
    }
}

/// An eviction strategy. The cache calls `on_access` after every resolved
/// access, once the line for `tag` is installed, and `eviction_index` once per
/// miss into a full set, before the new line is written.
pub trait Replace {
    fn on_access(&mut self, set: Set<'_>, tag: u64);

    /// Way to evict, or `None` if the policy has no candidate.
    fn eviction_index(&mut self, set: Set<'_>) -> Option<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Hit,
    Miss,
}

impl AccessResult {
    pub fn is_miss(self) -> bool {
        self == AccessResult::Miss
    }
}
