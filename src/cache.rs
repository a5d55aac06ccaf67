use std::ops::{Not, Range};

use log::{debug, trace};
use serde::Serialize;

use crate::{
    error::CacheError,
    prefetch::{Prefetch, PrefetchPort},
    replace::{AccessResult, Replace, Set},
};

#[derive(Debug, PartialEq, Eq)]
pub struct Addr {
    pub offset: u64,
    pub set: usize,
    pub tag: u64,
}

#[derive(Debug)]
pub struct BitSection {
    shift: u32,
    mask: u64,
}

impl BitSection {
    fn apply(&self, num: u64) -> u64 {
        (num >> self.shift) & self.mask
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read,
    Write,
}

impl Op {
    pub fn parse(text: &str) -> Option<Op> {
        match text {
            "R" | "r" => Some(Op::Read),
            "W" | "w" => Some(Op::Write),
            _ => None,
        }
    }

    /// Status of a line just touched by this operation.
    fn status(self) -> Status {
        match self {
            Op::Read => Status::Valid,
            Op::Write => Status::Modified,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[default]
    Invalid,
    Valid,
    Modified,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub tag: u64,
    pub status: Status,
}

impl Line {
    pub fn is_valid(&self) -> bool {
        self.status != Status::Invalid
    }
}

#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct CacheStats {
    pub name: String,
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
    pub dirty_evictions: u64,
    pub prefetch_accesses: u64,
    pub prefetches: u64,
}

/// Geometry, line storage and replacement state: everything a prefetcher is
/// allowed to drive. It holds no prefetcher, so accesses issued through it can
/// never prefetch again.
#[derive(Debug)]
pub struct Core<R: Replace> {
    pub lines: Vec<Line>,
    pub line_size: usize,
    pub n_ways: usize,
    offset_sec: BitSection,
    set_sec: BitSection,
    tag_sec: BitSection,
    pub repl: R,
    accesses: u64,
    hits: u64,
    dirty_evictions: u64,
    prefetch_accesses: u64,
}

fn power_of_two(what: &'static str, value: usize) -> Result<(), CacheError> {
    if value == 0 {
        Err(CacheError::ZeroDimension { what })
    } else if !value.is_power_of_two() {
        Err(CacheError::NotPowerOfTwo { what, value })
    } else {
        Ok(())
    }
}

impl<R: Replace> Core<R> {
    pub fn new(line_size: usize, n_sets: usize, n_ways: usize, repl: R) -> Result<Self, CacheError> {
        power_of_two("line size", line_size)?;
        power_of_two("set count", n_sets)?;
        if n_ways == 0 {
            return Err(CacheError::ZeroDimension {
                what: "associativity",
            });
        }

        let offset_sec = BitSection {
            shift: 0,
            mask: line_size as u64 - 1,
        };

        let set_shift = line_size.ilog2();
        let set_sec = BitSection {
            shift: set_shift,
            mask: n_sets as u64 - 1,
        };

        let tag_sec = BitSection {
            shift: n_sets.ilog2() + set_shift,
            mask: 0u64.not(),
        };

        Ok(Core {
            lines: vec![Line::default(); n_sets * n_ways],
            line_size,
            n_ways,
            offset_sec,
            set_sec,
            tag_sec,
            repl,
            accesses: 0,
            hits: 0,
            dirty_evictions: 0,
            prefetch_accesses: 0,
        })
    }

    pub fn split_addr(&self, addr: u64) -> Addr {
        Addr {
            offset: self.offset_sec.apply(addr),
            set: self.set_sec.apply(addr) as usize,
            tag: self.tag_sec.apply(addr),
        }
    }

    pub fn get_set(&self, set: usize) -> Range<usize> {
        set * self.n_ways..(set + 1) * self.n_ways
    }

    /// Resolves one access: hit or fill, then tells the replacement policy.
    pub fn handle_access(
        &mut self,
        addr: u64,
        op: Op,
        is_prefetch: bool,
    ) -> Result<AccessResult, CacheError> {
        let Addr { offset, set, tag } = self.split_addr(addr);
        let set_range = self.get_set(set);
        let base = set_range.start;

        let hit = Set::new(set, &self.lines[set_range.clone()]).find(tag);
        let result = if let Some(way) = hit {
            if op == Op::Write {
                self.lines[base + way].status = Status::Modified;
            }
            AccessResult::Hit
        } else {
            let set_slice = &self.lines[set_range.clone()];
            let way = match set_slice.iter().position(|line| !line.is_valid()) {
                Some(vacant_way) => vacant_way,
                None => {
                    let victim_way = self
                        .repl
                        .eviction_index(Set::new(set, set_slice))
                        .filter(|&way| way < self.n_ways)
                        .ok_or(CacheError::NoVictim { set })?;
                    let victim = &set_slice[victim_way];
                    if victim.status == Status::Modified {
                        debug!(
                            "dirty eviction: set {set} way {victim_way} tag {:#x}",
                            victim.tag
                        );
                        self.dirty_evictions += 1;
                    }
                    victim_way
                }
            };
            self.lines[base + way] = Line {
                tag,
                status: op.status(),
            };
            AccessResult::Miss
        };

        self.repl
            .on_access(Set::new(set, &self.lines[set_range]), tag);

        if is_prefetch {
            self.prefetch_accesses += 1;
        } else {
            self.accesses += 1;
            if result == AccessResult::Hit {
                self.hits += 1;
            }
        }
        trace!(
            "{op:?} {addr:#x} (set {set} tag {tag:#x} offset {offset}): {result:?}, prefetch: {is_prefetch}"
        );
        Ok(result)
    }

    fn clear_stats(&mut self) {
        self.accesses = 0;
        self.hits = 0;
        self.dirty_evictions = 0;
        self.prefetch_accesses = 0;
    }
}

impl<R: Replace> PrefetchPort for Core<R> {
    fn line_size(&self) -> u64 {
        self.line_size as u64
    }

    fn prefetch(&mut self, addr: u64) -> Result<AccessResult, CacheError> {
        self.handle_access(addr, Op::Read, true)
    }
}

/// A cache plus the prefetcher that watches its demand accesses.
pub struct Cache<R: Replace> {
    name: String,
    pub core: Core<R>,
    prefetcher: Box<dyn Prefetch>,
    prefetches: u64,
}

impl<R: Replace> Cache<R> {
    pub fn new(
        name: String,
        line_size: usize,
        n_sets: usize,
        n_ways: usize,
        repl: R,
        prefetcher: Box<dyn Prefetch>,
    ) -> Result<Self, CacheError> {
        Ok(Cache {
            name,
            core: Core::new(line_size, n_sets, n_ways, repl)?,
            prefetcher,
            prefetches: 0,
        })
    }
}

pub trait IsCache {
    fn name(&self) -> &str;
    fn access(&mut self, addr: u64, op: Op) -> Result<AccessResult, CacheError>;
    fn clear_stats(&mut self);
    fn make_stats(&self) -> CacheStats;
}

impl<R: Replace> IsCache for Cache<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn access(&mut self, addr: u64, op: Op) -> Result<AccessResult, CacheError> {
        let result = self.core.handle_access(addr, op, false)?;
        // Only the core is lent out, so prefetch fills cannot reach the prefetcher.
        let issued = self
            .prefetcher
            .on_access(&mut self.core, addr, result.is_miss())?;
        self.prefetches += u64::from(issued);
        Ok(result)
    }

    fn clear_stats(&mut self) {
        self.core.clear_stats();
        self.prefetches = 0;
    }

    fn make_stats(&self) -> CacheStats {
        let core = &self.core;
        let hit_ratio = if core.accesses == 0 {
            0.0
        } else {
            core.hits as f64 / core.accesses as f64
        };

        CacheStats {
            name: self.name.clone(),
            accesses: core.accesses,
            hits: core.hits,
            misses: core.accesses - core.hits,
            hit_ratio,
            dirty_evictions: core.dirty_evictions,
            prefetch_accesses: core.prefetch_accesses,
            prefetches: self.prefetches,
        }
    }
}
