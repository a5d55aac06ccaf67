use super::{Replace, Set};

/// Least recently used. Each line slot records the value of a global access
/// counter at its last touch; 0 means the slot has not been touched this run.
#[derive(Debug)]
pub struct Lru {
    last_access: Vec<u64>,
    clock: u64,
}

impl Lru {
    pub fn new(n_sets: usize, n_ways: usize) -> Self {
        Lru {
            last_access: vec![0; n_sets * n_ways],
            clock: 0,
        }
    }
}

impl Replace for Lru {
    fn on_access(&mut self, set: Set<'_>, tag: u64) {
        if let Some(way) = set.find(tag) {
            self.clock += 1;
            self.last_access[set.base() + way] = self.clock;
        }
    }

    fn eviction_index(&mut self, set: Set<'_>) -> Option<usize> {
        let base = set.base();
        // min_by_key keeps the first minimum, so ties go to the lowest way
        let way = (0..set.lines.len())
            .min_by_key(|&way| self.last_access[base + way])
            .unwrap_or(0);
        Some(way)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Status::*;
    use crate::replace::test_util::lines;

    #[test]
    fn evicts_oldest_way() {
        let set = lines(&[(10, Valid), (11, Valid), (12, Modified), (13, Valid)]);
        let mut lru = Lru::new(2, 4);
        for tag in [12, 10, 13, 11, 10] {
            lru.on_access(Set::new(1, &set), tag);
        }
        assert_eq!(lru.eviction_index(Set::new(1, &set)), Some(2));

        lru.on_access(Set::new(1, &set), 12);
        assert_eq!(lru.eviction_index(Set::new(1, &set)), Some(3));
    }

    #[test]
    fn untouched_set_evicts_way_zero() {
        let set = lines(&[(1, Valid), (2, Valid)]);
        let mut lru = Lru::new(4, 2);
        assert_eq!(lru.eviction_index(Set::new(3, &set)), Some(0));
    }

    #[test]
    fn sets_are_tracked_independently() {
        let set = lines(&[(1, Valid), (2, Valid)]);
        let mut lru = Lru::new(2, 2);
        lru.on_access(Set::new(0, &set), 2);
        lru.on_access(Set::new(0, &set), 1);
        lru.on_access(Set::new(1, &set), 1);

        assert_eq!(lru.eviction_index(Set::new(0, &set)), Some(1));
        assert_eq!(lru.eviction_index(Set::new(1, &set)), Some(1));
    }

    #[test]
    fn invalid_and_unknown_tags_are_ignored() {
        let set = lines(&[(7, Invalid), (8, Valid)]);
        let mut lru = Lru::new(1, 2);
        lru.on_access(Set::new(0, &set), 8);
        lru.on_access(Set::new(0, &set), 7);
        lru.on_access(Set::new(0, &set), 99);

        assert_eq!(lru.clock, 1);
        assert_eq!(lru.eviction_index(Set::new(0, &set)), Some(0));
    }

    #[test]
    fn replay_is_deterministic() {
        let set = lines(&[(1, Valid), (2, Valid), (3, Valid)]);
        let run = || {
            let mut lru = Lru::new(1, 3);
            let mut victims = Vec::new();
            for tag in [3, 1, 2, 1, 3, 3, 2] {
                lru.on_access(Set::new(0, &set), tag);
                victims.push(lru.eviction_index(Set::new(0, &set)));
            }
            victims
        };
        assert_eq!(run(), run());
        assert_eq!(run().last(), Some(&Some(0)));
    }
}
