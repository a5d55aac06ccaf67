//! Prefetchers.
//!
//! A prefetcher sees every demand access after the cache has resolved it and
//! may push extra reads back into the cache through a [`PrefetchPort`].

pub mod adjacent;
pub mod null;
pub mod sequential;
pub mod stride;
pub mod stride_vote;

use crate::{error::CacheError, replace::AccessResult};

/// The part of a cache a prefetcher can drive. Reads issued here are marked
/// as prefetches and never reach a prefetcher themselves.
pub trait PrefetchPort {
    fn line_size(&self) -> u64;
    fn prefetch(&mut self, addr: u64) -> Result<AccessResult, CacheError>;
}

pub trait Prefetch {
    /// Observes one demand access and returns how many lines it prefetched.
    fn on_access(
        &mut self,
        port: &mut dyn PrefetchPort,
        addr: u64,
        is_miss: bool,
    ) -> Result<u32, CacheError>;
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::PrefetchPort;
    use crate::{error::CacheError, replace::AccessResult};

    /// Port that records issued addresses instead of touching a cache.
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub line_size: u64,
        pub issued: Vec<u64>,
    }

    impl Recorder {
        pub fn new(line_size: u64) -> Self {
            Recorder {
                line_size,
                issued: Vec::new(),
            }
        }
    }

    impl PrefetchPort for Recorder {
        fn line_size(&self) -> u64 {
            self.line_size
        }

        fn prefetch(&mut self, addr: u64) -> Result<AccessResult, CacheError> {
            self.issued.push(addr);
            Ok(AccessResult::Miss)
        }
    }
}
