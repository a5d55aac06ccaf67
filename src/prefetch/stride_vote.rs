use log::trace;

use super::{Prefetch, PrefetchPort};
use crate::error::CacheError;

const HISTORY: usize = 3;

/// Stride predictor that votes between two candidates.
///
/// The local candidate is the mean of the last [`HISTORY`] miss strides. The
/// global candidate is the last stride that repeated on two consecutive
/// misses. Every miss scores both candidates against the stride that actually
/// happened, and the prefetch uses whichever has scored more (global on ties).
#[derive(Debug, Default)]
pub struct StrideVote {
    last_addr: Option<u64>,
    last_stride: Option<i64>,
    recent: [i64; HISTORY],
    seen: usize,
    global: i64,
    local_hits: u32,
    global_hits: u32,
}

impl StrideVote {
    pub fn new() -> Self {
        StrideVote::default()
    }

    fn local(&self) -> Option<i64> {
        // widened so strides near the ends of the address space cannot overflow
        (self.seen >= HISTORY).then(|| {
            let sum: i128 = self.recent.iter().map(|&s| i128::from(s)).sum();
            (sum / HISTORY as i128) as i64
        })
    }

    fn choose(&self) -> i64 {
        match self.local() {
            Some(local) if self.local_hits > self.global_hits => local,
            _ => self.global,
        }
    }
}

impl Prefetch for StrideVote {
    fn on_access(
        &mut self,
        port: &mut dyn PrefetchPort,
        addr: u64,
        is_miss: bool,
    ) -> Result<u32, CacheError> {
        if !is_miss {
            return Ok(0);
        }
        let Some(last_addr) = self.last_addr.replace(addr) else {
            return Ok(0);
        };
        let current = addr.wrapping_sub(last_addr) as i64;

        if self.local() == Some(current) {
            self.local_hits += 1;
        }
        if self.global == current {
            self.global_hits += 1;
        }

        self.recent[self.seen % HISTORY] = current;
        self.seen += 1;
        if self.last_stride.replace(current) == Some(current) {
            self.global = current;
        }

        let stride = self.choose();
        if stride == 0 {
            return Ok(0);
        }
        let target = addr.wrapping_add_signed(stride);
        trace!("voted stride {stride} from {addr:#x}: prefetch {target:#x}");
        port.prefetch(target)?;
        Ok(1)
    }
}
