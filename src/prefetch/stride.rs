use log::trace;

use super::{Prefetch, PrefetchPort};
use crate::error::CacheError;

/// Lagged stride predictor.
///
/// Only misses train it. The first miss just records its address. Every later
/// miss measures the stride from the previous miss, but prefetches using the
/// stride measured one miss earlier, so the second miss issues nothing and a
/// new stride only takes effect on the miss after it was seen.
#[derive(Debug, Default)]
pub struct Stride {
    last_addr: Option<u64>,
    last_stride: Option<i64>,
}

impl Stride {
    pub fn new() -> Self {
        Stride::default()
    }
}

impl Prefetch for Stride {
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

        let current_stride = addr.wrapping_sub(last_addr) as i64;
        let issued = match self.last_stride.replace(current_stride) {
            Some(stride) => {
                let target = addr.wrapping_add_signed(stride);
                trace!("stride {stride} from {addr:#x}: prefetch {target:#x}");
                port.prefetch(target)?;
                1
            }
            None => 0,
        };
        Ok(issued)
    }
}
