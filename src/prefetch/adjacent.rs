use super::{Prefetch, PrefetchPort};
use crate::error::CacheError;

/// Always fetches the line right after the accessed one.
#[derive(Debug, Default)]
pub struct Adjacent;

impl Prefetch for Adjacent {
    fn on_access(
        &mut self,
        port: &mut dyn PrefetchPort,
        addr: u64,
        _is_miss: bool,
    ) -> Result<u32, CacheError> {
        let next = addr.wrapping_add(port.line_size());
        port.prefetch(next)?;
        Ok(1)
    }
}
