use super::{Prefetch, PrefetchPort};
use crate::error::CacheError;

#[derive(Debug, Default)]
pub struct Null;

impl Prefetch for Null {
    fn on_access(
        &mut self,
        _port: &mut dyn PrefetchPort,
        _addr: u64,
        _is_miss: bool,
    ) -> Result<u32, CacheError> {
        Ok(0)
    }
}
