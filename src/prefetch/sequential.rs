use super::{Prefetch, PrefetchPort};
use crate::error::CacheError;

/// Fetches the next `amount` lines after every demand access, hit or miss.
#[derive(Debug)]
pub struct Sequential {
    amount: u32,
}

impl Sequential {
    pub fn new(amount: u32) -> Self {
        Sequential { amount }
    }
}

impl Prefetch for Sequential {
    fn on_access(
        &mut self,
        port: &mut dyn PrefetchPort,
        addr: u64,
        _is_miss: bool,
    ) -> Result<u32, CacheError> {
        let line_size = port.line_size();
        for i in 1..=u64::from(self.amount) {
            port.prefetch(addr.wrapping_add(i * line_size))?;
        }
        Ok(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::prefetch::test_util::Recorder;

    #[test]
    fn fetches_next_lines_in_order() {
        let mut port = Recorder::new(64);
        let count = Sequential::new(3).on_access(&mut port, 1000, false).unwrap();
        assert_eq!(count, 3);
        assert_eq!(port.issued, vec![1064, 1128, 1192]);
    }

    #[test]
    fn zero_amount_does_nothing() {
        let mut port = Recorder::new(64);
        assert_eq!(Sequential::new(0).on_access(&mut port, 1000, true).unwrap(), 0);
        assert!(port.issued.is_empty());
    }
}
