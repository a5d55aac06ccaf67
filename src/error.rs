use std::io;

use thiserror::Error;

/// Failures raised by the cache itself: bad geometry at construction, or a
/// replacement policy that could not name a victim.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("{what} must be non-zero")]
    ZeroDimension { what: &'static str },

    #[error("{what} must be a power of two, got {value}")]
    NotPowerOfTwo { what: &'static str, value: usize },

    #[error("cache size {size} is not a multiple of line size {line_size} x {ways} ways")]
    UnevenGeometry {
        size: usize,
        line_size: usize,
        ways: usize,
    },

    /// The replacement policy had no candidate for a full set.
    #[error("replacement policy found no victim in set {set}")]
    NoVictim { set: usize },
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace read failed: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: unknown operation {op:?}")]
    BadOp { line: usize, op: String },

    #[error("line {line}: bad address {text:?}")]
    BadAddress { line: usize, text: String },

    #[error("line {line}: expected `<R|W> <address>`")]
    Truncated { line: usize },
}

/// Top level error for the simulator binary.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("bad arguments: {0}")]
    Args(#[from] pico_args::Error),

    #[error("{0}")]
    Usage(&'static str),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("bad config: {0}")]
    Json(#[from] serde_json::Error),
}
