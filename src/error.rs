//! Error kinds for the computational core.
//!
//! Most of this crate's hot-path accessors are unchecked by design (spec
//! section 7's `UnspecifiedOutOfRange`: callers range-check, out-of-range
//! behavior is not reported as a `Result`). `HighmapError` only covers the
//! boundary where failure is actually observable: I/O, malformed
//! configuration, and unsupported export formats.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HighmapError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported config: {0}")]
    UnsupportedConfig(String),
}

pub type Result<T> = std::result::Result<T, HighmapError>;
