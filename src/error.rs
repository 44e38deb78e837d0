//! Error types.
//!
//! Only the native-memory lifecycle and configuration loading report errors.
//! Every other accessor operation is unchecked by contract.

use thiserror::Error;

/// Failure of [`allocate_memory`](crate::MemoryAccessor::allocate_memory) or
/// [`reallocate_memory`](crate::MemoryAccessor::reallocate_memory).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// The requested size is negative or exceeds the platform's addressable size.
    #[error("invalid allocation size: {bytes} bytes")]
    InvalidArgument {
        /// The size as passed by the caller.
        bytes: i64,
    },
    /// The allocator refused the request. The caller may free memory and retry.
    #[error("out of memory: allocator refused {bytes} bytes")]
    OutOfMemory {
        /// The size that could not be satisfied.
        bytes: usize,
    },
}

/// Failure to load an [`AccessorConfig`](crate::AccessorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The backend name is not one of the known variants.
    #[error("unknown backend `{0}` (expected `system` or `global`)")]
    UnknownBackend(String),
    /// The JSON document is malformed.
    #[error("malformed accessor config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validates a caller-supplied allocation size.
///
/// # Errors
/// Returns [`MemoryError::InvalidArgument`] if `bytes` is negative or larger than
/// `isize::MAX`.
pub(crate) fn checked_size(bytes: i64) -> Result<usize, MemoryError> {
    usize::try_from(bytes)
        .ok()
        .filter(|&size| size <= isize::MAX as usize)
        .ok_or(MemoryError::InvalidArgument { bytes })
}
