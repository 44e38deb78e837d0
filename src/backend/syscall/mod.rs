//! Platform calls behind [`SystemBackend`](crate::backend::SystemBackend) and the
//! page-size query shared by every backend.

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

#[cfg(unix)]
pub use unix::*;

#[cfg(windows)]
pub use windows::*;

/// Page size assumed when the operating system cannot be asked.
pub const FALLBACK_PAGE_SIZE: usize = 4096;
