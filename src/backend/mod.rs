//! Interchangeable native backends.
//!
//! The typed primitives are shared ([`primitive`]); the variants differ in where
//! native memory comes from:
//!
//! - [`SystemBackend`]: the C runtime heap (`malloc` family on Unix, the process
//!   heap on Windows).
//! - [`GlobalAllocBackend`]: Rust's global allocator, so whatever
//!   `#[global_allocator]` the binary installs also serves native blocks.
//!
//! One variant is chosen per process, see [`AccessorConfig`](crate::AccessorConfig).

pub mod global;
pub mod primitive;
pub mod syscall;
pub mod system;

use std::sync::OnceLock;

use crate::accessor::MemoryAccessor;
use crate::config::BackendKind;

pub use global::GlobalAllocBackend;
pub use system::SystemBackend;

/// Alignment guaranteed for every native block.
pub const BLOCK_ALIGN: usize = 16;

/// Builds the backend for `kind`.
pub fn create(kind: BackendKind) -> Box<dyn MemoryAccessor> {
    tracing::debug!(backend = %kind, "creating memory accessor backend");
    match kind {
        BackendKind::System => Box::new(SystemBackend::new()),
        BackendKind::Global => Box::new(GlobalAllocBackend::new()),
    }
}

/// The operating system page size, queried once.
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
    *PAGE_SIZE.get_or_init(|| {
        let size = syscall::page_size();
        debug_assert!(size.is_power_of_two());
        size
    })
}
