//! Native memory from the C runtime heap.

use crate::accessor::MemoryAccessor;
use crate::backend::syscall;
use crate::error::{checked_size, MemoryError};
use crate::object::Address;

/// Backend whose native blocks come straight from the platform heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBackend;

impl SystemBackend {
    /// Creates the backend. It holds no state.
    pub const fn new() -> Self {
        Self
    }
}

impl MemoryAccessor for SystemBackend {
    fn name(&self) -> &'static str {
        "system"
    }

    fn allocate_memory(&self, bytes: i64) -> Result<Address, MemoryError> {
        let size = checked_size(bytes)?;
        if size == 0 {
            return Ok(0);
        }
        // SAFETY: size is non-zero.
        match unsafe { syscall::allocate_block(size) } {
            Some(ptr) => {
                tracing::trace!(size, ptr = ?ptr, "allocated native block");
                Ok(ptr as usize as Address)
            }
            None => {
                tracing::warn!(size, "native allocation refused");
                Err(MemoryError::OutOfMemory { bytes: size })
            }
        }
    }

    unsafe fn reallocate_memory(&self, address: Address, bytes: i64) -> Result<Address, MemoryError> {
        let size = checked_size(bytes)?;
        if address == 0 {
            return self.allocate_memory(bytes);
        }
        if size == 0 {
            self.free_memory(address);
            return Ok(0);
        }
        match syscall::reallocate_block(address as usize as *mut u8, size) {
            Some(ptr) => {
                tracing::trace!(size, from = address, ptr = ?ptr, "reallocated native block");
                Ok(ptr as usize as Address)
            }
            None => {
                tracing::warn!(size, address, "native reallocation refused");
                Err(MemoryError::OutOfMemory { bytes: size })
            }
        }
    }

    unsafe fn free_memory(&self, address: Address) {
        if address == 0 {
            return;
        }
        tracing::trace!(address, "freeing native block");
        syscall::free_block(address as usize as *mut u8);
    }
}
