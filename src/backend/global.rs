//! Native memory from Rust's global allocator.
//!
//! `std::alloc` needs the original layout to resize or release a block, while the
//! accessor contract only hands back the address. Each block therefore carries a
//! hidden header of [`BLOCK_ALIGN`] bytes in front of the address returned to the
//! caller, holding the usable size.

use core::alloc::Layout;
use std::alloc::{alloc, dealloc, realloc};

use crate::accessor::MemoryAccessor;
use crate::backend::BLOCK_ALIGN;
use crate::error::{checked_size, MemoryError};
use crate::object::Address;

const HEADER: usize = BLOCK_ALIGN;

/// Backend whose native blocks come from the global allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalAllocBackend;

impl GlobalAllocBackend {
    /// Creates the backend. It holds no state.
    pub const fn new() -> Self {
        Self
    }
}

/// Layout of a whole block (header included) with `size` usable bytes.
///
/// `size` is already a valid request; a block that no longer fits once the
/// header is added is one the allocator cannot serve.
fn block_layout(size: usize) -> Result<Layout, MemoryError> {
    size.checked_add(HEADER)
        .and_then(|total| Layout::from_size_align(total, BLOCK_ALIGN).ok())
        .ok_or(MemoryError::OutOfMemory { bytes: size })
}

/// Start of the block whose user address is `address`.
#[inline(always)]
fn block_start(address: Address) -> *mut u8 {
    (address as usize - HEADER) as *mut u8
}

/// Records `size` in the header of `block` and returns the user address.
#[inline(always)]
unsafe fn finish_block(block: *mut u8, size: usize) -> Address {
    block.cast::<usize>().write(size);
    block.add(HEADER) as usize as Address
}

impl MemoryAccessor for GlobalAllocBackend {
    fn name(&self) -> &'static str {
        "global"
    }

    fn allocate_memory(&self, bytes: i64) -> Result<Address, MemoryError> {
        let size = checked_size(bytes)?;
        if size == 0 {
            return Ok(0);
        }
        let layout = block_layout(size)?;
        // SAFETY: layout has a non-zero size.
        let block = unsafe { alloc(layout) };
        if block.is_null() {
            tracing::warn!(size, "global allocator refused native block");
            return Err(MemoryError::OutOfMemory { bytes: size });
        }
        tracing::trace!(size, ptr = ?block, "allocated native block");
        // SAFETY: block is fresh, aligned and at least HEADER bytes long.
        Ok(unsafe { finish_block(block, size) })
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
        let new_layout = block_layout(size)?;
        let block = block_start(address);
        let old_size = block.cast::<usize>().read();
        let old_layout = Layout::from_size_align_unchecked(old_size + HEADER, BLOCK_ALIGN);
        let moved = realloc(block, old_layout, new_layout.size());
        if moved.is_null() {
            tracing::warn!(size, address, "global allocator refused reallocation");
            return Err(MemoryError::OutOfMemory { bytes: size });
        }
        tracing::trace!(size, from = address, ptr = ?moved, "reallocated native block");
        Ok(finish_block(moved, size))
    }

    unsafe fn free_memory(&self, address: Address) {
        if address == 0 {
            return;
        }
        let block = block_start(address);
        let size = block.cast::<usize>().read();
        tracing::trace!(address, size, "freeing native block");
        dealloc(block, Layout::from_size_align_unchecked(size + HEADER, BLOCK_ALIGN));
    }
}
