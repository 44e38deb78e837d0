#![cfg(unix)]
//! Native blocks from the C runtime heap.

use libc::{c_void, free, malloc, realloc, sysconf, _SC_PAGESIZE};

use super::FALLBACK_PAGE_SIZE;

/// Allocates `size` bytes from the C heap.
/// Returns a pointer aligned for every fundamental type, or None if refused.
///
/// # Safety
/// `size` must be non-zero.
pub unsafe fn allocate_block(size: usize) -> Option<*mut u8> {
    let ptr = malloc(size);
    if ptr.is_null() {
        None
    } else {
        Some(ptr.cast())
    }
}

/// Resizes a block obtained from [`allocate_block`]. On failure the old block is
/// left untouched.
///
/// # Safety
/// `ptr` must be a live block from this module and `size` non-zero.
pub unsafe fn reallocate_block(ptr: *mut u8, size: usize) -> Option<*mut u8> {
    let ptr = realloc(ptr as *mut c_void, size);
    if ptr.is_null() {
        None
    } else {
        Some(ptr.cast())
    }
}

/// Returns a block to the C heap.
///
/// # Safety
/// `ptr` must be a live block from this module.
pub unsafe fn free_block(ptr: *mut u8) {
    free(ptr as *mut c_void);
}

/// Queries the page size from `sysconf`.
pub fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { sysconf(_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        FALLBACK_PAGE_SIZE
    }
}
