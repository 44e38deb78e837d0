#![cfg(windows)]
//! Native blocks from the Windows process heap.

use core::mem::MaybeUninit;

use windows_sys::Win32::System::Memory::{GetProcessHeap, HeapAlloc, HeapFree, HeapReAlloc};
use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

use super::FALLBACK_PAGE_SIZE;

/// Allocates `size` bytes from the process heap.
/// Returns a pointer aligned for every fundamental type, or None if refused.
///
/// # Safety
/// `size` must be non-zero.
pub unsafe fn allocate_block(size: usize) -> Option<*mut u8> {
    let ptr = HeapAlloc(GetProcessHeap(), 0, size);
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
    let ptr = HeapReAlloc(GetProcessHeap(), 0, ptr as *const _, size);
    if ptr.is_null() {
        None
    } else {
        Some(ptr.cast())
    }
}

/// Returns a block to the process heap.
///
/// # Safety
/// `ptr` must be a live block from this module.
pub unsafe fn free_block(ptr: *mut u8) {
    HeapFree(GetProcessHeap(), 0, ptr as *const _);
}

/// Queries the page size from `GetSystemInfo`.
pub fn page_size() -> usize {
    let mut info = MaybeUninit::<SYSTEM_INFO>::zeroed();
    // SAFETY: GetSystemInfo fills the whole struct.
    let info = unsafe {
        GetSystemInfo(info.as_mut_ptr());
        info.assume_init()
    };
    match info.dwPageSize as usize {
        0 => FALLBACK_PAGE_SIZE,
        size => size,
    }
}
