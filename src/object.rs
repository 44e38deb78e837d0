//! Object references, offsets and absolute addresses.
//!
//! Every accessor call names a location with two values: an [`ObjectRef`] base and
//! an [`Offset`]. With a non-null base the offset is relative to the start of that
//! allocation; with [`ObjectRef::NULL`] the offset *is* the absolute address.
//! Programmers should not assume the two addressing modes are interchangeable: an
//! offset is only meaningful together with the base it was derived for.

use core::fmt;
use core::ptr;

/// An opaque 64-bit cookie locating a field or array element within an object,
/// or an absolute address when paired with [`ObjectRef::NULL`].
pub type Offset = i64;

/// An absolute native address, as returned by
/// [`MemoryAccessor::allocate_memory`](crate::MemoryAccessor::allocate_memory).
///
/// `0` is the null address.
pub type Address = i64;

/// An untyped, pointer-sized handle to an allocation.
///
/// This is also the value type of reference-width loads, stores and CAS
/// (`get_object`, `put_object`, `compare_and_swap_object`, ...): two references
/// are equal iff they point at the same byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ObjectRef(*mut u8);

// SAFETY: an `ObjectRef` is an inert handle; every dereference goes through an
// `unsafe` accessor call whose caller vouches for validity.
unsafe impl Send for ObjectRef {}
unsafe impl Sync for ObjectRef {}

impl ObjectRef {
    /// The null reference. As a base it selects absolute addressing.
    pub const NULL: Self = Self(ptr::null_mut());

    /// Wraps a raw pointer.
    #[inline(always)]
    pub const fn from_ptr<T>(ptr: *mut T) -> Self {
        Self(ptr.cast())
    }

    /// References the storage of `value`.
    ///
    /// Writes through the returned handle are only sound where `T` provides
    /// interior mutability (atomics, `UnsafeCell`); use [`ObjectRef::from_mut`]
    /// otherwise.
    #[inline(always)]
    pub fn from_ref<T: ?Sized>(value: &T) -> Self {
        Self((value as *const T).cast::<u8>().cast_mut())
    }

    /// References the storage of `value` for reads and writes.
    #[inline(always)]
    pub fn from_mut<T: ?Sized>(value: &mut T) -> Self {
        Self((value as *mut T).cast())
    }

    /// References element 0 of `slice`; this is the base for array offsets.
    #[inline(always)]
    pub fn from_slice<T>(slice: &mut [T]) -> Self {
        Self(slice.as_mut_ptr().cast())
    }

    /// Reinterprets an absolute address as a reference.
    #[inline(always)]
    pub fn from_address(address: Address) -> Self {
        Self(address as usize as *mut u8)
    }

    /// Returns the underlying pointer.
    #[inline(always)]
    pub const fn as_ptr(self) -> *mut u8 {
        self.0
    }

    /// Returns the numeric address of this reference.
    #[inline(always)]
    pub fn address(self) -> Address {
        self.0 as usize as Address
    }

    /// Returns `true` for [`ObjectRef::NULL`].
    #[inline(always)]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:p})", self.0)
    }
}

/// Resolves a (base, offset) pair to the byte it names.
///
/// A null base turns the offset into an absolute address. Otherwise the offset
/// is applied to the base without bounds checks.
#[inline(always)]
pub(crate) fn effective_address(base: ObjectRef, offset: Offset) -> *mut u8 {
    if base.is_null() {
        offset as usize as *mut u8
    } else {
        base.0.wrapping_offset(offset as isize)
    }
}
