//! Raw typed primitives shared by every backend.
//!
//! These are the only places that touch memory. Plain accesses are ordinary
//! unaligned reads and writes; volatile, ordered and CAS accesses reinterpret the
//! target as the matching `core::sync::atomic` type via `from_ptr`, which
//! requires natural alignment.

use core::ptr;
use core::sync::atomic::{
    AtomicBool, AtomicI16, AtomicI32, AtomicI64, AtomicI8, AtomicPtr, AtomicU16, AtomicU32,
    AtomicU64, AtomicU8, Ordering,
};

use crate::layout::ElementType;
use crate::object::ObjectRef;
use crate::ordering::{BULK_UNIT, CAS_FAILURE, CAS_SUCCESS};

mod sealed {
    pub trait Sealed {}
}

/// A value the accessor can load and store at a raw location.
///
/// Sealed: the set of widths is fixed by the accessor contract.
pub trait Primitive: Copy + Send + Sync + sealed::Sealed + 'static {
    /// Element type whose index scale matches this width.
    const ELEMENT: ElementType;

    /// Non-atomic read. Alignment is not required.
    ///
    /// # Safety
    /// `ptr` must be valid for reads of `size_of::<Self>()` bytes holding a valid
    /// `Self`.
    #[inline(always)]
    unsafe fn read_plain(ptr: *const u8) -> Self {
        ptr::read_unaligned(ptr.cast::<Self>())
    }

    /// Non-atomic write. Alignment is not required.
    ///
    /// # Safety
    /// `ptr` must be valid for writes of `size_of::<Self>()` bytes, with no
    /// concurrent access.
    #[inline(always)]
    unsafe fn write_plain(ptr: *mut u8, value: Self) {
        ptr::write_unaligned(ptr.cast::<Self>(), value);
    }

    /// Atomic load.
    ///
    /// # Safety
    /// `ptr` must be valid, naturally aligned, and hold a valid `Self`.
    unsafe fn load(ptr: *mut u8, order: Ordering) -> Self;

    /// Atomic store.
    ///
    /// # Safety
    /// `ptr` must be valid for writes and naturally aligned.
    unsafe fn store(ptr: *mut u8, value: Self, order: Ordering);
}

/// A [`Primitive`] with a native compare-and-swap.
pub trait CasPrimitive: Primitive {
    /// Replaces the value at `ptr` with `new` iff it is bit-identical to
    /// `expected`. Returns whether the swap happened.
    ///
    /// # Safety
    /// Same requirements as [`Primitive::store`].
    unsafe fn compare_and_swap(ptr: *mut u8, expected: Self, new: Self) -> bool;
}

macro_rules! atomic_primitive {
    ($($ty:ty => $atomic:ty, $element:ident;)*) => {$(
        impl sealed::Sealed for $ty {}

        impl Primitive for $ty {
            const ELEMENT: ElementType = ElementType::$element;

            #[inline(always)]
            unsafe fn load(ptr: *mut u8, order: Ordering) -> Self {
                <$atomic>::from_ptr(ptr.cast()).load(order)
            }

            #[inline(always)]
            unsafe fn store(ptr: *mut u8, value: Self, order: Ordering) {
                <$atomic>::from_ptr(ptr.cast()).store(value, order);
            }
        }
    )*};
}

atomic_primitive! {
    bool => AtomicBool, Boolean;
    i8 => AtomicI8, Byte;
    u8 => AtomicU8, Byte;
    i16 => AtomicI16, Short;
    u16 => AtomicU16, Char;
    i32 => AtomicI32, Int;
    u32 => AtomicU32, Int;
    i64 => AtomicI64, Long;
    u64 => AtomicU64, Long;
}

macro_rules! atomic_cas {
    ($($ty:ty => $atomic:ty;)*) => {$(
        impl CasPrimitive for $ty {
            #[inline(always)]
            unsafe fn compare_and_swap(ptr: *mut u8, expected: Self, new: Self) -> bool {
                <$atomic>::from_ptr(ptr.cast())
                    .compare_exchange(expected, new, CAS_SUCCESS, CAS_FAILURE)
                    .is_ok()
            }
        }
    )*};
}

atomic_cas! {
    i32 => AtomicI32;
    i64 => AtomicI64;
}

// Floats travel through the integer atomic of the same width; `to_bits` and
// `from_bits` keep the exact bit pattern, NaN payloads included.
impl sealed::Sealed for f32 {}

impl Primitive for f32 {
    const ELEMENT: ElementType = ElementType::Float;

    #[inline(always)]
    unsafe fn load(ptr: *mut u8, order: Ordering) -> Self {
        f32::from_bits(u32::load(ptr, order))
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut u8, value: Self, order: Ordering) {
        u32::store(ptr, value.to_bits(), order);
    }
}

impl sealed::Sealed for f64 {}

impl Primitive for f64 {
    const ELEMENT: ElementType = ElementType::Double;

    #[inline(always)]
    unsafe fn load(ptr: *mut u8, order: Ordering) -> Self {
        f64::from_bits(u64::load(ptr, order))
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut u8, value: Self, order: Ordering) {
        u64::store(ptr, value.to_bits(), order);
    }
}

impl sealed::Sealed for ObjectRef {}

impl Primitive for ObjectRef {
    const ELEMENT: ElementType = ElementType::Object;

    #[inline(always)]
    unsafe fn load(ptr: *mut u8, order: Ordering) -> Self {
        ObjectRef::from_ptr(AtomicPtr::<u8>::from_ptr(ptr.cast()).load(order))
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut u8, value: Self, order: Ordering) {
        AtomicPtr::<u8>::from_ptr(ptr.cast()).store(value.as_ptr(), order);
    }
}

impl CasPrimitive for ObjectRef {
    #[inline(always)]
    unsafe fn compare_and_swap(ptr: *mut u8, expected: Self, new: Self) -> bool {
        AtomicPtr::<u8>::from_ptr(ptr.cast())
            .compare_exchange(expected.as_ptr(), new.as_ptr(), CAS_SUCCESS, CAS_FAILURE)
            .is_ok()
    }
}

/// Largest coherent unit (8, 4, 2 or 1 bytes) that divides every address and
/// the length folded into `bits`.
#[inline(always)]
pub(crate) fn unit_size(bits: usize) -> usize {
    if bits & 7 == 0 {
        8
    } else if bits & 3 == 0 {
        4
    } else if bits & 1 == 0 {
        2
    } else {
        1
    }
}

/// Fills `bytes` bytes at `dst` with `value`, storing in the widest coherent unit
/// the address and length allow.
///
/// # Safety
/// `dst` must be valid for writes of `bytes` bytes.
pub(crate) unsafe fn fill(dst: *mut u8, bytes: usize, value: u8) {
    match unit_size(dst as usize | bytes) {
        8 => fill_units(dst, bytes / 8, u64::from_ne_bytes([value; 8])),
        4 => fill_units(dst, bytes / 4, u32::from_ne_bytes([value; 4])),
        2 => fill_units(dst, bytes / 2, u16::from_ne_bytes([value; 2])),
        _ => ptr::write_bytes(dst, value, bytes),
    }
}

#[inline(always)]
unsafe fn fill_units<T: Primitive>(dst: *mut u8, count: usize, pattern: T) {
    let width = core::mem::size_of::<T>();
    for i in 0..count {
        T::store(dst.add(i * width), pattern, BULK_UNIT);
    }
}

/// Copies `bytes` bytes from `src` to `dst` in the widest coherent unit both
/// addresses and the length allow.
///
/// Units are moved front-to-back when `dst` precedes `src` and back-to-front
/// otherwise, so overlapping ranges come out as if buffered.
///
/// # Safety
/// `src` must be valid for reads and `dst` for writes of `bytes` bytes.
pub(crate) unsafe fn copy(src: *const u8, dst: *mut u8, bytes: usize) {
    match unit_size(src as usize | dst as usize | bytes) {
        8 => copy_units::<u64>(src, dst, bytes / 8),
        4 => copy_units::<u32>(src, dst, bytes / 4),
        2 => copy_units::<u16>(src, dst, bytes / 2),
        _ => ptr::copy(src, dst, bytes),
    }
}

#[inline(always)]
unsafe fn copy_units<T: Primitive>(src: *const u8, dst: *mut u8, count: usize) {
    let width = core::mem::size_of::<T>();
    let src = src.cast_mut();
    if (dst as usize) <= (src as usize) {
        for i in 0..count {
            let offset = i * width;
            T::store(dst.add(offset), T::load(src.add(offset), BULK_UNIT), BULK_UNIT);
        }
    } else {
        for i in (0..count).rev() {
            let offset = i * width;
            T::store(dst.add(offset), T::load(src.add(offset), BULK_UNIT), BULK_UNIT);
        }
    }
}
