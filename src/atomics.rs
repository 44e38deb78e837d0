//! Composite atomic operations.
//!
//! Everything here is built from two primitives only: a volatile load and a
//! compare-and-swap ([`VolatileCas`]). Each operation reads the current value,
//! computes the replacement and retries the CAS until it succeeds, so it works on
//! top of any backend.
//!
//! The loops are unbounded and do not back off. They are lock-free: a failed CAS
//! means another thread's CAS on the same location succeeded. They are not
//! wait-free: one thread may retry arbitrarily often under contention.

use num_traits::WrappingAdd;

use crate::accessor::MemoryAccessor;
use crate::object::{ObjectRef, Offset};

/// The two primitives composite operations are built from.
///
/// Implemented for every [`MemoryAccessor`] (trait objects included) for `i32`,
/// `i64` and [`ObjectRef`].
pub trait VolatileCas<T: Copy> {
    /// Volatile load of the value at `(o, offset)`.
    ///
    /// # Safety
    /// As the accessor's volatile getters.
    unsafe fn load_volatile(&self, o: ObjectRef, offset: Offset) -> T;

    /// Replaces the value at `(o, offset)` with `new` iff it equals `expected`.
    ///
    /// # Safety
    /// As the accessor's compare-and-swap methods.
    unsafe fn compare_and_swap(&self, o: ObjectRef, offset: Offset, expected: T, new: T) -> bool;
}

impl<A: MemoryAccessor + ?Sized> VolatileCas<i32> for A {
    #[inline(always)]
    unsafe fn load_volatile(&self, o: ObjectRef, offset: Offset) -> i32 {
        self.get_int_volatile(o, offset)
    }

    #[inline(always)]
    unsafe fn compare_and_swap(&self, o: ObjectRef, offset: Offset, expected: i32, new: i32) -> bool {
        self.compare_and_swap_int(o, offset, expected, new)
    }
}

impl<A: MemoryAccessor + ?Sized> VolatileCas<i64> for A {
    #[inline(always)]
    unsafe fn load_volatile(&self, o: ObjectRef, offset: Offset) -> i64 {
        self.get_long_volatile(o, offset)
    }

    #[inline(always)]
    unsafe fn compare_and_swap(&self, o: ObjectRef, offset: Offset, expected: i64, new: i64) -> bool {
        self.compare_and_swap_long(o, offset, expected, new)
    }
}

impl<A: MemoryAccessor + ?Sized> VolatileCas<ObjectRef> for A {
    #[inline(always)]
    unsafe fn load_volatile(&self, o: ObjectRef, offset: Offset) -> ObjectRef {
        self.get_object_volatile(o, offset)
    }

    #[inline(always)]
    unsafe fn compare_and_swap(
        &self,
        o: ObjectRef,
        offset: Offset,
        expected: ObjectRef,
        new: ObjectRef,
    ) -> bool {
        self.compare_and_swap_object(o, offset, expected, new)
    }
}

/// Atomically replaces the value `v` at `(o, offset)` with `update(v)` and returns
/// `v`.
///
/// `update` may run several times, once per attempt, and should be pure.
///
/// # Safety
/// `(o, offset)` must name a live, naturally aligned location of type `T`.
#[inline]
pub unsafe fn get_and_update<T, A, F>(accessor: &A, o: ObjectRef, offset: Offset, mut update: F) -> T
where
    T: Copy,
    A: VolatileCas<T> + ?Sized,
    F: FnMut(T) -> T,
{
    loop {
        let current = accessor.load_volatile(o, offset);
        if accessor.compare_and_swap(o, offset, current, update(current)) {
            return current;
        }
    }
}

/// Atomically adds `delta` (wrapping on overflow) and returns the previous value.
///
/// # Safety
/// As [`get_and_update`].
#[inline]
pub unsafe fn get_and_add<T, A>(accessor: &A, o: ObjectRef, offset: Offset, delta: T) -> T
where
    T: Copy + WrappingAdd,
    A: VolatileCas<T> + ?Sized,
{
    get_and_update(accessor, o, offset, |v: T| v.wrapping_add(&delta))
}

/// Atomically stores `new_value` and returns the previous value.
///
/// # Safety
/// As [`get_and_update`].
#[inline]
pub unsafe fn get_and_set<T, A>(accessor: &A, o: ObjectRef, offset: Offset, new_value: T) -> T
where
    T: Copy,
    A: VolatileCas<T> + ?Sized,
{
    get_and_update(accessor, o, offset, |_| new_value)
}

/// Atomically adds `delta` to the int at `(o, offset)`; returns the previous value.
///
/// # Safety
/// As [`get_and_update`].
#[inline]
pub unsafe fn get_and_add_int<A>(accessor: &A, o: ObjectRef, offset: Offset, delta: i32) -> i32
where
    A: MemoryAccessor + ?Sized,
{
    get_and_add(accessor, o, offset, delta)
}

/// Atomically adds `delta` to the long at `(o, offset)`; returns the previous
/// value.
///
/// # Safety
/// As [`get_and_update`].
#[inline]
pub unsafe fn get_and_add_long<A>(accessor: &A, o: ObjectRef, offset: Offset, delta: i64) -> i64
where
    A: MemoryAccessor + ?Sized,
{
    get_and_add(accessor, o, offset, delta)
}

/// Atomically exchanges the int at `(o, offset)`; returns the previous value.
///
/// # Safety
/// As [`get_and_update`].
#[inline]
pub unsafe fn get_and_set_int<A>(accessor: &A, o: ObjectRef, offset: Offset, new_value: i32) -> i32
where
    A: MemoryAccessor + ?Sized,
{
    get_and_set(accessor, o, offset, new_value)
}

/// Atomically exchanges the long at `(o, offset)`; returns the previous value.
///
/// # Safety
/// As [`get_and_update`].
#[inline]
pub unsafe fn get_and_set_long<A>(accessor: &A, o: ObjectRef, offset: Offset, new_value: i64) -> i64
where
    A: MemoryAccessor + ?Sized,
{
    get_and_set(accessor, o, offset, new_value)
}

/// Atomically exchanges the reference at `(o, offset)`; returns the previous
/// reference.
///
/// # Safety
/// As [`get_and_update`].
#[inline]
pub unsafe fn get_and_set_object<A>(
    accessor: &A,
    o: ObjectRef,
    offset: Offset,
    new_value: ObjectRef,
) -> ObjectRef
where
    A: MemoryAccessor + ?Sized,
{
    get_and_set(accessor, o, offset, new_value)
}
