//! Whole-struct transfers for plain-old-data types.
//!
//! [`read_pod`] and [`write_pod`] move a `T` through the accessor's bulk copy, so
//! they take the same double-register locations as the typed accessors and keep
//! the same unit coherence. `zerocopy` vouches that every bit pattern read back is
//! a valid `T` and that `T` has no padding to leak.

use zerocopy::{AsBytes, FromBytes};

use crate::accessor::MemoryAccessor;
use crate::object::{ObjectRef, Offset};

/// Reads a `T` stored at `(o, offset)`.
///
/// # Safety
/// `(o, offset)` must be valid for reads of `size_of::<T>()` bytes. Alignment is
/// not required.
pub unsafe fn read_pod<T, A>(accessor: &A, o: ObjectRef, offset: Offset) -> T
where
    T: FromBytes + AsBytes,
    A: MemoryAccessor + ?Sized,
{
    let mut value = T::new_zeroed();
    let bytes = value.as_bytes_mut();
    accessor.copy_memory(o, offset, ObjectRef::from_slice(bytes), 0, bytes.len() as i64);
    value
}

/// Writes `value` to `(o, offset)`.
///
/// # Safety
/// `(o, offset)` must be valid for writes of `size_of::<T>()` bytes. Alignment is
/// not required.
pub unsafe fn write_pod<T, A>(accessor: &A, o: ObjectRef, offset: Offset, value: &T)
where
    T: AsBytes + ?Sized,
    A: MemoryAccessor + ?Sized,
{
    let bytes = value.as_bytes();
    accessor.copy_memory(ObjectRef::from_ref(bytes), 0, o, offset, bytes.len() as i64);
}
