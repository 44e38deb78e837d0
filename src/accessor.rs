//! The accessor capability: typed raw access, native memory, layout queries,
//! compare-and-swap and fences.
//!
//! # Addressing
//!
//! Every typed method names a location with an [`ObjectRef`] and an [`Offset`]
//! (double-register addressing). The result is defined only when one of these
//! holds:
//!
//! - the offset came from [`MemoryAccessor::object_field_offset`] and `o`
//!   references an instance of the field's type;
//! - the offset and `o` came from [`MemoryAccessor::static_field_offset`] and
//!   [`MemoryAccessor::static_field_base`] for the same static;
//! - `o` references an array and the offset is `B + N * S` where `N` is a valid
//!   index and `B`, `S` are [`MemoryAccessor::array_base_offset`] and
//!   [`MemoryAccessor::array_index_scale`] for its element type;
//! - `o` is [`ObjectRef::NULL`] and the offset is a native address, e.g. from
//!   [`MemoryAccessor::allocate_memory`].
//!
//! Reading or writing a location with a width other than the one it holds is
//! undefined. Nothing is checked: the methods are `unsafe` and misuse is
//! undefined behaviour, never an error.
//!
//! # Ordering flavors
//!
//! - *plain* `get_*`/`put_*`: program order on the issuing thread only. Valid
//!   under external synchronization or single-threaded use. Alignment is not
//!   required.
//! - *volatile* `get_*_volatile`/`put_*_volatile`: atomic and sequentially
//!   consistent, so at least acquire on load and release on store. Requires
//!   natural alignment.
//! - *ordered* `put_ordered_*`: a release store that becomes visible eventually.
//!   Only useful when the location is otherwise accessed with volatile
//!   operations.

use core::fmt;
use core::mem;
use core::ops::Deref;
use core::sync::atomic::{fence, Ordering};
use std::sync::OnceLock;

use crate::backend::{self, primitive::{self, CasPrimitive, Primitive}};
use crate::config::BackendKind;
use crate::error::MemoryError;
use crate::layout::{ElementType, Field, ARRAY_BASE_OFFSET};
use crate::locator::Locator;
use crate::object::{effective_address, Address, ObjectRef, Offset};
use crate::ordering::{ORDERED_STORE, VOLATILE_LOAD, VOLATILE_STORE};

macro_rules! typed_access {
    ($($ty:ty, $what:literal => $get:ident, $put:ident, $get_volatile:ident, $put_volatile:ident;)*) => {$(
        #[doc = concat!("Reads ", $what, " with plain semantics.")]
        ///
        /// # Safety
        /// `(o, offset)` must name a live location of this width; see the module
        /// docs.
        #[inline]
        unsafe fn $get(&self, o: ObjectRef, offset: Offset) -> $ty {
            <$ty as Primitive>::read_plain(effective_address(o, offset))
        }

        #[doc = concat!("Writes ", $what, " with plain semantics.")]
        ///
        /// # Safety
        /// `(o, offset)` must name a live, writable location of this width; see
        /// the module docs.
        #[inline]
        unsafe fn $put(&self, o: ObjectRef, offset: Offset, x: $ty) {
            <$ty as Primitive>::write_plain(effective_address(o, offset), x);
        }

        #[doc = concat!("Reads ", $what, " with volatile (acquire) semantics.")]
        ///
        /// # Safety
        /// As the plain read; additionally the location must be naturally
        /// aligned.
        #[inline]
        unsafe fn $get_volatile(&self, o: ObjectRef, offset: Offset) -> $ty {
            <$ty as Primitive>::load(effective_address(o, offset), VOLATILE_LOAD)
        }

        #[doc = concat!("Writes ", $what, " with volatile (release) semantics.")]
        ///
        /// # Safety
        /// As the plain write; additionally the location must be naturally
        /// aligned.
        #[inline]
        unsafe fn $put_volatile(&self, o: ObjectRef, offset: Offset, x: $ty) {
            <$ty as Primitive>::store(effective_address(o, offset), x, VOLATILE_STORE);
        }
    )*};
}

/// Low-level memory access usable for type punning.
///
/// Backends provide the native-memory lifecycle; every other operation has a
/// shared implementation over [`primitive`](crate::backend::primitive) that a
/// backend may override.
pub trait MemoryAccessor: Send + Sync {
    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;

    typed_access! {
        bool, "a `bool`" => get_boolean, put_boolean, get_boolean_volatile, put_boolean_volatile;
        i8, "a byte" => get_byte, put_byte, get_byte_volatile, put_byte_volatile;
        i16, "a short" => get_short, put_short, get_short_volatile, put_short_volatile;
        u16, "a char (UTF-16 unit)" => get_char, put_char, get_char_volatile, put_char_volatile;
        i32, "an int" => get_int, put_int, get_int_volatile, put_int_volatile;
        i64, "a long" => get_long, put_long, get_long_volatile, put_long_volatile;
        f32, "a float" => get_float, put_float, get_float_volatile, put_float_volatile;
        f64, "a double" => get_double, put_double, get_double_volatile, put_double_volatile;
        ObjectRef, "a reference" => get_object, put_object, get_object_volatile, put_object_volatile;
    }

    /// Ordered (lazy) version of [`put_int_volatile`](Self::put_int_volatile).
    ///
    /// # Safety
    /// As the volatile write.
    #[inline]
    unsafe fn put_ordered_int(&self, o: ObjectRef, offset: Offset, x: i32) {
        i32::store(effective_address(o, offset), x, ORDERED_STORE);
    }

    /// Ordered (lazy) version of [`put_long_volatile`](Self::put_long_volatile).
    ///
    /// # Safety
    /// As the volatile write.
    #[inline]
    unsafe fn put_ordered_long(&self, o: ObjectRef, offset: Offset, x: i64) {
        i64::store(effective_address(o, offset), x, ORDERED_STORE);
    }

    /// Ordered (lazy) version of [`put_object_volatile`](Self::put_object_volatile):
    /// the store is not guaranteed to be immediately visible to other threads.
    ///
    /// # Safety
    /// As the volatile write.
    #[inline]
    unsafe fn put_ordered_object(&self, o: ObjectRef, offset: Offset, x: ObjectRef) {
        ObjectRef::store(effective_address(o, offset), x, ORDERED_STORE);
    }

    /// Reads a native pointer at an absolute address, zero-extended to 64 bits.
    ///
    /// # Safety
    /// `address` must be valid for a pointer-width read.
    #[inline]
    unsafe fn get_address(&self, address: Address) -> Address {
        let ptr = effective_address(ObjectRef::NULL, address);
        if cfg!(target_pointer_width = "64") {
            u64::read_plain(ptr) as Address
        } else {
            Address::from(u32::read_plain(ptr))
        }
    }

    /// Writes a native pointer at an absolute address. On 32-bit targets the high
    /// half of `x` is dropped.
    ///
    /// # Safety
    /// `address` must be valid for a pointer-width write.
    #[inline]
    unsafe fn put_address(&self, address: Address, x: Address) {
        let ptr = effective_address(ObjectRef::NULL, address);
        if cfg!(target_pointer_width = "64") {
            u64::write_plain(ptr, x as u64);
        } else {
            u32::write_plain(ptr, x as u32);
        }
    }

    /// Allocates a block of native memory of `bytes` bytes.
    ///
    /// The contents are uninitialized. The address is never zero for a non-zero
    /// size and is aligned for every value type; `bytes == 0` returns `0`
    /// without allocating. Release the block with
    /// [`free_memory`](Self::free_memory) or resize it with
    /// [`reallocate_memory`](Self::reallocate_memory).
    ///
    /// # Errors
    /// [`MemoryError::InvalidArgument`] if `bytes` is negative or too large for
    /// the platform; [`MemoryError::OutOfMemory`] if the allocator refuses.
    fn allocate_memory(&self, bytes: i64) -> Result<Address, MemoryError>;

    /// Resizes a block of native memory, preserving the first
    /// `min(old, bytes)` bytes. The rest is uninitialized.
    ///
    /// `address == 0` allocates. The result is zero iff `bytes == 0`, in which
    /// case the old block is released.
    ///
    /// # Errors
    /// As [`allocate_memory`](Self::allocate_memory). On error the old block is
    /// still owned by the caller.
    ///
    /// # Safety
    /// `address` must be `0` or a live block from this backend.
    unsafe fn reallocate_memory(&self, address: Address, bytes: i64)
        -> Result<Address, MemoryError>;

    /// Releases a block from [`allocate_memory`](Self::allocate_memory) or
    /// [`reallocate_memory`](Self::reallocate_memory). `0` is ignored.
    ///
    /// # Safety
    /// `address` must be `0` or a live block from this backend; releasing twice
    /// is undefined.
    unsafe fn free_memory(&self, address: Address);

    /// Sets `bytes` bytes starting at `(o, offset)` to `value`.
    ///
    /// Stores happen in coherent units: 8 bytes when the effective address and
    /// length are both multiples of 8, else 4 or 2 bytes likewise, else single
    /// bytes.
    ///
    /// # Safety
    /// The whole range must be valid for writes.
    #[inline]
    unsafe fn set_memory(&self, o: ObjectRef, offset: Offset, bytes: i64, value: u8) {
        debug_assert!(bytes >= 0, "negative length {bytes}");
        primitive::fill(effective_address(o, offset), bytes as usize, value);
    }

    /// Single-register form of [`set_memory`](Self::set_memory).
    ///
    /// # Safety
    /// As [`set_memory`](Self::set_memory).
    #[inline]
    unsafe fn set_memory_at(&self, address: Address, bytes: i64, value: u8) {
        self.set_memory(ObjectRef::NULL, address, bytes, value);
    }

    /// Copies `bytes` bytes from `(src_base, src_offset)` to
    /// `(dst_base, dst_offset)`, in coherent units chosen as in
    /// [`set_memory`](Self::set_memory) from both addresses and the length.
    ///
    /// Whether overlapping ranges are supported is not part of the contract;
    /// callers must not rely on it.
    ///
    /// # Safety
    /// The source range must be valid for reads and the destination range for
    /// writes.
    #[inline]
    unsafe fn copy_memory(
        &self,
        src_base: ObjectRef,
        src_offset: Offset,
        dst_base: ObjectRef,
        dst_offset: Offset,
        bytes: i64,
    ) {
        debug_assert!(bytes >= 0, "negative length {bytes}");
        primitive::copy(
            effective_address(src_base, src_offset),
            effective_address(dst_base, dst_offset),
            bytes as usize,
        );
    }

    /// Single-register form of [`copy_memory`](Self::copy_memory).
    ///
    /// # Safety
    /// As [`copy_memory`](Self::copy_memory).
    #[inline]
    unsafe fn copy_memory_at(&self, src: Address, dst: Address, bytes: i64) {
        self.copy_memory(ObjectRef::NULL, src, ObjectRef::NULL, dst, bytes);
    }

    /// Offset of an instance field, usable with any instance of its type.
    ///
    /// Do not do arithmetic on it; it is a cookie for the typed accessors.
    fn object_field_offset(&self, field: &Field) -> Offset {
        debug_assert!(!field.is_static(), "`{}` is a static", field.name());
        field.cookie()
    }

    /// Offset of a static, to be paired with
    /// [`static_field_base`](Self::static_field_base).
    fn static_field_offset(&self, field: &Field) -> Offset {
        debug_assert!(field.is_static(), "`{}` is an instance field", field.name());
        field.cookie()
    }

    /// Base for a static's offset. Statics live at absolute addresses, so this
    /// is [`ObjectRef::NULL`].
    fn static_field_base(&self, field: &Field) -> ObjectRef {
        debug_assert!(field.is_static(), "`{}` is an instance field", field.name());
        ObjectRef::NULL
    }

    /// Offset of element 0 in an array of `element`.
    fn array_base_offset(&self, _element: ElementType) -> i32 {
        ARRAY_BASE_OFFSET
    }

    /// Bytes between consecutive elements in an array of `element`.
    fn array_index_scale(&self, element: ElementType) -> i32 {
        element.size() as i32
    }

    /// Size of a native pointer: 4 or 8.
    fn address_size(&self) -> i32 {
        mem::size_of::<usize>() as i32
    }

    /// Size of a native memory page. Always a power of two.
    fn page_size(&self) -> i32 {
        backend::page_size() as i32
    }

    /// Atomically replaces the reference at `(o, offset)` with `x` if it
    /// currently equals `expected`. Returns `true` on success.
    ///
    /// # Safety
    /// As the volatile accessors.
    #[inline]
    unsafe fn compare_and_swap_object(
        &self,
        o: ObjectRef,
        offset: Offset,
        expected: ObjectRef,
        x: ObjectRef,
    ) -> bool {
        ObjectRef::compare_and_swap(effective_address(o, offset), expected, x)
    }

    /// Atomically replaces the int at `(o, offset)` with `x` if it currently
    /// equals `expected`. Returns `true` on success.
    ///
    /// # Safety
    /// As the volatile accessors.
    #[inline]
    unsafe fn compare_and_swap_int(&self, o: ObjectRef, offset: Offset, expected: i32, x: i32) -> bool {
        i32::compare_and_swap(effective_address(o, offset), expected, x)
    }

    /// Atomically replaces the long at `(o, offset)` with `x` if it currently
    /// equals `expected`. Returns `true` on success.
    ///
    /// # Safety
    /// As the volatile accessors.
    #[inline]
    unsafe fn compare_and_swap_long(&self, o: ObjectRef, offset: Offset, expected: i64, x: i64) -> bool {
        i64::compare_and_swap(effective_address(o, offset), expected, x)
    }

    /// Loads before the fence are not reordered with loads or stores after it.
    #[inline]
    fn load_fence(&self) {
        fence(Ordering::Acquire);
    }

    /// Stores before the fence are not reordered with loads or stores after it.
    #[inline]
    fn store_fence(&self) {
        fence(Ordering::Release);
    }

    /// Loads and stores before the fence are not reordered with loads or stores
    /// after it.
    #[inline]
    fn full_fence(&self) {
        fence(Ordering::SeqCst);
    }
}

/// The process-wide accessor handle.
///
/// Obtain it once with [`Accessor::get`] and pass it (it is `Copy`) to whatever
/// needs raw memory access. It dereferences to [`MemoryAccessor`].
#[derive(Clone, Copy)]
pub struct Accessor {
    backend: &'static dyn MemoryAccessor,
}

impl Accessor {
    /// Returns the accessor for this process.
    ///
    /// The first call resolves the backend through [`Locator::global`]; every
    /// later call returns the same instance.
    ///
    /// # Panics
    /// Panics if no accessor provider is registered with the global locator.
    pub fn get() -> Self {
        static INSTANCE: OnceLock<Accessor> = OnceLock::new();
        *INSTANCE.get_or_init(|| Self::from_static(Locator::global().load::<dyn MemoryAccessor>()))
    }

    /// Wraps an existing backend.
    pub const fn from_static(backend: &'static dyn MemoryAccessor) -> Self {
        Self { backend }
    }

    /// Builds a handle over a specific backend variant, bypassing the locator.
    ///
    /// Backends are stateless, so this does not allocate.
    pub fn with_backend(kind: BackendKind) -> Self {
        Self::from_static(Box::leak(backend::create(kind)))
    }

    /// The backend behind this handle.
    pub fn backend(self) -> &'static dyn MemoryAccessor {
        self.backend
    }
}

impl Deref for Accessor {
    type Target = dyn MemoryAccessor;

    fn deref(&self) -> &Self::Target {
        self.backend
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("backend", &self.backend.name())
            .finish()
    }
}
