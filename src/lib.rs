//! # `rawmem` - Low-Level Memory Accessor
//!
//! Typed raw reads and writes at arbitrary object offsets and native addresses,
//! native memory management, layout discovery, compare-and-swap, fences and
//! composite atomics, behind one process-wide capability.
//!
//! ## Safety Model
//!
//! Nothing here is checked. Every access method is `unsafe` and names its target
//! with an ([`ObjectRef`], [`Offset`]) pair; passing a pair that does not name a
//! live location of the accessed width is undefined behaviour, not an error. The
//! only fallible operations are native allocation and configuration parsing.
//!
//! ## Architecture
//!
//! 1. **Accessor** ([`MemoryAccessor`], [`Accessor`]):
//!    - Plain, volatile and ordered typed access for every primitive width
//!    - Native memory: allocate, reallocate, free, set, copy
//!    - Layout queries, CAS on int/long/reference, load/store/full fences
//!
//! 2. **Backends** ([`backend`]):
//!    - [`SystemBackend`](backend::SystemBackend): the platform heap
//!    - [`GlobalAllocBackend`](backend::GlobalAllocBackend): the Rust global
//!      allocator
//!
//! 3. **Composite atomics** ([`atomics`]):
//!    - `get_and_add_*` and `get_and_set_*`, built from a volatile load and a
//!      CAS retry loop only
//!
//! 4. **Locator** ([`Locator`]):
//!    - Resolves the accessor once per process; the backend is picked by
//!      [`AccessorConfig`]
//!
//! ## Example
//!
//! ```rust
//! use rawmem::{Accessor, MemoryAccessor, ObjectRef};
//!
//! let memory = Accessor::get();
//! let address = memory.allocate_memory(16).unwrap();
//! unsafe {
//!     memory.put_long(ObjectRef::NULL, address, 42);
//!     assert_eq!(memory.get_long(ObjectRef::NULL, address), 42);
//!     assert!(memory.compare_and_swap_long(ObjectRef::NULL, address, 42, 43));
//!     assert_eq!(rawmem::get_and_add_long(&*memory, ObjectRef::NULL, address, 1), 43);
//!     memory.free_memory(address);
//! }
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod accessor;
pub mod atomics;
pub mod backend;
pub mod config;
pub mod error;
pub mod layout;
pub mod locator;
pub mod object;
pub mod ordering;
pub mod pod;

pub use accessor::{Accessor, MemoryAccessor};
pub use atomics::{
    get_and_add, get_and_add_int, get_and_add_long, get_and_set, get_and_set_int,
    get_and_set_long, get_and_set_object, get_and_update, VolatileCas,
};
pub use config::{AccessorConfig, BackendKind};
pub use error::{ConfigError, MemoryError};
pub use layout::{ElementType, Field, FieldKind};
pub use locator::Locator;
pub use object::{Address, ObjectRef, Offset};
pub use pod::{read_pod, write_pod};

// Compile-time assertions for the addressing model.
const _: () = {
    use core::mem;

    // References are bare pointers.
    assert!(mem::size_of::<ObjectRef>() == mem::size_of::<usize>());
    assert!(mem::align_of::<ObjectRef>() == mem::align_of::<usize>());
    assert!(mem::size_of::<Option<Accessor>>() == mem::size_of::<Accessor>());

    // Offsets and addresses cover the whole address space.
    assert!(mem::size_of::<Offset>() >= mem::size_of::<usize>());

    // Backends are stateless.
    assert!(mem::size_of::<backend::SystemBackend>() == 0);
    assert!(mem::size_of::<backend::GlobalAllocBackend>() == 0);

    // Every element width matches its Rust type.
    assert!(ElementType::Char.size() == mem::size_of::<u16>());
    assert!(ElementType::Object.size() == mem::size_of::<ObjectRef>());
};
