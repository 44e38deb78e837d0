//! Memory orderings behind each access flavor.

use core::sync::atomic::Ordering;

/// Volatile loads. Sequentially consistent so that all volatile accesses share
/// one total order; this subsumes acquire.
pub const VOLATILE_LOAD: Ordering = Ordering::SeqCst;

/// Volatile stores. Pairs with [`VOLATILE_LOAD`]; subsumes release.
pub const VOLATILE_STORE: Ordering = Ordering::SeqCst;

/// Ordered (lazy) stores: release only, no trailing store-load barrier.
pub const ORDERED_STORE: Ordering = Ordering::Release;

/// CAS success. A successful CAS is a volatile read followed by a volatile write.
pub const CAS_SUCCESS: Ordering = Ordering::SeqCst;

/// CAS failure. The observed value is a volatile read.
pub const CAS_FAILURE: Ordering = Ordering::SeqCst;

/// Per-unit ordering of bulk fills and copies. Units are never torn, but carry no
/// cross-thread ordering.
pub const BULK_UNIT: Ordering = Ordering::Relaxed;
