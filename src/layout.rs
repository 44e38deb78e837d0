//! Layout discovery: array element types and field descriptors.
//!
//! Rust has no runtime reflection, so fields are described at the use site with
//! [`instance_field!`](crate::instance_field) and
//! [`static_field!`](crate::static_field). The resulting [`Field`] is what the
//! accessor's offset queries consume.

use core::mem;

use crate::object::Offset;

/// Offset of element 0 relative to an array reference.
///
/// An array reference is [`ObjectRef::from_slice`](crate::ObjectRef::from_slice),
/// i.e. a pointer to the first element. Rust arrays carry no header.
pub const ARRAY_BASE_OFFSET: i32 = 0;

/// The element kinds an array can be addressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// `bool`
    Boolean,
    /// `i8`
    Byte,
    /// `i16`
    Short,
    /// `u16`, a UTF-16 code unit.
    Char,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `f32`
    Float,
    /// `f64`
    Double,
    /// [`ObjectRef`](crate::ObjectRef), pointer sized.
    Object,
}

impl ElementType {
    /// Every element type, in declaration order.
    pub const ALL: [ElementType; 9] = [
        ElementType::Boolean,
        ElementType::Byte,
        ElementType::Short,
        ElementType::Char,
        ElementType::Int,
        ElementType::Long,
        ElementType::Float,
        ElementType::Double,
        ElementType::Object,
    ];

    /// Bytes occupied by one element.
    pub const fn size(self) -> usize {
        match self {
            ElementType::Boolean | ElementType::Byte => 1,
            ElementType::Short | ElementType::Char => 2,
            ElementType::Int | ElementType::Float => 4,
            ElementType::Long | ElementType::Double => 8,
            ElementType::Object => mem::size_of::<usize>(),
        }
    }
}

/// Index scale for arrays of an arbitrary `T`.
///
/// Zero-sized elements share one address and cannot be addressed independently,
/// so their scale is reported as `0`.
pub const fn index_scale_of<T>() -> i32 {
    mem::size_of::<T>() as i32
}

/// Where a described field lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A member of a struct, at `offset` bytes from the start of any instance.
    Instance {
        /// Byte offset within the owning type.
        offset: usize,
    },
    /// A `static`, at an absolute address.
    Static {
        /// Absolute address of the static.
        address: usize,
    },
}

/// Describes one field for the accessor's offset queries.
///
/// Any given field always produces the same offset and base, and two distinct
/// non-zero-sized fields of the same type never share both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    owner: &'static str,
    name: &'static str,
    kind: FieldKind,
}

impl Field {
    /// Describes an instance field. Prefer [`instance_field!`](crate::instance_field).
    pub fn instance(owner: &'static str, name: &'static str, offset: usize) -> Self {
        Self {
            owner,
            name,
            kind: FieldKind::Instance { offset },
        }
    }

    /// Describes a static living at `location`. Prefer
    /// [`static_field!`](crate::static_field).
    pub fn static_at<T>(owner: &'static str, name: &'static str, location: *const T) -> Self {
        Self {
            owner,
            name,
            kind: FieldKind::Static {
                address: location as usize,
            },
        }
    }

    /// Type (or module, for statics) that declares the field.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Field name as written at the declaration.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Instance or static placement.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns `true` for statics.
    pub fn is_static(&self) -> bool {
        matches!(self.kind, FieldKind::Static { .. })
    }

    /// The raw offset cookie: byte offset for instance fields, absolute address
    /// for statics.
    pub(crate) fn cookie(&self) -> Offset {
        match self.kind {
            FieldKind::Instance { offset } => offset as Offset,
            FieldKind::Static { address } => address as Offset,
        }
    }
}

/// Describes an instance field of a struct.
///
/// ```
/// use rawmem::instance_field;
///
/// #[repr(C)]
/// struct Pair {
///     left: i32,
///     right: i64,
/// }
///
/// let field = instance_field!(Pair, right);
/// assert_eq!(field.name(), "right");
/// assert!(!field.is_static());
/// ```
#[macro_export]
macro_rules! instance_field {
    ($ty:ty, $field:ident) => {
        $crate::layout::Field::instance(
            ::core::any::type_name::<$ty>(),
            ::core::stringify!($field),
            ::core::mem::offset_of!($ty, $field),
        )
    };
}

/// Describes a `static`.
///
/// The static should use interior mutability (atomics, `UnsafeCell`) if it is
/// going to be written through the accessor.
///
/// ```
/// use core::sync::atomic::AtomicI64;
/// use rawmem::static_field;
///
/// static HITS: AtomicI64 = AtomicI64::new(0);
///
/// let field = static_field!(HITS);
/// assert!(field.is_static());
/// ```
#[macro_export]
macro_rules! static_field {
    ($name:path) => {
        $crate::layout::Field::static_at(
            ::core::module_path!(),
            ::core::stringify!($name),
            ::core::ptr::addr_of!($name),
        )
    };
}
