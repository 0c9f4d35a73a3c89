//! Type descriptors and the [Describe] facility that produces them.
//!
//! A [Descriptor] classifies a Rust type by its [Shape]. The resolver inspects the shape once to
//! build an [crate::Encoder]; the hot encode path never looks at a descriptor again.
//!
//! Descriptors compare and hash by the identity ([TypeId]) of the type they describe, so two
//! descriptors of the same type always select the same cached encoder.
//!
//! # Example
//!
//! ```
//! use msgfmt_jsonfmt::{record, Describe, Descriptor};
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     label: String,
//! }
//!
//! impl Describe for Point {
//!     fn describe() -> Descriptor {
//!         record!(Point { x, y, label })
//!     }
//! }
//!
//! let descriptor = Point::describe();
//! assert_eq!(descriptor.shape().kind(), "record");
//! ```

use crate::Addr;
use std::{
    any::{type_name, Any, TypeId},
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
    mem::size_of,
    sync::Arc,
};

/// Projects a value onto its UTF-8 text.
pub type TextView = for<'a> fn(Addr<'a>) -> &'a str;

/// Projects a record onto one of its fields.
pub type Accessor = for<'a> fn(Addr<'a>) -> Addr<'a>;

/// Visits every element of a sequence, in order.
pub type SequenceVisit = for<'a> fn(Addr<'a>, &mut dyn FnMut(Addr<'a>));

/// Visits every entry of a mapping, in key order.
pub type MapVisit = for<'a> fn(Addr<'a>, &mut dyn FnMut(Addr<'a>, Addr<'a>));

/// Projects a nullable value onto its inner value, if present.
pub type OptionView = for<'a> fn(Addr<'a>) -> Option<Addr<'a>>;

/// Declared width of an integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
    /// The platform's pointer width.
    Native,
}

impl Width {
    /// Resolves [Width::Native] to the fixed width matching the platform's pointer width.
    pub const fn resolve(self) -> Self {
        match self {
            Self::Native => match usize::BITS {
                16 => Self::W16,
                32 => Self::W32,
                _ => Self::W64,
            },
            width => width,
        }
    }

    /// Number of bits in the (resolved) width.
    pub const fn bits(self) -> u32 {
        match self.resolve() {
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
            _ => 64,
        }
    }
}

/// A named field of a record.
#[derive(Clone)]
pub struct Field {
    name: &'static str,
    descriptor: Descriptor,
    accessor: Accessor,
}

impl Field {
    /// Creates a field named `name` whose value, described by `descriptor`, is reached from the
    /// record through `accessor`.
    pub fn new(name: &'static str, descriptor: Descriptor, accessor: Accessor) -> Self {
        Self {
            name,
            descriptor,
            accessor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn accessor(&self) -> Accessor {
        self.accessor
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// The shape of a described type.
#[derive(Clone)]
pub enum Shape {
    /// A fixed-width integer.
    Int { width: Width, signed: bool },
    /// UTF-8 text.
    Text(TextView),
    /// An ordered list of named fields.
    Record(Vec<Field>),
    /// A homogeneous sequence.
    Sequence {
        element: Descriptor,
        visit: SequenceVisit,
    },
    /// A mapping visited in key order.
    Map {
        key: Descriptor,
        value: Descriptor,
        visit: MapVisit,
    },
    /// A value that may be absent.
    Option {
        inner: Descriptor,
        view: OptionView,
    },
    /// A type with no built-in shape. Only an extension resolver can encode it.
    Opaque,
    /// A type whose [Describe] impl returned the descriptor of another type. Never resolves.
    Mismatch(Descriptor),
}

impl Shape {
    /// Short name of the shape, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int { .. } => "int",
            Self::Text(_) => "text",
            Self::Record(_) => "record",
            Self::Sequence { .. } => "sequence",
            Self::Map { .. } => "map",
            Self::Option { .. } => "option",
            Self::Opaque => "opaque",
            Self::Mismatch(_) => "mismatch",
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int { width, signed } => f
                .debug_struct("Int")
                .field("width", width)
                .field("signed", signed)
                .finish(),
            Self::Text(_) => f.write_str("Text"),
            Self::Record(fields) => f.debug_tuple("Record").field(fields).finish(),
            Self::Sequence { element, .. } => {
                f.debug_struct("Sequence").field("element", element).finish()
            }
            Self::Map { key, value, .. } => f
                .debug_struct("Map")
                .field("key", key)
                .field("value", value)
                .finish(),
            Self::Option { inner, .. } => f.debug_struct("Option").field("inner", inner).finish(),
            Self::Opaque => f.write_str("Opaque"),
            Self::Mismatch(described) => f.debug_tuple("Mismatch").field(described).finish(),
        }
    }
}

struct Inner {
    id: TypeId,
    name: &'static str,
    size: usize,
    shape: Shape,
}

/// An immutable description of a Rust type.
#[derive(Clone)]
pub struct Descriptor(Arc<Inner>);

impl Descriptor {
    fn new<T: Any>(shape: Shape) -> Self {
        Self(Arc::new(Inner {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            size: size_of::<T>(),
            shape,
        }))
    }

    /// Describes `T` as an integer.
    ///
    /// Only the built-in integer types are described this way: the integer encoders read the
    /// value back as the primitive selected by `width` and `signed`.
    pub(crate) fn int<T: Any>(width: Width, signed: bool) -> Self {
        Self::new::<T>(Shape::Int { width, signed })
    }

    /// Describes `T` as text reached through `view`.
    pub fn text<T: Any>(view: TextView) -> Self {
        Self::new::<T>(Shape::Text(view))
    }

    /// Describes `T` as a record with the given fields, in encoding order.
    pub fn record<T: Any>(fields: Vec<Field>) -> Self {
        Self::new::<T>(Shape::Record(fields))
    }

    /// Describes `T` as a sequence of `element`.
    pub fn sequence<T: Any>(element: Descriptor, visit: SequenceVisit) -> Self {
        Self::new::<T>(Shape::Sequence { element, visit })
    }

    /// Describes `T` as a key-ordered mapping from `key` to `value`.
    pub fn map<T: Any>(key: Descriptor, value: Descriptor, visit: MapVisit) -> Self {
        Self::new::<T>(Shape::Map { key, value, visit })
    }

    /// Describes `T` as an optional `inner`.
    pub fn option<T: Any>(inner: Descriptor, view: OptionView) -> Self {
        Self::new::<T>(Shape::Option { inner, view })
    }

    /// Describes `T` without a built-in shape.
    pub fn opaque<T: Any>() -> Self {
        Self::new::<T>(Shape::Opaque)
    }

    /// Returns the descriptor of `T`.
    ///
    /// If `T::describe()` returns the descriptor of some other type, the result is a
    /// [Shape::Mismatch] descriptor of `T` that fails to resolve.
    pub fn of<T: Describe>() -> Self {
        let described = T::describe();
        if described.id() == TypeId::of::<T>() {
            return described;
        }
        Self::new::<T>(Shape::Mismatch(described))
    }

    pub fn id(&self) -> TypeId {
        self.0.id
    }

    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// In-memory size of the described type, in bytes.
    pub fn size(&self) -> usize {
        self.0.size
    }

    pub fn shape(&self) -> &Shape {
        &self.0.shape
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Descriptor {}

impl Hash for Descriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.0.name)
            .field("size", &self.0.size)
            .field("shape", &self.0.shape)
            .finish()
    }
}

/// Types that can describe their own shape.
///
/// Implementations must return a descriptor of `Self` (built with one of the [Descriptor]
/// constructors instantiated at `Self`) and must describe the same shape on every call. A
/// newtype cannot reuse the descriptor of the type it wraps. Descriptors obtained through
/// [Descriptor::of] turn a violation into a resolution error.
pub trait Describe: Any {
    fn describe() -> Descriptor;
}

/// Describes the type of the field reached by `projection`.
///
/// Used by [crate::record!] to infer field types from field names.
#[doc(hidden)]
pub fn describe_field<P, T, F>(_: F) -> Descriptor
where
    T: Describe,
    F: Fn(&P) -> &T,
{
    Descriptor::of::<T>()
}

/// Builds a record [Descriptor] for a struct from a list of its fields.
///
/// Fields are encoded in the order they are listed. Each field's type must implement
/// [Describe]. Listing a field twice is rejected when the record is resolved.
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        $crate::Descriptor::record::<$ty>(vec![
            $(
                $crate::Field::new(
                    stringify!($field),
                    $crate::descriptor::describe_field(|value: &$ty| &value.$field),
                    |addr| $crate::Addr::of(&addr.get::<$ty>().$field),
                ),
            )*
        ])
    };
}

// Integers
macro_rules! impl_describe_int {
    ($type:ty, $width:ident, $signed:expr) => {
        impl Describe for $type {
            fn describe() -> Descriptor {
                Descriptor::int::<$type>(Width::$width, $signed)
            }
        }
    };
}

impl_describe_int!(i8, W8, true);
impl_describe_int!(i16, W16, true);
impl_describe_int!(i32, W32, true);
impl_describe_int!(i64, W64, true);
impl_describe_int!(isize, Native, true);
impl_describe_int!(u8, W8, false);
impl_describe_int!(u16, W16, false);
impl_describe_int!(u32, W32, false);
impl_describe_int!(u64, W64, false);
impl_describe_int!(usize, Native, false);

// Text
impl Describe for String {
    fn describe() -> Descriptor {
        Descriptor::text::<Self>(|addr| addr.get::<String>().as_str())
    }
}

impl Describe for &'static str {
    fn describe() -> Descriptor {
        Descriptor::text::<Self>(|addr| *addr.get::<&'static str>())
    }
}

impl Describe for Box<str> {
    fn describe() -> Descriptor {
        Descriptor::text::<Self>(|addr| &**addr.get::<Box<str>>())
    }
}

impl Describe for Arc<str> {
    fn describe() -> Descriptor {
        Descriptor::text::<Self>(|addr| &**addr.get::<Arc<str>>())
    }
}

// Types without a built-in shape
macro_rules! impl_describe_opaque {
    ($($type:ty),*) => {
        $(
            impl Describe for $type {
                fn describe() -> Descriptor {
                    Descriptor::opaque::<$type>()
                }
            }
        )*
    };
}

impl_describe_opaque!(bool, char, f32, f64, (), i128, u128);

// Sequences
impl<T: Describe> Describe for Vec<T> {
    fn describe() -> Descriptor {
        Descriptor::sequence::<Self>(Descriptor::of::<T>(), |addr, visit| {
            for item in addr.get::<Vec<T>>() {
                visit(Addr::of(item));
            }
        })
    }
}

impl<T: Describe> Describe for Box<[T]> {
    fn describe() -> Descriptor {
        Descriptor::sequence::<Self>(Descriptor::of::<T>(), |addr, visit| {
            for item in addr.get::<Box<[T]>>().iter() {
                visit(Addr::of(item));
            }
        })
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> Descriptor {
        Descriptor::sequence::<Self>(Descriptor::of::<T>(), |addr, visit| {
            for item in addr.get::<[T; N]>() {
                visit(Addr::of(item));
            }
        })
    }
}

// Mappings
impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> Descriptor {
        Descriptor::map::<Self>(Descriptor::of::<K>(), Descriptor::of::<V>(), |addr, visit| {
            for (key, value) in addr.get::<BTreeMap<K, V>>() {
                visit(Addr::of(key), Addr::of(value));
            }
        })
    }
}

// Nullable values
//
// JSON has a single `null`, so nested options collapse: `None` and `Some(None)` of an
// `Option<Option<T>>` both encode as `null`.
impl<T: Describe> Describe for Option<T> {
    fn describe() -> Descriptor {
        Descriptor::option::<Self>(Descriptor::of::<T>(), |addr| {
            addr.get::<Option<T>>().as_ref().map(Addr::of)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Pair {
        left: u8,
        right: Option<String>,
    }

    impl Describe for Pair {
        fn describe() -> Descriptor {
            record!(Pair { left, right })
        }
    }

    #[test]
    fn test_width() {
        assert_eq!(Width::W8.bits(), 8);
        assert_eq!(Width::W16.bits(), 16);
        assert_eq!(Width::W32.bits(), 32);
        assert_eq!(Width::W64.bits(), 64);
        assert_eq!(Width::Native.bits(), usize::BITS);
        assert_ne!(Width::Native.resolve(), Width::Native);
        assert_eq!(Width::W16.resolve(), Width::W16);
    }

    #[test]
    fn test_int_shapes() {
        let cases = [
            (i8::describe(), Width::W8, true),
            (u16::describe(), Width::W16, false),
            (i32::describe(), Width::W32, true),
            (u64::describe(), Width::W64, false),
            (isize::describe(), Width::Native, true),
            (usize::describe(), Width::Native, false),
        ];
        for (descriptor, expected_width, expected_signed) in cases {
            match descriptor.shape() {
                Shape::Int { width, signed } => {
                    assert_eq!(*width, expected_width);
                    assert_eq!(*signed, expected_signed);
                }
                shape => panic!("unexpected shape: {shape:?}"),
            }
            assert_eq!(descriptor.size() as u32 * 8, expected_width.bits());
        }
    }

    #[test]
    fn test_identity() {
        assert_eq!(String::describe(), String::describe());
        assert_ne!(String::describe(), <&'static str>::describe());
        assert_ne!(i64::describe(), u64::describe());

        let set: HashSet<Descriptor> = [u8::describe(), u8::describe(), i8::describe()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_text_views() {
        let owned = String::from("owned");
        let boxed: Box<str> = "boxed".into();
        let shared: Arc<str> = "shared".into();
        let borrowed: &'static str = "borrowed";

        let view = |descriptor: Descriptor| match descriptor.shape() {
            Shape::Text(view) => *view,
            shape => panic!("unexpected shape: {shape:?}"),
        };
        assert_eq!(view(String::describe())(Addr::of(&owned)), "owned");
        assert_eq!(view(<Box<str>>::describe())(Addr::of(&boxed)), "boxed");
        assert_eq!(view(<Arc<str>>::describe())(Addr::of(&shared)), "shared");
        assert_eq!(
            view(<&'static str>::describe())(Addr::of(&borrowed)),
            "borrowed"
        );
    }

    #[test]
    fn test_record_macro() {
        let descriptor = Pair::describe();
        let Shape::Record(fields) = descriptor.shape() else {
            panic!("expected record");
        };
        let names: Vec<_> = fields.iter().map(Field::name).collect();
        assert_eq!(names, ["left", "right"]);
        assert_eq!(fields[0].descriptor(), &u8::describe());
        assert_eq!(fields[1].descriptor(), &<Option<String>>::describe());

        let pair = Pair {
            left: 7,
            right: None,
        };
        let left = (fields[0].accessor())(Addr::of(&pair));
        assert_eq!(*left.get::<u8>(), 7);
    }

    #[test]
    fn test_sequence_visit() {
        let values = vec![1u32, 2, 3];
        let Shape::Sequence { element, visit } = <Vec<u32>>::describe().shape().clone() else {
            panic!("expected sequence");
        };
        assert_eq!(element, u32::describe());

        let mut seen = Vec::new();
        visit(Addr::of(&values), &mut |item| seen.push(*item.get::<u32>()));
        assert_eq!(seen, values);
    }

    #[test]
    fn test_map_visit_order() {
        let mut values = BTreeMap::new();
        values.insert("b", 2u8);
        values.insert("a", 1u8);
        let Shape::Map { visit, .. } = <BTreeMap<&'static str, u8>>::describe().shape().clone()
        else {
            panic!("expected map");
        };

        let mut seen = Vec::new();
        visit(Addr::of(&values), &mut |key, value| {
            seen.push((*key.get::<&'static str>(), *value.get::<u8>()))
        });
        assert_eq!(seen, [("a", 1), ("b", 2)]);
    }

    struct Alias(String);

    impl Describe for Alias {
        fn describe() -> Descriptor {
            String::describe()
        }
    }

    #[test]
    fn test_mismatched_describe() {
        let descriptor = Descriptor::of::<Alias>();
        assert_eq!(descriptor.id(), TypeId::of::<Alias>());
        let Shape::Mismatch(described) = descriptor.shape() else {
            panic!("expected mismatch");
        };
        assert_eq!(described, &String::describe());

        // Containers describe their elements through the same check
        let Shape::Sequence { element, .. } = <Vec<Alias>>::describe().shape().clone() else {
            panic!("expected sequence");
        };
        assert_eq!(element.shape().kind(), "mismatch");

        // Well-behaved impls pass through untouched
        assert_eq!(Descriptor::of::<String>().shape().kind(), "text");
    }

    #[test]
    fn test_opaque() {
        assert_eq!(f64::describe().shape().kind(), "opaque");
        assert_eq!(bool::describe().name(), "bool");
    }
}
