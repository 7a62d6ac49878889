use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use dto_utils::IndexMap;

use crate::Object;

// -----------------------------------------------------------------------------
// Map

/// An insertion-ordered, string-keyed mapping of values.
pub type Map = IndexMap<String, Value>;

// -----------------------------------------------------------------------------
// ValueKind

/// The runtime kind of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    List,
    Map,
    Object,
}

impl ValueKind {
    /// A short lowercase name, as used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
            Self::Object => "object",
        }
    }
}

impl core::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// Value

/// A dynamically typed runtime value.
///
/// `List` and `Map` together are what a field typed `array` accepts.
/// Everything except `Object` is plain data.
///
/// Plain values compare structurally. Objects compare by identity: two
/// `Value::Object`s are equal only if they share the same allocation.
///
/// # Examples
///
/// ```
/// use dto_value::{Map, Value, ValueKind};
///
/// let mut map = Map::new();
/// map.insert("tags".into(), Value::from(vec![Value::from("a"), Value::from("b")]));
/// map.insert("age".into(), Value::from(42));
///
/// let value = Value::from(map);
/// assert_eq!(value.kind(), ValueKind::Map);
/// assert!(value.is_array());
/// assert!(value.is_plain());
/// assert_eq!(value.as_map().unwrap().get("age"), Some(&Value::Int(42)));
/// ```
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
    Object(Arc<dyn Object>),
}

impl Value {
    /// Wraps `object` into a shared [`Value::Object`].
    #[inline]
    pub fn object<T: Object>(object: T) -> Self {
        Self::Object(Arc::new(object))
    }

    /// An empty list, the default of array-typed fields.
    #[inline]
    pub const fn empty_array() -> Self {
        Self::List(Vec::new())
    }

    /// Returns the [`ValueKind`] of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
            Self::Object(_) => ValueKind::Object,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for lists and maps.
    #[inline]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    /// Returns `true` if no [`Object`] appears anywhere inside this value.
    pub fn is_plain(&self) -> bool {
        match self {
            Self::Object(_) => false,
            Self::List(items) => items.iter().all(Self::is_plain),
            Self::Map(map) => map.values().all(Self::is_plain),
            _ => true,
        }
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Arc<dyn Object>> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The elements of a list or the values of a map, in order.
    ///
    /// Returns `None` for non-array values.
    pub fn elements(&self) -> Option<impl Iterator<Item = &Value>> {
        let (list, map) = match self {
            Self::List(items) => (Some(items.iter()), None),
            Self::Map(map) => (None, Some(map.values())),
            _ => return None,
        };
        Some(list.into_iter().flatten().chain(map.into_iter().flatten()))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => String,
    &str => String,
    Vec<Value> => List,
    Map => Map,
    Arc<dyn Object> => Object,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

impl FromIterator<Value> for Value {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for Value {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().collect())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;

    use super::{Map, Value, ValueKind};
    use crate::{Class, Object};

    #[derive(Debug)]
    struct Money;

    static MONEY: Class = Class::new("Money");

    impl Object for Money {
        fn class(&self) -> &'static Class {
            &MONEY
        }
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = Value::object(Money);
        let b = Value::object(Money);

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn plain_detection_is_recursive() {
        let nested: Value = vec![Value::from(1), Value::from(vec![Value::object(Money)])].into();
        assert!(!nested.is_plain());

        let mut map = Map::new();
        map.insert("a".into(), Value::from(vec![Value::Null, Value::from(1.5)]));
        assert!(Value::from(map).is_plain());
    }

    #[test]
    fn elements_cover_both_array_shapes() {
        let list = Value::from(vec![Value::from(1), Value::from(2)]);
        assert_eq!(list.elements().map(Iterator::count), Some(2));

        let map: Value = [(String::from("k"), Value::from(true))].into_iter().collect();
        assert_eq!(map.kind(), ValueKind::Map);
        assert_eq!(map.elements().unwrap().next(), Some(&Value::Bool(true)));

        assert!(Value::from("x").elements().is_none());
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::from("a"));

        let shared: Arc<dyn Object> = Arc::new(Money);
        assert_eq!(Value::from(shared).kind(), ValueKind::Object);
    }
}
