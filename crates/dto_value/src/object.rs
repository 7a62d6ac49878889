use core::any::Any;
use core::fmt::Debug;

use crate::Map;

// -----------------------------------------------------------------------------
// Class

/// A static class descriptor.
///
/// `supers` is the flattened list of every ancestor class and implemented
/// interface, so [`Class::is_a`] needs no recursive walk.
///
/// # Examples
///
/// ```
/// use dto_value::Class;
///
/// static DATE: Class = Class::extends("Date", &["DateTimeInterface", "Stringable"]);
///
/// assert!(DATE.is_a("Date"));
/// assert!(DATE.is_a("DateTimeInterface"));
/// assert!(!DATE.is_a("Address"));
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Class {
    name: &'static str,
    supers: &'static [&'static str],
}

impl Class {
    /// A class with no ancestors or interfaces.
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self { name, supers: &[] }
    }

    /// A class deriving from (or implementing) every name in `supers`.
    #[inline]
    pub const fn extends(name: &'static str, supers: &'static [&'static str]) -> Self {
        Self { name, supers }
    }

    /// The concrete class name.
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Ancestors and interfaces, as declared.
    #[inline(always)]
    pub const fn supers(&self) -> &'static [&'static str] {
        self.supers
    }

    /// Returns `true` if an instance of this class is an instance of `class`.
    pub fn is_a(&self, class: &str) -> bool {
        self.name == class || self.supers.iter().any(|s| *s == class)
    }
}

impl core::fmt::Display for Class {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name)
    }
}

// -----------------------------------------------------------------------------
// Object

/// A rich runtime value: a data object, a date, a money amount...
///
/// Objects are stored in [`Value::Object`](crate::Value::Object) behind an
/// `Arc`, so cloning a value never clones the object itself.
///
/// # Examples
///
/// ```
/// use dto_value::{Class, Map, Object, Value};
///
/// #[derive(Debug)]
/// struct Address {
///     street: String,
/// }
///
/// static ADDRESS: Class = Class::extends("Address", &["Dto"]);
///
/// impl Object for Address {
///     fn class(&self) -> &'static Class {
///         &ADDRESS
///     }
///
///     fn entries(&self) -> Option<Map> {
///         let mut map = Map::new();
///         map.insert("street".into(), Value::from(self.street.as_str()));
///         Some(map)
///     }
/// }
///
/// let value = Value::object(Address { street: "Main St".into() });
/// let object = value.as_object().unwrap();
///
/// assert!(object.is_a("Dto"));
/// assert_eq!(object.downcast_ref::<Address>().unwrap().street, "Main St");
/// ```
pub trait Object: Any + Send + Sync + Debug {
    /// The runtime class of this object.
    fn class(&self) -> &'static Class;

    /// Returns `true` if this object is an instance of `class`,
    /// including inherited classes and implemented interfaces.
    #[inline]
    fn is_a(&self, class: &str) -> bool {
        self.class().is_a(class)
    }

    /// The key-value pairs this object yields when iterated.
    ///
    /// Non-iterable objects return `None` and are left untouched when
    /// flattened into plain data.
    #[inline]
    fn entries(&self) -> Option<Map> {
        None
    }
}

impl dyn Object {
    /// The concrete class name.
    #[inline]
    pub fn class_name(&self) -> &'static str {
        self.class().name()
    }

    /// Returns `true` if the concrete type is `T`.
    #[inline]
    pub fn is<T: Object>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Downcasts to the concrete type `T`.
    #[inline]
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}
