use alloc::format;
use alloc::string::String;

use dto_value::Value;

/// Marks a collection type in a declared name, as in `Address[]`.
const COLLECTION_SUFFIX: &str = "[]";

// -----------------------------------------------------------------------------
// Primitive

/// The built-in type tags.
///
/// Matching goes by the runtime kind of a value, never by coercion:
/// the string `"1"` is not an `int`, and the integer `1` is not a `float`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Float,
    String,
    Bool,
    /// Lists and maps alike.
    Array,
    Null,
    /// Any object, whatever its class.
    Object,
}

impl Primitive {
    /// Recognizes a primitive type name, including the `integer`,
    /// `double` and `boolean` aliases.
    ///
    /// # Examples
    ///
    /// ```
    /// use dto_types::Primitive;
    ///
    /// assert_eq!(Primitive::parse("integer"), Some(Primitive::Int));
    /// assert_eq!(Primitive::parse("double"), Some(Primitive::Float));
    /// assert_eq!(Primitive::parse("Address"), None);
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "int" | "integer" => Self::Int,
            "float" | "double" => Self::Float,
            "string" => Self::String,
            "bool" | "boolean" => Self::Bool,
            "array" => Self::Array,
            "null" => Self::Null,
            "object" => Self::Object,
            _ => return None,
        })
    }

    /// The canonical name of the tag.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Array => "array",
            Self::Null => "null",
            Self::Object => "object",
        }
    }

    /// Returns `true` if a value can be cast to this tag.
    ///
    /// Every tag but `null` is a cast target.
    #[inline]
    pub const fn is_cast(self) -> bool {
        !matches!(self, Self::Null)
    }

    /// Returns `true` if `value` is of this kind.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Int => matches!(value, Value::Int(_)),
            Self::Float => matches!(value, Value::Float(_)),
            Self::String => matches!(value, Value::String(_)),
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::Array => value.is_array(),
            Self::Null => value.is_null(),
            Self::Object => matches!(value, Value::Object(_)),
        }
    }
}

impl core::fmt::Display for Primitive {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

/// One declared alternative type of a field.
///
/// The name is either a [`Primitive`] tag or a class name. For a class,
/// `is_dto` tells whether it is a nested data object. A collection
/// descriptor accepts a list (or map) whose every element matches the
/// element type; an empty collection always matches.
///
/// Descriptors are immutable once built.
///
/// # Examples
///
/// ```
/// use dto_types::TypeDescriptor;
/// use dto_value::Value;
///
/// let ints = TypeDescriptor::parse("int[]", false);
///
/// assert!(ints.is_collection());
/// assert_eq!(ints.name(), "int");
/// assert_eq!(ints.declared_name(), "int[]");
///
/// assert!(ints.matches(&Value::from(vec![Value::from(1), Value::from(2)])));
/// assert!(ints.matches(&Value::from(Vec::new())));
/// assert!(!ints.matches(&Value::from(vec![Value::from("1")])));
/// assert!(!ints.matches(&Value::from(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    primitive: Option<Primitive>,
    is_collection: bool,
    is_dto: bool,
}

impl TypeDescriptor {
    /// Creates a descriptor.
    ///
    /// `is_dto` is ignored for primitive names.
    pub fn new(name: impl Into<String>, is_collection: bool, is_dto: bool) -> Self {
        let name = name.into();
        let primitive = Primitive::parse(&name);
        Self {
            is_dto: is_dto && primitive.is_none(),
            name,
            primitive,
            is_collection,
        }
    }

    /// Creates a descriptor from a declared name, where a trailing `[]`
    /// denotes a collection.
    pub fn parse(declared: &str, is_dto: bool) -> Self {
        match declared.strip_suffix(COLLECTION_SUFFIX) {
            Some(name) => Self::new(name, true, is_dto),
            None => Self::new(declared, false, is_dto),
        }
    }

    /// The element type name, without any collection marker.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primitive tag, if the name is one.
    #[inline]
    pub const fn primitive(&self) -> Option<Primitive> {
        self.primitive
    }

    #[inline]
    pub const fn is_collection(&self) -> bool {
        self.is_collection
    }

    /// Returns `true` if the name identifies a nested data object.
    #[inline]
    pub const fn is_dto(&self) -> bool {
        self.is_dto
    }

    /// The name as declared: with a `[]` suffix for collections.
    pub fn declared_name(&self) -> String {
        if self.is_collection {
            format!("{}{COLLECTION_SUFFIX}", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Returns `true` if `value` satisfies this type.
    pub fn matches(&self, value: &Value) -> bool {
        if !self.is_collection {
            return self.matches_element(value);
        }

        match value.elements() {
            Some(mut elements) => elements.all(|element| self.matches_element(element)),
            None => false,
        }
    }

    fn matches_element(&self, value: &Value) -> bool {
        match self.primitive {
            Some(primitive) => primitive.matches(value),
            None => match value {
                Value::Object(object) => object.is_a(&self.name),
                _ => false,
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
