use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use dto_convert::{ConvertError, ConverterRegistry, ValueConverter};
use dto_value::Value;

use crate::{DefaultPolicy, Primitive, TypeDescriptor};

// -----------------------------------------------------------------------------
// TypeSet

/// The declared alternative types of one field, with the facts derived
/// from them.
///
/// Facts are updated on every [`add_type`](TypeSet::add_type). The
/// boolean ones only ever turn on, and only for a member named exactly
/// `null`, `array` or `bool`: aliases such as `boolean` do not count.
///
/// The expected DTO, converter and primitive are set by the first type
/// that qualifies and never change afterwards: a field may list several
/// fallbacks, but only one of them governs casting.
///
/// # Examples
///
/// ```
/// use dto_convert::ConverterRegistry;
/// use dto_types::{DefaultPolicy, TypeDescriptor, TypeSet};
/// use dto_value::Value;
///
/// let registry = ConverterRegistry::new();
/// let types = TypeSet::from_types(
///     [
///         TypeDescriptor::new("int", false, false),
///         TypeDescriptor::new("string", false, false),
///         TypeDescriptor::new("null", false, false),
///     ],
///     &registry,
/// )
/// .unwrap();
///
/// assert!(types.match_value(&Value::from(3)));
/// assert!(types.match_value(&Value::Null));
/// assert!(!types.match_value(&Value::from(3.5)));
///
/// assert_eq!(types.declared_names(), ["int", "string", "null"]);
/// assert!(types.have_default_value(DefaultPolicy::NULLABLE_DEFAULT_TO_NULL));
/// ```
#[derive(Default)]
pub struct TypeSet {
    all: Vec<TypeDescriptor>,
    include_null: bool,
    include_array: bool,
    include_bool: bool,
    expect_collection: bool,
    expected_dto: Option<String>,
    expected_converter: Option<Arc<dyn ValueConverter>>,
    expected_primitive: Option<Primitive>,
    declared_names: Vec<String>,
}

impl TypeSet {
    /// Creates an empty set, which matches nothing.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set by adding every type in order.
    pub fn from_types(
        types: impl IntoIterator<Item = TypeDescriptor>,
        converters: &ConverterRegistry,
    ) -> Result<Self, ConvertError> {
        let mut set = Self::new();
        for ty in types {
            set.add_type(ty, converters)?;
        }
        Ok(set)
    }

    /// Appends `ty` and updates the derived facts.
    ///
    /// While no converter is expected yet, the registry is asked for one
    /// registered under exactly `ty`'s name. If that lookup fails the set
    /// is left untouched.
    pub fn add_type(
        &mut self,
        ty: TypeDescriptor,
        converters: &ConverterRegistry,
    ) -> Result<&mut Self, ConvertError> {
        if self.expected_converter.is_none() {
            self.expected_converter = converters.get_converter_by_class(ty.name())?;
        }

        // Only the canonical spelling counts here, `boolean` does not.
        self.include_null |= ty.name() == Primitive::Null.name();
        self.include_array |= ty.name() == Primitive::Array.name();
        self.include_bool |= ty.name() == Primitive::Bool.name();
        self.expect_collection |= ty.is_collection();

        if self.expected_dto.is_none() && ty.is_dto() {
            self.expected_dto = Some(ty.name().into());
        }
        if self.expected_primitive.is_none() {
            self.expected_primitive = ty.primitive().filter(|p| p.is_cast());
        }

        self.declared_names.push(ty.declared_name());
        self.all.push(ty);
        Ok(self)
    }

    /// The member types, in insertion order.
    #[inline]
    pub fn all(&self) -> &[TypeDescriptor] {
        &self.all
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.all.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    #[inline]
    pub const fn include_null(&self) -> bool {
        self.include_null
    }

    #[inline]
    pub const fn include_array(&self) -> bool {
        self.include_array
    }

    #[inline]
    pub const fn include_bool(&self) -> bool {
        self.include_bool
    }

    /// Returns `true` if any member is a collection.
    #[inline]
    pub const fn expect_collection(&self) -> bool {
        self.expect_collection
    }

    /// The class name of the first DTO member.
    #[inline]
    pub fn expected_dto(&self) -> Option<&str> {
        self.expected_dto.as_deref()
    }

    /// The converter of the first member that has one.
    #[inline]
    pub fn expected_converter(&self) -> Option<&Arc<dyn ValueConverter>> {
        self.expected_converter.as_ref()
    }

    /// The first member that is a primitive cast target.
    #[inline]
    pub const fn expected_primitive(&self) -> Option<Primitive> {
        self.expected_primitive
    }

    /// The declared name of every member, parallel to [`all`](TypeSet::all).
    #[inline]
    pub fn declared_names(&self) -> &[String] {
        &self.declared_names
    }

    /// Returns `true` if any member matches `value`.
    pub fn match_value(&self, value: &Value) -> bool {
        self.all.iter().any(|ty| ty.matches(value))
    }

    #[inline]
    fn arrays_have_default(&self, policy: DefaultPolicy) -> bool {
        (self.include_array || self.expect_collection)
            && policy.contains(DefaultPolicy::ARRAY_DEFAULT_TO_EMPTY_ARRAY)
    }

    #[inline]
    fn bools_have_default(&self, policy: DefaultPolicy) -> bool {
        self.include_bool && policy.contains(DefaultPolicy::BOOL_DEFAULT_TO_FALSE)
    }

    #[inline]
    fn nulls_have_default(&self, policy: DefaultPolicy) -> bool {
        self.include_null && policy.contains(DefaultPolicy::NULLABLE_DEFAULT_TO_NULL)
    }

    /// Returns `true` if `policy` gives this field a default value.
    pub fn have_default_value(&self, policy: DefaultPolicy) -> bool {
        self.arrays_have_default(policy)
            || self.bools_have_default(policy)
            || self.nulls_have_default(policy)
    }

    /// The default value `policy` gives this field.
    ///
    /// An empty array wins over `false`, which wins over `null`.
    /// Returns `None` exactly when
    /// [`have_default_value`](TypeSet::have_default_value) is `false`.
    pub fn default_value(&self, policy: DefaultPolicy) -> Option<Value> {
        if self.arrays_have_default(policy) {
            Some(Value::empty_array())
        } else if self.bools_have_default(policy) {
            Some(Value::Bool(false))
        } else if self.nulls_have_default(policy) {
            Some(Value::Null)
        } else {
            None
        }
    }
}

impl core::fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeSet")
            .field("declared_names", &self.declared_names)
            .field("include_null", &self.include_null)
            .field("include_array", &self.include_array)
            .field("include_bool", &self.include_bool)
            .field("expect_collection", &self.expect_collection)
            .field("expected_dto", &self.expected_dto)
            .field("expected_converter", &self.expected_converter.is_some())
            .field("expected_primitive", &self.expected_primitive)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
