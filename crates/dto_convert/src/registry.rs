use alloc::sync::Arc;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dto_utils::IndexMap;
use dto_utils::hash::HashMap;
use dto_value::{Map, Object, Value};

use crate::{ConvertError, ConverterFactory, ValueConverter};

/// Maximum container nesting [`ConverterRegistry::convert`] descends into.
///
/// Plain data deeper than this is rejected with
/// [`ConvertError::DepthExceeded`], which also stops iterable objects
/// that (directly or not) yield themselves.
pub const MAX_DEPTH: usize = 256;

type ConverterCache = RwLock<HashMap<String, Arc<dyn ValueConverter>>>;

#[inline]
fn read_cache(cache: &ConverterCache) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn ValueConverter>>> {
    cache.read().unwrap_or_else(PoisonError::into_inner)
}

#[inline]
fn write_cache(cache: &ConverterCache) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn ValueConverter>>> {
    cache.write().unwrap_or_else(PoisonError::into_inner)
}

// -----------------------------------------------------------------------------
// ConverterRegistry

/// The registry of value converters.
///
/// It holds three pieces of state:
///
/// - named [`ConverterFactory`]s, registered with [`register_converter`];
/// - the ordered conversion table mapping a class (or interface) name to a
///   converter name, replaced wholesale by [`set_conversions`];
/// - two caches of constructed converters: one keyed by declared class name,
///   filled by [`get_converter_by_class`], and one keyed by runtime class name,
///   filled by [`get_converter_by_instance`].
///
/// Lookups only take `&self`; each cache sits behind its own lock and a
/// converter is constructed at most once per cache key. Caches never shrink,
/// and [`set_conversions`] does not clear them: a class that was resolved
/// before the table changed keeps its old converter.
///
/// Factories run while the cache lock is held, so they must not call back
/// into the same registry.
///
/// # Example
///
/// ```
/// use dto_convert::{ConverterFactory, ConverterRegistry, ValueConverter};
/// use dto_value::{BoxError, Class, Object, Value};
///
/// #[derive(Debug)]
/// struct Date(&'static str);
///
/// static DATE: Class = Class::extends("Date", &["DateTimeInterface"]);
///
/// impl Object for Date {
///     fn class(&self) -> &'static Class {
///         &DATE
///     }
/// }
///
/// #[derive(Default)]
/// struct DateConverter;
///
/// impl ValueConverter for DateConverter {
///     fn to_plain(&self, object: &dyn Object) -> Result<Value, BoxError> {
///         let date = object.downcast_ref::<Date>().ok_or("not a date")?;
///         Ok(Value::from(date.0))
///     }
///
///     fn from_plain(&self, value: &Value) -> Result<Value, BoxError> {
///         Err(format!("cannot parse {:?}", value).into())
///     }
/// }
///
/// let mut registry = ConverterRegistry::new();
/// registry.register_converter("DateConverter", ConverterFactory::of::<DateConverter>());
/// registry.set_conversions([("DateTimeInterface", "DateConverter")]);
///
/// let input = Value::from(vec![Value::object(Date("2024-05-01")), Value::from(3)]);
/// let plain = registry.convert(&input).unwrap();
///
/// assert_eq!(plain, Value::from(vec![Value::from("2024-05-01"), Value::from(3)]));
/// ```
///
/// [`register_converter`]: Self::register_converter
/// [`set_conversions`]: Self::set_conversions
/// [`get_converter_by_class`]: Self::get_converter_by_class
/// [`get_converter_by_instance`]: Self::get_converter_by_instance
#[derive(Default)]
pub struct ConverterRegistry {
    factories: HashMap<String, ConverterFactory>,
    conversions: IndexMap<String, String>,
    by_class: ConverterCache,
    by_instance: ConverterCache,
}

impl ConverterRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter factory under `name`, replacing any previous one.
    ///
    /// Converters already constructed from the old factory stay cached.
    pub fn register_converter(&mut self, name: impl Into<String>, factory: ConverterFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Returns `true` if a factory is registered under `name`.
    #[inline]
    pub fn has_converter(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Replaces the conversion table.
    ///
    /// Each pair maps a class or interface name to a converter name.
    /// Order matters: when an object is an instance of several keys,
    /// the first one wins.
    pub fn set_conversions<K, V>(&mut self, conversions: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.conversions = conversions
            .into_iter()
            .map(|(class, converter)| (class.into(), converter.into()))
            .collect();

        let cached = read_cache(&self.by_class).len() + read_cache(&self.by_instance).len();
        if cached > 0 {
            log::warn!(
                "conversion table replaced while {cached} converters are cached, cached entries are kept"
            );
        }
    }

    /// The conversion table, in registration order.
    #[inline]
    pub fn conversions(&self) -> &IndexMap<String, String> {
        &self.conversions
    }

    fn resolve(&self, class: &str, converter: &str) -> Result<Arc<dyn ValueConverter>, ConvertError> {
        let Some(factory) = self.factories.get(converter) else {
            return Err(ConvertError::UnknownConverter {
                class: class.into(),
                converter: converter.into(),
            });
        };

        let instance = factory.create().map_err(|source| ConvertError::Construct {
            converter: converter.into(),
            source,
        })?;

        log::debug!("constructed converter `{converter}` for `{class}`");
        Ok(instance)
    }

    /// Returns the converter registered for exactly `class`.
    ///
    /// No ancestor walk happens here: `class` must be a key of the
    /// conversion table. The converter is constructed on the first call
    /// and cached by `class`.
    ///
    /// Returns `Ok(None)` if `class` has no conversion.
    pub fn get_converter_by_class(
        &self,
        class: &str,
    ) -> Result<Option<Arc<dyn ValueConverter>>, ConvertError> {
        if let Some(converter) = read_cache(&self.by_class).get(class) {
            #[cfg(all(debug_assertions, feature = "debug"))]
            log::trace!("converter cache hit for class `{class}`");
            return Ok(Some(converter.clone()));
        }

        let Some(name) = self.conversions.get(class) else {
            return Ok(None);
        };

        let mut cache = write_cache(&self.by_class);
        // Another thread may have resolved it between the two locks.
        if let Some(converter) = cache.get(class) {
            return Ok(Some(converter.clone()));
        }

        let converter = self.resolve(class, name)?;
        cache.insert(class.into(), converter.clone());
        Ok(Some(converter))
    }

    /// Returns the converter for the runtime class of `object`.
    ///
    /// On a cache miss the conversion table is walked in registration order
    /// and the first key `object` is an instance of wins. The converter is
    /// then cached under both that key and the concrete class name.
    ///
    /// Returns `Ok(None)` if no key matches.
    pub fn get_converter_by_instance(
        &self,
        object: &dyn Object,
    ) -> Result<Option<Arc<dyn ValueConverter>>, ConvertError> {
        let class = object.class_name();

        if let Some(converter) = read_cache(&self.by_instance).get(class) {
            #[cfg(all(debug_assertions, feature = "debug"))]
            log::trace!("converter cache hit for instance of `{class}`");
            return Ok(Some(converter.clone()));
        }

        let Some((key, name)) = self.conversions.iter().find(|(key, _)| object.is_a(key)) else {
            return Ok(None);
        };

        let mut cache = write_cache(&self.by_instance);
        if let Some(converter) = cache.get(class) {
            return Ok(Some(converter.clone()));
        }

        let converter = match cache.get(key.as_str()) {
            Some(converter) => converter.clone(),
            None => self.resolve(key, name)?,
        };

        cache.insert(key.clone(), converter.clone());
        cache.insert(class.into(), converter.clone());
        Ok(Some(converter))
    }

    /// Flattens `value` into plain data.
    ///
    /// - An object with a converter is replaced by the converter's plain
    ///   form, which is not inspected any further.
    /// - Lists, maps and iterable objects become containers of the same
    ///   shape whose elements are converted recursively; keys are preserved.
    /// - Anything else is returned unchanged.
    ///
    /// Plain input comes back structurally equal. Nesting deeper than
    /// [`MAX_DEPTH`] fails with [`ConvertError::DepthExceeded`].
    pub fn convert(&self, value: &Value) -> Result<Value, ConvertError> {
        self.convert_at(value, 0)
    }

    fn convert_at(&self, value: &Value, depth: usize) -> Result<Value, ConvertError> {
        match value {
            Value::Object(object) => {
                if let Some(converter) = self.get_converter_by_instance(object.as_ref())? {
                    return converter
                        .to_plain(object.as_ref())
                        .map_err(ConvertError::Converter);
                }
                match object.entries() {
                    Some(entries) => Ok(Value::Map(self.convert_map(&entries, depth)?)),
                    None => Ok(value.clone()),
                }
            }
            Value::List(items) => {
                let depth = Self::descend(depth)?;
                items
                    .iter()
                    .map(|item| self.convert_at(item, depth))
                    .collect::<Result<_, _>>()
                    .map(Value::List)
            }
            Value::Map(map) => Ok(Value::Map(self.convert_map(map, depth)?)),
            _ => Ok(value.clone()),
        }
    }

    fn convert_map(&self, map: &Map, depth: usize) -> Result<Map, ConvertError> {
        let depth = Self::descend(depth)?;
        let mut out = Map::with_capacity(map.len());
        for (key, item) in map.iter() {
            out.insert(key.clone(), self.convert_at(item, depth)?);
        }
        Ok(out)
    }

    #[inline]
    fn descend(depth: usize) -> Result<usize, ConvertError> {
        if depth < MAX_DEPTH {
            Ok(depth + 1)
        } else {
            log::warn!("refusing to convert a value nested deeper than {MAX_DEPTH}");
            Err(ConvertError::DepthExceeded(MAX_DEPTH))
        }
    }
}

impl core::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("conversions", &self.conversions)
            .field("factories", &self.factories.keys())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ConverterRegistryArc

/// A shared handle to a [`ConverterRegistry`].
///
/// Built once at start-up and cloned into every consumer. Lookups and
/// [`convert`](ConverterRegistry::convert) only need the read lock.
#[derive(Clone, Default)]
pub struct ConverterRegistryArc {
    /// The wrapped [`ConverterRegistry`].
    pub internal: Arc<RwLock<ConverterRegistry>>,
}

impl ConverterRegistryArc {
    /// Wraps an already configured registry.
    #[inline]
    pub fn new(registry: ConverterRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`ConverterRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, ConverterRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`ConverterRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, ConverterRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for ConverterRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.read().conversions, f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use dto_value::{BoxError, Class, Map, Object, Value};

    use crate::{ConvertError, ConverterFactory, ConverterRegistry, ValueConverter};

    static DATE: Class = Class::extends("Date", &["DateTimeInterface"]);
    static LOCAL_DATE: Class = Class::extends("LocalDate", &["Date", "DateTimeInterface"]);
    static ADDRESS: Class = Class::extends("Address", &["Dto"]);
    static FRACTAL: Class = Class::new("Fractal");

    #[derive(Debug)]
    struct Date;

    impl Object for Date {
        fn class(&self) -> &'static Class {
            &DATE
        }
    }

    #[derive(Debug)]
    struct LocalDate;

    impl Object for LocalDate {
        fn class(&self) -> &'static Class {
            &LOCAL_DATE
        }
    }

    #[derive(Debug)]
    struct Address {
        street: &'static str,
        moved_in: Value,
    }

    impl Object for Address {
        fn class(&self) -> &'static Class {
            &ADDRESS
        }

        fn entries(&self) -> Option<Map> {
            let mut map = Map::new();
            map.insert("street".into(), Value::from(self.street));
            map.insert("moved_in".into(), self.moved_in.clone());
            Some(map)
        }
    }

    #[derive(Debug)]
    struct Fractal;

    impl Object for Fractal {
        fn class(&self) -> &'static Class {
            &FRACTAL
        }

        fn entries(&self) -> Option<Map> {
            let mut map = Map::new();
            map.insert("next".into(), Value::object(Fractal));
            Some(map)
        }
    }

    /// Always converts to the same literal; counts its constructions.
    macro_rules! literal_converter {
        ($name:ident, $counter:ident, $literal:expr) => {
            static $counter: AtomicUsize = AtomicUsize::new(0);

            struct $name;

            impl Default for $name {
                fn default() -> Self {
                    $counter.fetch_add(1, Ordering::SeqCst);
                    $name
                }
            }

            impl ValueConverter for $name {
                fn to_plain(&self, _: &dyn Object) -> Result<Value, BoxError> {
                    Ok(Value::from($literal))
                }

                fn from_plain(&self, value: &Value) -> Result<Value, BoxError> {
                    Ok(value.clone())
                }
            }
        };
    }

    #[test]
    fn by_class_is_exact_and_cached() {
        literal_converter!(ExactConverter, EXACT_BUILT, "exact");

        let mut registry = ConverterRegistry::new();
        registry.register_converter("exact", ConverterFactory::of::<ExactConverter>());
        registry.set_conversions([("DateTimeInterface", "exact")]);

        let first = registry.get_converter_by_class("DateTimeInterface").unwrap().unwrap();
        let second = registry.get_converter_by_class("DateTimeInterface").unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(EXACT_BUILT.load(Ordering::SeqCst), 1);

        // `Date` implements the interface, but class lookups never walk ancestors.
        assert!(registry.get_converter_by_class("Date").unwrap().is_none());
        assert!(registry.get_converter_by_class("int").unwrap().is_none());
    }

    #[test]
    fn by_instance_caches_per_concrete_class() {
        literal_converter!(InstanceConverter, INSTANCE_BUILT, "instance");

        let mut registry = ConverterRegistry::new();
        registry.register_converter("instance", ConverterFactory::of::<InstanceConverter>());
        registry.set_conversions([("DateTimeInterface", "instance")]);

        let first = registry.get_converter_by_instance(&Date).unwrap().unwrap();
        let second = registry.get_converter_by_instance(&Date).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(INSTANCE_BUILT.load(Ordering::SeqCst), 1);

        // A sibling class reuses the instance cached under the matched key.
        let third = registry.get_converter_by_instance(&LocalDate).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(INSTANCE_BUILT.load(Ordering::SeqCst), 1);

        let street = Address { street: "Main St", moved_in: Value::Null };
        assert!(registry.get_converter_by_instance(&street).unwrap().is_none());
    }

    #[test]
    fn first_registered_key_wins() {
        literal_converter!(ConcreteConverter, CONCRETE_BUILT, "concrete");
        literal_converter!(InterfaceConverter, INTERFACE_BUILT, "interface");

        let mut registry = ConverterRegistry::new();
        registry.register_converter("concrete", ConverterFactory::of::<ConcreteConverter>());
        registry.register_converter("interface", ConverterFactory::of::<InterfaceConverter>());
        registry.set_conversions([("DateTimeInterface", "interface"), ("LocalDate", "concrete")]);

        let plain = registry.convert(&Value::object(LocalDate)).unwrap();
        assert_eq!(plain, Value::from("interface"));
        assert_eq!(CONCRETE_BUILT.load(Ordering::SeqCst), 0);
        assert_eq!(INTERFACE_BUILT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn convert_is_identity_on_plain_data() {
        let registry = ConverterRegistry::new();
        let input: Value = serde_json::from_str(
            r#"{"name":"Ada","tags":["x",{"deep":[1,2.5,null]}],"ok":true,"none":null}"#,
        )
        .unwrap();

        assert_eq!(registry.convert(&input).unwrap(), input);
    }

    #[test]
    fn convert_replaces_each_nested_instance() {
        literal_converter!(NestedConverter, NESTED_BUILT, "2024-01-01");

        let mut registry = ConverterRegistry::new();
        registry.register_converter("date", ConverterFactory::of::<NestedConverter>());
        registry.set_conversions([("Date", "date")]);

        let address = Address { street: "Main St", moved_in: Value::object(Date) };
        let input = Value::from(vec![
            Value::object(Date),
            Value::object(address),
            Value::from(vec![Value::object(Date)]),
        ]);

        let plain = registry.convert(&input).unwrap();
        let expected: Value = serde_json::from_str(
            r#"["2024-01-01",{"street":"Main St","moved_in":"2024-01-01"},["2024-01-01"]]"#,
        )
        .unwrap();

        assert_eq!(plain, expected);
        assert!(plain.is_plain());
        assert_eq!(NESTED_BUILT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn converter_output_is_not_flattened_again() {
        static WRAPPED_BUILT: AtomicUsize = AtomicUsize::new(0);

        struct WrappingConverter;

        impl Default for WrappingConverter {
            fn default() -> Self {
                WRAPPED_BUILT.fetch_add(1, Ordering::SeqCst);
                WrappingConverter
            }
        }

        impl ValueConverter for WrappingConverter {
            fn to_plain(&self, _: &dyn Object) -> Result<Value, BoxError> {
                Ok(Value::from(vec![Value::object(Date)]))
            }

            fn from_plain(&self, value: &Value) -> Result<Value, BoxError> {
                Ok(value.clone())
            }
        }

        let mut registry = ConverterRegistry::new();
        registry.register_converter("wrap", ConverterFactory::of::<WrappingConverter>());
        registry.set_conversions([("Date", "wrap")]);

        let plain = registry.convert(&Value::object(Date)).unwrap();
        let inner = plain.as_list().unwrap();
        assert_eq!(inner[0].kind(), dto_value::ValueKind::Object);
        assert_eq!(WRAPPED_BUILT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_iterable_objects_pass_through() {
        let registry = ConverterRegistry::new();
        let value = Value::object(Date);
        assert_eq!(registry.convert(&value).unwrap(), value);
    }

    #[test]
    fn unknown_converter_is_a_configuration_error() {
        let mut registry = ConverterRegistry::new();
        registry.set_conversions([("Date", "Missing")]);

        let err = registry.get_converter_by_class("Date").err().unwrap();
        assert!(matches!(err, ConvertError::UnknownConverter { ref converter, .. } if converter == "Missing"));

        let err = registry.convert(&Value::object(Date)).err().unwrap();
        assert!(matches!(err, ConvertError::UnknownConverter { .. }));
    }

    #[test]
    fn factory_failure_propagates() {
        fn broken() -> Result<Arc<dyn ValueConverter>, BoxError> {
            Err("clock not configured".into())
        }

        let mut registry = ConverterRegistry::new();
        registry.register_converter("broken", ConverterFactory::new(broken));
        registry.set_conversions([("Date", "broken")]);

        let err = registry.get_converter_by_instance(&Date).err().unwrap();
        assert!(matches!(err, ConvertError::Construct { .. }));
        assert!(err.to_string().contains("clock not configured"));
    }

    #[test]
    fn converter_failure_is_transparent() {
        #[derive(Default)]
        struct Refusing;

        impl ValueConverter for Refusing {
            fn to_plain(&self, _: &dyn Object) -> Result<Value, BoxError> {
                Err("refused".into())
            }

            fn from_plain(&self, _: &Value) -> Result<Value, BoxError> {
                Err("refused".into())
            }
        }

        let mut registry = ConverterRegistry::new();
        registry.register_converter("refusing", ConverterFactory::of::<Refusing>());
        registry.set_conversions([("Date", "refusing")]);

        let err = registry.convert(&Value::object(Date)).err().unwrap();
        assert!(matches!(err, ConvertError::Converter(_)));
        assert_eq!(err.to_string(), "refused");
    }

    #[test]
    fn stale_cache_survives_new_conversions() {
        literal_converter!(OldConverter, OLD_BUILT, "old");
        literal_converter!(NewConverter, NEW_BUILT, "new");

        let mut registry = ConverterRegistry::new();
        registry.register_converter("old", ConverterFactory::of::<OldConverter>());
        registry.register_converter("new", ConverterFactory::of::<NewConverter>());

        registry.set_conversions([("Date", "old")]);
        assert_eq!(registry.convert(&Value::object(Date)).unwrap(), Value::from("old"));

        registry.set_conversions([("Date", "new")]);
        assert_eq!(registry.convert(&Value::object(Date)).unwrap(), Value::from("old"));
        assert_eq!(registry.conversions().get("Date").map(String::as_str), Some("new"));
        assert_eq!(OLD_BUILT.load(Ordering::SeqCst), 1);
        assert_eq!(NEW_BUILT.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn self_yielding_objects_hit_the_depth_cap() {
        let registry = ConverterRegistry::new();
        let err = registry.convert(&Value::object(Fractal)).err().unwrap();
        assert!(matches!(err, ConvertError::DepthExceeded(crate::MAX_DEPTH)));
    }

    #[test]
    fn shared_handle_serves_lookups() {
        literal_converter!(SharedConverter, SHARED_BUILT, "shared");

        let shared = crate::ConverterRegistryArc::default();
        {
            let mut registry = shared.write();
            registry.register_converter("shared", ConverterFactory::of::<SharedConverter>());
            registry.set_conversions([("Date", "shared")]);
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.read().convert(&Value::object(Date)).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Value::from("shared"));
        }
        assert_eq!(SHARED_BUILT.load(Ordering::SeqCst), 1);
        assert_eq!(format!("{shared:?}"), r#"{"Date": "shared"}"#);
    }
}
