use alloc::sync::Arc;

use dto_value::{BoxError, Object, Value};

// -----------------------------------------------------------------------------
// ValueConverter

/// A bidirectional adapter between one kind of object and its plain form.
///
/// A converter owns the whole subtree of the objects it handles:
/// the result of [`to_plain`](ValueConverter::to_plain) is returned as is,
/// without being flattened any further.
///
/// # Examples
///
/// ```
/// use dto_convert::ValueConverter;
/// use dto_value::{BoxError, Class, Object, Value};
///
/// #[derive(Debug)]
/// struct Cents(i64);
///
/// static CENTS: Class = Class::new("Cents");
///
/// impl Object for Cents {
///     fn class(&self) -> &'static Class {
///         &CENTS
///     }
/// }
///
/// #[derive(Default)]
/// struct CentsConverter;
///
/// impl ValueConverter for CentsConverter {
///     fn to_plain(&self, object: &dyn Object) -> Result<Value, BoxError> {
///         let cents = object.downcast_ref::<Cents>().ok_or("not an amount of cents")?;
///         Ok(Value::Int(cents.0))
///     }
///
///     fn from_plain(&self, value: &Value) -> Result<Value, BoxError> {
///         let cents = value.as_int().ok_or("expected an integer")?;
///         Ok(Value::object(Cents(cents)))
///     }
/// }
///
/// let converter = CentsConverter;
/// assert_eq!(converter.to_plain(&Cents(250)).unwrap(), Value::Int(250));
/// ```
pub trait ValueConverter: Send + Sync + 'static {
    /// Converts a rich object into plain data.
    fn to_plain(&self, object: &dyn Object) -> Result<Value, BoxError>;

    /// Builds a rich value from plain data.
    fn from_plain(&self, value: &Value) -> Result<Value, BoxError>;
}

// -----------------------------------------------------------------------------
// ConverterFactory

/// Builds a [`ValueConverter`] the first time a class needs it.
///
/// Registered by name in a [`ConverterRegistry`](crate::ConverterRegistry),
/// which caches the instance it produces.
#[derive(Clone, Copy)]
pub struct ConverterFactory {
    func: fn() -> Result<Arc<dyn ValueConverter>, BoxError>,
}

fn create_default<C: ValueConverter + Default>() -> Result<Arc<dyn ValueConverter>, BoxError> {
    Ok(Arc::new(C::default()))
}

impl ConverterFactory {
    /// A factory running a fallible constructor.
    #[inline]
    pub const fn new(func: fn() -> Result<Arc<dyn ValueConverter>, BoxError>) -> Self {
        Self { func }
    }

    /// A factory calling `C`'s [`Default`].
    #[inline]
    pub fn of<C: ValueConverter + Default>() -> Self {
        Self {
            func: create_default::<C>,
        }
    }

    /// Constructs a new converter.
    #[inline(always)]
    pub fn create(&self) -> Result<Arc<dyn ValueConverter>, BoxError> {
        (self.func)()
    }
}

impl core::fmt::Debug for ConverterFactory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ConverterFactory")
    }
}
