use alloc::sync::Arc;

use dto_value::{BoxError, Object, Value};

use crate::Hook;

// -----------------------------------------------------------------------------
// Listener

/// Hooks around the property accesses of one class of data object.
///
/// Both hooks return the value unchanged unless overridden.
/// [`intercepts`](Listener::intercepts) has no default: it tells the
/// registry which hooks a listener actually handles, so that a listener
/// is only built once one of them fires.
///
/// # Examples
///
/// ```
/// use dto_listen::{Access, Hook, Listener};
/// use dto_value::{BoxError, Object, Value};
///
/// #[derive(Default)]
/// struct UserListener;
///
/// impl Listener for UserListener {
///     fn intercepts(hook: &Hook<'_>) -> bool {
///         hook.access() == Access::Get && hook.property() == "name"
///     }
///
///     fn on_get(&self, _: &Hook<'_>, value: Value, _: &dyn Object) -> Result<Value, BoxError> {
///         let name = value.as_str().ok_or("name must be a string")?;
///         Ok(Value::from(name.to_uppercase()))
///     }
/// }
///
/// assert!(UserListener::intercepts(&Hook::get("name")));
/// assert!(!UserListener::intercepts(&Hook::set("name")));
/// ```
pub trait Listener: Send + Sync + 'static {
    /// Returns `true` if this listener handles `hook`.
    ///
    /// The registry only builds the listener, and only calls
    /// [`on_get`](Listener::on_get) or [`on_set`](Listener::on_set), for
    /// hooks accepted here.
    fn intercepts(hook: &Hook<'_>) -> bool
    where
        Self: Sized;

    /// Called when a property of `object` is read, with its current value.
    fn on_get(&self, hook: &Hook<'_>, value: Value, object: &dyn Object) -> Result<Value, BoxError> {
        let _ = (hook, object);
        Ok(value)
    }

    /// Called when a property is about to be written, with the candidate value.
    fn on_set(&self, hook: &Hook<'_>, value: Value) -> Result<Value, BoxError> {
        let _ = hook;
        Ok(value)
    }
}

// -----------------------------------------------------------------------------
// ListenerFactory

/// Builds a [`Listener`] the first time one of its hooks fires.
///
/// Registered by name in a [`ListenerRegistry`](crate::ListenerRegistry),
/// which caches the instance it produces per data object class.
#[derive(Clone, Copy)]
pub struct ListenerFactory {
    intercepts: fn(&Hook<'_>) -> bool,
    create: fn() -> Result<Arc<dyn Listener>, BoxError>,
}

fn create_default<L: Listener + Default>() -> Result<Arc<dyn Listener>, BoxError> {
    Ok(Arc::new(L::default()))
}

impl ListenerFactory {
    /// A factory running a fallible constructor for `L`.
    ///
    /// The hooks it intercepts are those of `L`.
    #[inline]
    pub fn new<L: Listener>(create: fn() -> Result<Arc<dyn Listener>, BoxError>) -> Self {
        Self {
            intercepts: L::intercepts,
            create,
        }
    }

    /// A factory calling `L`'s [`Default`].
    #[inline]
    pub fn of<L: Listener + Default>() -> Self {
        Self {
            intercepts: L::intercepts,
            create: create_default::<L>,
        }
    }

    /// Returns `true` if the listener handles `hook`, without building it.
    #[inline(always)]
    pub fn intercepts(&self, hook: &Hook<'_>) -> bool {
        (self.intercepts)(hook)
    }

    /// Constructs a new listener.
    #[inline(always)]
    pub fn create(&self) -> Result<Arc<dyn Listener>, BoxError> {
        (self.create)()
    }
}

impl core::fmt::Debug for ListenerFactory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ListenerFactory")
    }
}
