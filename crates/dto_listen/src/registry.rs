use alloc::sync::Arc;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dto_utils::IndexMap;
use dto_utils::hash::HashMap;
use dto_value::{Object, Value};

use crate::{Hook, ListenError, Listener, ListenerFactory};

type ListenerCache = RwLock<HashMap<String, Arc<dyn Listener>>>;

// -----------------------------------------------------------------------------
// ListenerRegistry

/// The registry of data object listeners.
///
/// Maps a data object class name to a listener name, and a listener name
/// to its [`ListenerFactory`]. The class lookup is exact: subclasses do
/// not inherit the listener of their parent.
///
/// A listener is built the first time one of the hooks it
/// [intercepts](ListenerFactory::intercepts) fires for a class, then
/// reused for every later hook of that class. Changing the listener of a
/// class drops its cached instance; other classes keep theirs.
///
/// # Example
///
/// ```
/// use dto_listen::{Access, Hook, Listener, ListenerFactory, ListenerRegistry};
/// use dto_value::{BoxError, Value};
///
/// #[derive(Default)]
/// struct TrimNames;
///
/// impl Listener for TrimNames {
///     fn intercepts(hook: &Hook<'_>) -> bool {
///         hook.access() == Access::Set
///     }
///
///     fn on_set(&self, _: &Hook<'_>, value: Value) -> Result<Value, BoxError> {
///         Ok(match value.as_str() {
///             Some(name) => Value::from(name.trim()),
///             None => value,
///         })
///     }
/// }
///
/// let mut registry = ListenerRegistry::new();
/// registry.register_listener("TrimNames", ListenerFactory::of::<TrimNames>());
/// registry.add_listener("User", "TrimNames");
///
/// let set = registry.setting("User", "name", Value::from("  Ada ")).unwrap();
/// assert_eq!(set, Value::from("Ada"));
///
/// let untouched = registry.setting("Admin", "name", Value::from("  Ada ")).unwrap();
/// assert_eq!(untouched, Value::from("  Ada "));
/// ```
#[derive(Default)]
pub struct ListenerRegistry {
    factories: HashMap<String, ListenerFactory>,
    listeners: IndexMap<String, String>,
    cache: ListenerCache,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener factory under `name`, replacing any previous one.
    ///
    /// Listeners already built from the old factory stay cached.
    pub fn register_listener(&mut self, name: impl Into<String>, factory: ListenerFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Returns `true` if a factory is registered under `name`.
    #[inline]
    pub fn has_listener(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Replaces the class → listener table.
    ///
    /// Cached listeners are kept for the classes whose listener is unchanged.
    pub fn listen<K, V>(&mut self, listeners: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let listeners = listeners
            .into_iter()
            .map(|(class, listener)| (class.into(), listener.into()))
            .collect();
        let previous = core::mem::replace(&mut self.listeners, listeners);

        let cache = cache_mut(&mut self.cache);
        let before = cache.len();
        cache.retain(|class, _| {
            let class = class.as_str();
            previous.get(class).is_some() && previous.get(class) == self.listeners.get(class)
        });
        if cache.len() < before {
            log::debug!(
                "listener table replaced, dropped {} cached listeners",
                before - cache.len(),
            );
        }
        self
    }

    /// Sets the listener of `class`.
    pub fn add_listener(&mut self, class: impl Into<String>, listener: impl Into<String>) -> &mut Self {
        let class = class.into();
        cache_mut(&mut self.cache).remove(class.as_str());
        self.listeners.insert(class, listener.into());
        self
    }

    /// Removes the listener of `class`, if any.
    pub fn remove_listener(&mut self, class: &str) -> &mut Self {
        cache_mut(&mut self.cache).remove(class);
        self.listeners.remove(class);
        self
    }

    /// The class → listener table, in insertion order.
    #[inline]
    pub fn listeners(&self) -> &IndexMap<String, String> {
        &self.listeners
    }

    /// Runs the read hook of `property` on `object`.
    ///
    /// The listener is looked up by the class of `object`. Without one, or
    /// if it does not intercept the hook, `value` is returned unchanged.
    pub fn getting(
        &self,
        object: &dyn Object,
        property: &str,
        value: Value,
    ) -> Result<Value, ListenError> {
        let hook = Hook::get(property);
        match self.listener_for(object.class_name(), &hook)? {
            Some(listener) => listener
                .on_get(&hook, value, object)
                .map_err(ListenError::Hook),
            None => Ok(value),
        }
    }

    /// Runs the write hook of `property` for an object of `class`.
    ///
    /// No instance is needed: this fires while the object is being built.
    pub fn setting(&self, class: &str, property: &str, value: Value) -> Result<Value, ListenError> {
        let hook = Hook::set(property);
        match self.listener_for(class, &hook)? {
            Some(listener) => listener.on_set(&hook, value).map_err(ListenError::Hook),
            None => Ok(value),
        }
    }

    fn listener_for(
        &self,
        class: &str,
        hook: &Hook<'_>,
    ) -> Result<Option<Arc<dyn Listener>>, ListenError> {
        let Some(name) = self.listeners.get(class) else {
            return Ok(None);
        };

        let Some(factory) = self.factories.get(name.as_str()) else {
            return Err(ListenError::UnknownListener {
                class: class.into(),
                listener: name.clone(),
            });
        };

        if !factory.intercepts(hook) {
            return Ok(None);
        }

        if let Some(listener) = read_cache(&self.cache).get(class) {
            #[cfg(all(debug_assertions, feature = "debug"))]
            log::trace!("listener cache hit for `{class}` on `{hook}`");
            return Ok(Some(listener.clone()));
        }

        let mut cache = write_cache(&self.cache);
        // Another thread may have built it between the two locks.
        if let Some(listener) = cache.get(class) {
            return Ok(Some(listener.clone()));
        }

        let listener = factory.create().map_err(|source| ListenError::Construct {
            listener: name.clone(),
            source,
        })?;

        log::debug!("constructed listener `{name}` for `{class}`");
        cache.insert(class.into(), listener.clone());
        Ok(Some(listener))
    }
}

#[inline]
fn read_cache(cache: &ListenerCache) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Listener>>> {
    cache.read().unwrap_or_else(PoisonError::into_inner)
}

#[inline]
fn write_cache(cache: &ListenerCache) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Listener>>> {
    cache.write().unwrap_or_else(PoisonError::into_inner)
}

#[inline]
fn cache_mut(cache: &mut ListenerCache) -> &mut HashMap<String, Arc<dyn Listener>> {
    cache.get_mut().unwrap_or_else(PoisonError::into_inner)
}

impl core::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners)
            .field("factories", &self.factories.keys())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ListenerRegistryArc

/// A shared handle to a [`ListenerRegistry`].
///
/// Hooks only need the read lock.
#[derive(Clone, Default)]
pub struct ListenerRegistryArc {
    /// The wrapped [`ListenerRegistry`].
    pub internal: Arc<RwLock<ListenerRegistry>>,
}

impl ListenerRegistryArc {
    /// Wraps an already configured registry.
    #[inline]
    pub fn new(registry: ListenerRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`ListenerRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, ListenerRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`ListenerRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, ListenerRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for ListenerRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.read().listeners, f)
    }
}

// -----------------------------------------------------------------------------
// Tests
