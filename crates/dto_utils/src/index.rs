//! Provide [`IndexMap`], a hash map that remembers insertion order.

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::{BuildHasher, Hash};

use hashbrown::HashTable;

use crate::hash::FixedHashState;

#[inline]
fn hash_of<Q: Hash + ?Sized>(value: &Q) -> u64 {
    FixedHashState.hash_one(value)
}

// -----------------------------------------------------------------------------
// IndexMap

/// A map whose iteration order is the order in which keys were first inserted.
///
/// Entries live in a dense `Vec`, and a [`HashTable`] of positions provides
/// O(1) lookups. Overwriting an existing key keeps its original position.
/// Removal shifts later entries down, which is O(n).
///
/// # Examples
///
/// ```
/// use dto_utils::IndexMap;
///
/// let mut map = IndexMap::new();
/// map.insert("street", 1);
/// map.insert("city", 2);
/// map.insert("street", 3);
///
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, ["street", "city"]);
/// assert_eq!(map.get("street"), Some(&3));
/// ```
#[derive(Clone)]
pub struct IndexMap<K, V> {
    entries: Vec<(K, V)>,
    table: HashTable<usize>,
}

impl<K, V> IndexMap<K, V> {
    /// Creates an empty `IndexMap`.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            table: HashTable::new(),
        }
    }

    /// Creates an empty `IndexMap` with the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            table: HashTable::with_capacity(capacity),
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at the given insertion position.
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get(index).map(|(k, v)| (k, v))
    }

    /// Iterates entries in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> + DoubleEndedIterator {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates entries in insertion order, with mutable values.
    #[inline]
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (&K, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    /// Iterates keys in insertion order.
    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterates values in insertion order.
    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Removes every entry, keeping the allocated memory.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.table.clear();
    }
}

impl<K: Hash + Eq, V> IndexMap<K, V> {
    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entries = &self.entries;
        self.table
            .find(hash_of(key), |&i| Borrow::<Q>::borrow(&entries[i].0) == key)
            .copied()
    }

    /// Returns a reference to the value of `key`.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.find(key) {
            Some(i) => Some(&self.entries[i].1),
            None => None,
        }
    }

    /// Returns a mutable reference to the value of `key`.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.find(key) {
            Some(i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// Returns `true` if the map contains `key`.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair.
    ///
    /// If the key already exists its value is replaced in place and the
    /// old value is returned; the entry keeps its position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let Self { entries, table } = self;
        let hash = hash_of(&key);

        match table.find(hash, |&i| entries[i].0 == key).copied() {
            Some(i) => Some(core::mem::replace(&mut entries[i].1, value)),
            None => {
                let index = entries.len();
                table.insert_unique(hash, index, |&i| hash_of(&entries[i].0));
                entries.push((key, value));
                None
            }
        }
    }

    /// Removes `key`, shifting every later entry down by one position.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Self { entries, table } = self;

        let index = match table.find_entry(hash_of(key), |&i| Borrow::<Q>::borrow(&entries[i].0) == key) {
            Ok(occupied) => occupied.remove().0,
            Err(_) => return None,
        };

        for slot in table.iter_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }

        Some(entries.remove(index).1)
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<K, V> Default for IndexMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug, V: Debug> Debug for IndexMap<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Order-sensitive: two maps with the same entries in a different order differ.
impl<K: PartialEq, V: PartialEq> PartialEq for IndexMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for IndexMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Hash + Eq, V> Extend<(K, V)> for IndexMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for IndexMap<K, V> {
    type Item = (K, V);
    type IntoIter = alloc::vec::IntoIter<(K, V)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// -----------------------------------------------------------------------------
// Tests
