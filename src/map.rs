use core::cmp::Ordering;
use core::fmt;

use compare::{natural, Compare, Natural};

use crate::iter::{Iter, Keys, Values, ValuesForKey};
use crate::{OnEqual, Tree};

/// An ordered map with at most one value per key, backed by a left-leaning
/// red-black tree.
///
/// Keys are ordered by the comparator supplied at construction; inserting a
/// key that is already present replaces its value in place. For a container
/// that keeps every inserted pair, see [`SortedMultiMap`].
///
/// The behavior of the map is undefined if a key's ordering relative to any
/// other key changes while the key is in the map.
///
/// # Examples
///
/// ```
/// use llrb_multimap::SortedMap;
///
/// let mut map = SortedMap::new();
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// assert_eq!(map.keys().collect::<Vec<_>>(), [&1, &2, &3]);
/// assert_eq!(map.get(&2), Some(&"b"));
/// ```
///
/// [`SortedMultiMap`]: crate::SortedMultiMap
pub struct SortedMap<K, V, C = Natural<K>>
where
    C: Compare<K>,
{
    tree: Tree<K, V>,
    key_cmp: C,
}

impl<K: Ord, V> SortedMap<K, V> {
    /// Creates an empty map ordered by the natural order of its keys.
    pub fn new() -> Self {
        SortedMap::with_cmp(natural())
    }
}

impl<K: Ord, V> Default for SortedMap<K, V> {
    fn default() -> Self {
        SortedMap::new()
    }
}

impl<K, V, C> SortedMap<K, V, C>
where
    C: Compare<K>,
{
    /// Creates an empty map ordered by `key_cmp`.
    ///
    /// Any `Fn(&K, &K) -> Ordering` works as a comparator:
    ///
    /// ```
    /// use llrb_multimap::SortedMap;
    ///
    /// let mut map = SortedMap::with_cmp(|a: &i32, b: &i32| b.cmp(a));
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// assert_eq!(map.min_key(), Some(&2));
    /// ```
    pub fn with_cmp(key_cmp: C) -> Self {
        SortedMap {
            tree: Tree::new(),
            key_cmp,
        }
    }

    /// Returns the number of entries in the map.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map contains no entries.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes all entries from the map.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Inserts a key/value pair, returning the previous value associated
    /// with `key` if there was one.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (tree, cmp) = (&mut self.tree, &self.key_cmp);
        let order = |k: &K, _: &V, node_key: &K, _: &V| cmp.compare(k, node_key);

        tree.insert(&order, OnEqual::Replace, key, value)
    }

    /// Removes the entry for `key`, returning its value if the key was
    /// present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (tree, cmp) = (&mut self.tree, &self.key_cmp);
        let needle = |node_key: &K, _: &V| cmp.compare(key, node_key);

        tree.remove(&needle).map(|(_, value)| value)
    }

    /// Returns a reference to the value associated with `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let needle = |node_key: &K, _: &V| self.key_cmp.compare(key, node_key);

        self.tree.find(&needle).map(|node| &node.value)
    }

    /// Returns a mutable reference to the value associated with `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (tree, cmp) = (&mut self.tree, &self.key_cmp);
        let needle = |node_key: &K, _: &V| cmp.compare(key, node_key);

        tree.find_mut(&needle).map(|node| &mut node.value)
    }

    /// Returns `true` if the map contains a value for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns an iterator over all entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.tree)
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys::new(&self.tree, &self.key_cmp)
    }

    /// Returns an iterator over the values, in ascending order of their
    /// keys.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(&self.tree)
    }

    /// Returns an iterator over the value stored under `key`, yielding
    /// either zero or one item.
    pub fn values_for_key<'map>(&'map self, key: &'map K) -> ValuesForKey<'map, K, V, C> {
        ValuesForKey::new(&self.tree, &self.key_cmp, key)
    }

    /// Returns the minimum key, or `None` if the map is empty.
    pub fn min_key(&self) -> Option<&K> {
        self.tree.min().map(|node| &node.key)
    }

    /// Returns the maximum key, or `None` if the map is empty.
    pub fn max_key(&self) -> Option<&K> {
        self.tree.max().map(|node| &node.key)
    }

    /// Returns the value of the minimum key, or `None` if the map is empty.
    pub fn min_value(&self) -> Option<&V> {
        self.tree.min().map(|node| &node.value)
    }

    /// Returns the value of the maximum key, or `None` if the map is empty.
    pub fn max_value(&self) -> Option<&V> {
        self.tree.max().map(|node| &node.value)
    }

    /// Writes a Graphviz rendering of the backing tree to `w`.
    pub fn dotgraph<W>(&self, name: &str, w: W) -> fmt::Result
    where
        W: fmt::Write,
        K: fmt::Display,
        V: fmt::Display,
    {
        self.tree.dotgraph(name, w)
    }

    #[doc(hidden)]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let order = |k: &K, _: &V, node_key: &K, _: &V| {
            let ord = self.key_cmp.compare(k, node_key);
            // Key replacement never creates equal siblings, so any echo of
            // an equal key in the structure is a defect here.
            assert_ne!(ord, Ordering::Equal, "duplicate key in single-value map");
            ord
        };

        self.tree.assert_invariants(&order);
    }
}

impl<K, V, C> Extend<(K, V)> for SortedMap<K, V, C>
where
    C: Compare<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for SortedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = SortedMap::new();
        map.extend(iter);
        map
    }
}

impl<'map, K, V, C> IntoIterator for &'map SortedMap<K, V, C>
where
    C: Compare<K>,
{
    type Item = (&'map K, &'map V);
    type IntoIter = Iter<'map, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C> fmt::Debug for SortedMap<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Compare<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
