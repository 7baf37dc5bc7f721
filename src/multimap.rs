use core::fmt;

use compare::{natural, Compare, Natural};

use crate::iter::{Iter, Keys, Values, ValuesForKey};
use crate::{Dir, OnEqual, Tree};

/// An ordered multi-map backed by a left-leaning red-black tree.
///
/// Every inserted pair is kept: equal keys are ordered among themselves by
/// the value comparator, and fully equal (key, value) pairs coexist as
/// distinct entries. Insertion, removal, and point lookup complete in
/// _O(log(n))_ time regardless of insertion order.
///
/// Runs of identical pairs are attached alternately to the left and right
/// of an existing equal node, so repeated insertion of one pair does not
/// degrade the search path into a list.
///
/// The behavior of the map is undefined if an entry's ordering relative to
/// any other entry changes while the entry is in the map.
///
/// # Examples
///
/// ```
/// use llrb_multimap::SortedMultiMap;
///
/// let mut positions = SortedMultiMap::new();
/// positions.insert("apples", 4);
/// positions.insert("apples", 1);
/// positions.insert("pears", 2);
///
/// assert_eq!(positions.len(), 3);
/// assert_eq!(positions.keys().collect::<Vec<_>>(), [&"apples", &"pears"]);
/// assert_eq!(positions.values_for_key(&"apples").collect::<Vec<_>>(), [&1, &4]);
/// ```
pub struct SortedMultiMap<K, V, C = Natural<K>, D = Natural<V>>
where
    C: Compare<K>,
    D: Compare<V>,
{
    tree: Tree<K, V>,
    key_cmp: C,
    value_cmp: D,
    equal_attach: Dir,
}

impl<K: Ord, V: Ord> SortedMultiMap<K, V> {
    /// Creates an empty multi-map ordered by the natural order of its keys
    /// and values.
    pub fn new() -> Self {
        SortedMultiMap::with_cmp(natural(), natural())
    }
}

impl<K: Ord, V: Ord> Default for SortedMultiMap<K, V> {
    fn default() -> Self {
        SortedMultiMap::new()
    }
}

impl<K, V, C, D> SortedMultiMap<K, V, C, D>
where
    C: Compare<K>,
    D: Compare<V>,
{
    /// Creates an empty multi-map ordered by `key_cmp`, with values under
    /// one key ordered by `value_cmp`.
    pub fn with_cmp(key_cmp: C, value_cmp: D) -> Self {
        SortedMultiMap {
            tree: Tree::new(),
            key_cmp,
            value_cmp,
            equal_attach: Dir::Left,
        }
    }

    /// Returns the number of entries in the map, duplicates included.
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

    /// Inserts a key/value pair. Pairs already present are kept; the new
    /// entry is added alongside them.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K, value: V) {
        let dir = self.equal_attach;
        self.equal_attach = !dir;

        let (tree, key_cmp, value_cmp) = (&mut self.tree, &self.key_cmp, &self.value_cmp);
        let order = |k: &K, v: &V, node_key: &K, node_value: &V| {
            key_cmp
                .compare(k, node_key)
                .then_with(|| value_cmp.compare(v, node_value))
        };

        let replaced = tree.insert(&order, OnEqual::Attach(dir), key, value);
        debug_assert!(replaced.is_none());
    }

    /// Removes one entry matching `(key, value)`, returning whether a match
    /// was found and removed.
    ///
    /// When the same pair is stored more than once, exactly one of the
    /// copies is removed; which copy is unspecified.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove(&mut self, key: &K, value: &V) -> bool {
        let (tree, key_cmp, value_cmp) = (&mut self.tree, &self.key_cmp, &self.value_cmp);
        let needle = |node_key: &K, node_value: &V| {
            key_cmp
                .compare(key, node_key)
                .then_with(|| value_cmp.compare(value, node_value))
        };

        tree.remove(&needle).is_some()
    }

    /// Returns `true` if the map contains at least one entry for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        // Key order is a coarsening of the (key, value) order the tree is
        // built under, so a key-only descent lands on some entry for the
        // key if any exists.
        let needle = |node_key: &K, _: &V| self.key_cmp.compare(key, node_key);

        self.tree.find(&needle).is_some()
    }

    /// Returns `true` if the map contains the exact `(key, value)` pair.
    pub fn contains(&self, key: &K, value: &V) -> bool {
        let needle = |node_key: &K, node_value: &V| {
            self.key_cmp
                .compare(key, node_key)
                .then_with(|| self.value_cmp.compare(value, node_value))
        };

        self.tree.find(&needle).is_some()
    }

    /// Returns an iterator over all entries in ascending (key, value)
    /// order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.tree)
    }

    /// Returns an iterator over the distinct keys in ascending order;
    /// duplicated keys are yielded once.
    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys::new(&self.tree, &self.key_cmp)
    }

    /// Returns an iterator over all values in ascending (key, value)
    /// order, duplicates included.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(&self.tree)
    }

    /// Returns an iterator over the values stored under `key`, in ascending
    /// value order. The iterator is empty if the key is absent.
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

    /// Returns the minimum value of the minimum key, or `None` if the map
    /// is empty.
    pub fn min_value(&self) -> Option<&V> {
        self.tree.min().map(|node| &node.value)
    }

    /// Returns the maximum value of the maximum key, or `None` if the map
    /// is empty.
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
        let order = |k: &K, v: &V, node_key: &K, node_value: &V| {
            self.key_cmp
                .compare(k, node_key)
                .then_with(|| self.value_cmp.compare(v, node_value))
        };

        self.tree.assert_invariants(&order);
    }
}

impl<K, V, C, D> Extend<(K, V)> for SortedMultiMap<K, V, C, D>
where
    C: Compare<K>,
    D: Compare<V>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V: Ord> FromIterator<(K, V)> for SortedMultiMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = SortedMultiMap::new();
        map.extend(iter);
        map
    }
}

impl<'map, K, V, C, D> IntoIterator for &'map SortedMultiMap<K, V, C, D>
where
    C: Compare<K>,
    D: Compare<V>,
{
    type Item = (&'map K, &'map V);
    type IntoIter = Iter<'map, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C, D> fmt::Debug for SortedMultiMap<K, V, C, D>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Compare<K>,
    D: Compare<V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
