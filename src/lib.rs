//! An ordered multi-map backed by a left-leaning red-black tree.

// Conventions used in comments are from Sedgewick's "Left-leaning Red-Black
// Trees":
// - A link is red if the node it points to is red; null links are black.
// - A 3-node is encoded as a node whose left child link is red.
// - A 4-node is encoded as a node with two red child links.
//
// The fundamental invariants of an LLRB tree are:
// 1. No right child link is red.
// 2. No red node has a red child (no two consecutive red links).
// 3. Every path from the root to a null link passes the same number of
//    black links.
// 4. The root is black.
//
// Corollary: the height of a tree holding n nodes is at most 2*log2(n + 1),
// since at most every other link on a root-to-null path is red.
//
// Entries are ordered by the caller-supplied comparators over (key, value)
// pairs. The engine itself never compares anything: every ordering-sensitive
// entry point takes the effective order as a closure, and the public
// wrappers in `map` and `multimap` own the comparators and decide what a
// comparison result of `Equal` means (replace in place vs. attach a
// duplicate).

use core::{cmp::Ordering, mem, ops::Not};

mod debug;
mod iter;
mod map;
mod multimap;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use iter::{Iter, Keys, Values, ValuesForKey};
pub use map::SortedMap;
pub use multimap::SortedMultiMap;

pub(crate) type Link<K, V> = Option<Box<Node<K, V>>>;

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    red: bool,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Node {
            key,
            value,
            // Fresh nodes join the tree as part of their parent 3- or
            // 4-node; `fix_up` splits them on the way back to the root.
            red: true,
            left: None,
            right: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// What insertion does when the new pair compares equal to an existing node.
#[derive(Copy, Clone, Debug)]
pub(crate) enum OnEqual {
    /// Overwrite the node's value in place, returning the old value.
    Replace,
    /// Keep both entries, descending toward the given side of the equal
    /// node to find a null link for the new one.
    Attach(Dir),
}

/// The tree engine shared by [`SortedMap`] and [`SortedMultiMap`].
pub(crate) struct Tree<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> Tree<K, V> {
    pub(crate) const fn new() -> Tree<K, V> {
        Tree { root: None, len: 0 }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn root(&self) -> Option<&Node<K, V>> {
        self.root.as_deref()
    }

    /// Drops the root link; node deallocation cascades through ownership.
    pub(crate) fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Inserts `(key, value)`, ordering it by `order` and resolving an
    /// `Equal` comparison according to `on_equal`.
    ///
    /// Returns the displaced value when `on_equal` is [`OnEqual::Replace`]
    /// and an equal entry existed. `len` grows only when a node was
    /// actually added.
    pub(crate) fn insert<F>(&mut self, order: &F, on_equal: OnEqual, key: K, value: V) -> Option<V>
    where
        F: Fn(&K, &V, &K, &V) -> Ordering,
    {
        let (mut root, replaced) = insert_rec(self.root.take(), order, on_equal, key, value);
        root.red = false;
        self.root = Some(root);

        if replaced.is_none() {
            self.len += 1;
        }

        replaced
    }

    /// Removes the entry for which `needle` returns `Equal`, if any.
    ///
    /// When several entries match (duplicate pairs in multi-map use), the
    /// first one met on the search path is removed; which one that is, is
    /// unspecified.
    pub(crate) fn remove<F>(&mut self, needle: &F) -> Option<(K, V)>
    where
        F: Fn(&K, &V) -> Ordering,
    {
        // The top-down deletion pass below assumes a matching node exists;
        // reject absent needles with a plain descent first.
        self.find(needle)?;

        let mut root = self.root.take().expect("find succeeded on an empty tree");

        if !is_red(&root.left) && !is_red(&root.right) {
            root.red = true;
        }

        let (new_root, removed) = remove_rec(root, needle);
        self.root = new_root;

        if let Some(root) = self.root.as_mut() {
            root.red = false;
        }

        self.len -= 1;

        Some(removed.expect("matching node not removed after successful find"))
    }

    /// Returns the node for which `needle` returns `Equal`, if any.
    ///
    /// `needle` must be monotonic with respect to the order the tree was
    /// built under; comparing by key alone against a (key, value)-ordered
    /// tree is fine since the key order is a coarsening of the pair order.
    pub(crate) fn find<F>(&self, needle: &F) -> Option<&Node<K, V>>
    where
        F: Fn(&K, &V) -> Ordering,
    {
        let mut cur = self.root.as_deref();

        while let Some(node) = cur {
            cur = match needle(&node.key, &node.value) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Equal => return Some(node),
                Ordering::Greater => node.right.as_deref(),
            };
        }

        None
    }

    pub(crate) fn find_mut<F>(&mut self, needle: &F) -> Option<&mut Node<K, V>>
    where
        F: Fn(&K, &V) -> Ordering,
    {
        let mut cur = self.root.as_deref_mut();

        while let Some(node) = cur {
            match needle(&node.key, &node.value) {
                Ordering::Less => cur = node.left.as_deref_mut(),
                Ordering::Equal => return Some(node),
                Ordering::Greater => cur = node.right.as_deref_mut(),
            }
        }

        None
    }

    /// Returns the minimum node of the tree.
    pub(crate) fn min(&self) -> Option<&Node<K, V>> {
        let mut cur = self.root.as_deref()?;

        while let Some(left) = cur.left.as_deref() {
            cur = left;
        }

        Some(cur)
    }

    /// Returns the maximum node of the tree.
    pub(crate) fn max(&self) -> Option<&Node<K, V>> {
        let mut cur = self.root.as_deref()?;

        while let Some(right) = cur.right.as_deref() {
            cur = right;
        }

        Some(cur)
    }

    pub(crate) fn height(&self) -> usize {
        fn height_at<K, V>(link: &Link<K, V>) -> usize {
            match link {
                None => 0,
                Some(node) => 1 + height_at(&node.left).max(height_at(&node.right)),
            }
        }

        height_at(&self.root)
    }

    pub(crate) fn assert_invariants<F>(&self, order: &F)
    where
        F: Fn(&K, &V, &K, &V) -> Ordering,
    {
        assert!(!is_red(&self.root), "root must be black");

        let mut count = 0;
        self.assert_invariants_at(&self.root, order, &mut count);

        assert_eq!(count, self.len, "len must equal the reachable node count");
    }

    /// Returns the number of black links on any path from `link` to a null
    /// link, asserting that the count is the same on all of them.
    fn assert_invariants_at<F>(&self, link: &Link<K, V>, order: &F, count: &mut usize) -> usize
    where
        F: Fn(&K, &V, &K, &V) -> Ordering,
    {
        let node = match link {
            None => return 0,
            Some(node) => node,
        };

        *count += 1;

        assert!(!is_red(&node.right), "right child link must not be red");

        if node.red {
            assert!(!is_red(&node.left), "red node must not have a red child");
        }

        if let Some(left) = node.left.as_deref() {
            assert_ne!(
                order(&left.key, &left.value, &node.key, &node.value),
                Ordering::Greater,
                "left subtree out of order",
            );
        }

        if let Some(right) = node.right.as_deref() {
            assert_ne!(
                order(&right.key, &right.value, &node.key, &node.value),
                Ordering::Less,
                "right subtree out of order",
            );
        }

        let left_black = self.assert_invariants_at(&node.left, order, count);
        let right_black = self.assert_invariants_at(&node.right, order, count);
        assert_eq!(left_black, right_black, "unequal black height");

        left_black + usize::from(!node.red)
    }
}

#[inline]
fn is_red<K, V>(link: &Link<K, V>) -> bool {
    matches!(link, Some(node) if node.red)
}

#[inline]
fn left_child_is_red<K, V>(link: &Link<K, V>) -> bool {
    matches!(link, Some(node) if is_red(&node.left))
}

// Rotation and color-flip primitives ========================================

// Makes a right-leaning red link lean left. `h`'s right child takes `h`'s
// place and color; `h` becomes its red left child.
fn rotate_left<K, V>(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut x = h.right.take().expect("rotate_left requires a right child");

    debug_assert!(x.red);

    h.right = x.left.take();
    x.red = h.red;
    h.red = true;
    x.left = Some(h);
    x
}

// Mirror image of `rotate_left`.
fn rotate_right<K, V>(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let mut x = h.left.take().expect("rotate_right requires a left child");

    debug_assert!(x.red);

    h.left = x.right.take();
    x.red = h.red;
    h.red = true;
    x.right = Some(h);
    x
}

// Inverts the colors of `h` and both its children, splitting a 4-node (or
// merging siblings during the deletion down-pass).
fn color_flip<K, V>(h: &mut Node<K, V>) {
    h.red = !h.red;

    if let Some(left) = h.left.as_mut() {
        left.red = !left.red;
    }

    if let Some(right) = h.right.as_mut() {
        right.red = !right.red;
    }
}

// Restores LLRB invariants locally on the way back up from an insertion or
// deletion: lean right-leaning reds left, rotate a red-red left pair right,
// split a 4-node.
fn fix_up<K, V>(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
    if is_red(&h.right) && !is_red(&h.left) {
        h = rotate_left(h);
    }

    if is_red(&h.left) && left_child_is_red(&h.left) {
        h = rotate_right(h);
    }

    if is_red(&h.left) && is_red(&h.right) {
        color_flip(&mut h);
    }

    h
}

// Assuming `h` is red or `h.left` is red, makes `h.left` or one of its
// children red in preparation for descending left.
fn move_red_left<K, V>(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
    color_flip(&mut h);

    if left_child_is_red(&h.right) {
        let right = h
            .right
            .take()
            .expect("red left child borrowed from a missing right subtree");
        h.right = Some(rotate_right(right));
        h = rotate_left(h);
        color_flip(&mut h);
    }

    h
}

// Assuming `h` is red or `h.right` is red, makes `h.right` or one of its
// children red in preparation for descending right.
fn move_red_right<K, V>(mut h: Box<Node<K, V>>) -> Box<Node<K, V>> {
    color_flip(&mut h);

    if left_child_is_red(&h.left) {
        h = rotate_right(h);
        color_flip(&mut h);
    }

    h
}

// Insertion =================================================================

fn insert_rec<K, V, F>(
    link: Link<K, V>,
    order: &F,
    on_equal: OnEqual,
    key: K,
    value: V,
) -> (Box<Node<K, V>>, Option<V>)
where
    F: Fn(&K, &V, &K, &V) -> Ordering,
{
    let mut h = match link {
        None => return (Box::new(Node::new(key, value)), None),
        Some(h) => h,
    };

    let ord = match order(&key, &value, &h.key, &h.value) {
        // The wrapper decides what an equal pair means. Attaching resolves
        // the tie toward one side; alternating the side across insertions
        // keeps runs of identical pairs from piling onto one spine.
        Ordering::Equal => match on_equal {
            OnEqual::Replace => {
                let old = mem::replace(&mut h.value, value);
                return (h, Some(old));
            }
            OnEqual::Attach(Dir::Left) => Ordering::Less,
            OnEqual::Attach(Dir::Right) => Ordering::Greater,
        },
        ord => ord,
    };

    let replaced = match ord {
        Ordering::Less => {
            let (left, replaced) = insert_rec(h.left.take(), order, on_equal, key, value);
            h.left = Some(left);
            replaced
        }
        Ordering::Equal | Ordering::Greater => {
            let (right, replaced) = insert_rec(h.right.take(), order, on_equal, key, value);
            h.right = Some(right);
            replaced
        }
    };

    (fix_up(h), replaced)
}

// Deletion ==================================================================

// Removes the minimum node of the subtree, returning the new subtree root
// and the detached node.
//
// Callers must guarantee `h` is red or `h.left` is red.
fn remove_min_rec<K, V>(mut h: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    if h.left.is_none() {
        // A left-leaning node without a left child has no right child
        // either; `h` is a leaf and can be detached outright.
        debug_assert!(h.right.is_none());
        return (None, h);
    }

    if !is_red(&h.left) && !left_child_is_red(&h.left) {
        h = move_red_left(h);
    }

    let left = h.left.take().expect("move_red_left lost the left subtree");
    let (left, min) = remove_min_rec(left);
    h.left = left;

    (Some(fix_up(h)), min)
}

// Removes the node matched by `needle` from the subtree rooted at `h`.
//
// The needle must be known to match somewhere in this subtree, and `h` must
// be red or have a red child on the search path; both are arranged by
// `Tree::remove` and maintained by the `move_red_*` calls below.
fn remove_rec<K, V, F>(mut h: Box<Node<K, V>>, needle: &F) -> (Link<K, V>, Option<(K, V)>)
where
    F: Fn(&K, &V) -> Ordering,
{
    let removed;

    if needle(&h.key, &h.value) == Ordering::Less {
        if !is_red(&h.left) && !left_child_is_red(&h.left) {
            h = move_red_left(h);
        }

        let left = h
            .left
            .take()
            .expect("needle matches in a missing left subtree");
        let (left, r) = remove_rec(left, needle);
        h.left = left;
        removed = r;
    } else {
        if is_red(&h.left) {
            h = rotate_right(h);
        }

        // `h` may be a different node after the rotation; recompare.
        if needle(&h.key, &h.value) == Ordering::Equal && h.right.is_none() {
            debug_assert!(h.left.is_none());
            let Node { key, value, .. } = *h;
            return (None, Some((key, value)));
        }

        if !is_red(&h.right) && !left_child_is_red(&h.right) {
            h = move_red_right(h);
        }

        if needle(&h.key, &h.value) == Ordering::Equal {
            // Interior node: splice the in-order successor into `h`'s slot
            // by swapping payloads, then detach the successor's old node.
            let right = h
                .right
                .take()
                .expect("equal interior node without a right subtree");
            let (right, mut successor) = remove_min_rec(right);
            h.right = right;

            mem::swap(&mut h.key, &mut successor.key);
            mem::swap(&mut h.value, &mut successor.value);

            let Node { key, value, .. } = *successor;
            removed = Some((key, value));
        } else {
            let right = h
                .right
                .take()
                .expect("needle matches in a missing right subtree");
            let (right, r) = remove_rec(right, needle);
            h.right = right;
            removed = r;
        }
    }

    (Some(fix_up(h)), removed)
}
