//! B-tree node and the recursive rebalancing that keeps it valid.
//!
//! The mutating entry points are "loose": on return, the tree below `self` is
//! valid except that `self` may hold one key too many (`loose_insert`) or one
//! too few (`loose_remove`, `remove_biggest`). The parent repairs that with
//! `fix_excess` / `fix_shortage` on the way back up, and `Set` handles the
//! root specially.

use std::borrow::Borrow;
use std::fmt;
use std::mem;

use smallvec::SmallVec;

use crate::items::{attach_item, delete_item, detach_item, first_ge, insert_item, merge, split};
use crate::SetConfig;

/// Inline key slots. Sized for the default configuration: `MAXIMUM + 1`.
const INLINE_KEYS: usize = 2 * SetConfig::DEFAULT_MINIMUM + 1;
/// Inline child slots: one more than `INLINE_KEYS`.
const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

/// Spaces added per tree level in the diagnostic dump.
const INDENT_STEP: usize = 4;

pub(crate) type Keys<K> = SmallVec<[K; INLINE_KEYS]>;
pub(crate) type Children<K> = SmallVec<[Box<Node<K>>; INLINE_CHILDREN]>;

pub(crate) struct Node<K> {
    pub(crate) keys: Keys<K>,
    /// Empty for leaves; otherwise `keys.len() + 1` subtrees.
    pub(crate) children: Children<K>,
}

/// Deep copy that keeps each array's full capacity, so the copy never
/// reallocates during later splits and merges.
impl<K: Clone> Clone for Node<K> {
    fn clone(&self) -> Self {
        let mut keys = SmallVec::with_capacity(self.keys.capacity());
        keys.extend(self.keys.iter().cloned());
        let mut children = SmallVec::with_capacity(self.children.capacity());
        children.extend(self.children.iter().cloned());
        Self { keys, children }
    }
}

impl<K> Node<K> {
    pub(crate) fn new(cfg: SetConfig) -> Self {
        Self {
            keys: SmallVec::with_capacity(cfg.key_capacity()),
            children: SmallVec::with_capacity(cfg.child_capacity()),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Appends references to every key of this subtree in ascending order.
    pub(crate) fn in_order<'a>(&'a self, out: &mut Vec<&'a K>) {
        if self.is_leaf() {
            out.extend(self.keys.iter());
            return;
        }
        for (i, key) in self.keys.iter().enumerate() {
            self.children[i].in_order(out);
            out.push(key);
        }
        if let Some(last) = self.children.last() {
            last.in_order(out);
        }
    }

    /// Writes the subtree right-to-left, one key per line, nesting each level
    /// by `INDENT_STEP` spaces. Read sideways, the root is on the left.
    pub(crate) fn write_tree<W: fmt::Write>(&self, out: &mut W, indent: usize) -> fmt::Result
    where
        K: fmt::Display,
    {
        if let Some(last) = self.children.last() {
            last.write_tree(out, indent + INDENT_STEP)?;
        }
        for i in (0..self.keys.len()).rev() {
            writeln!(out, "{:indent$}{}", "", self.keys[i], indent = indent)?;
            if !self.is_leaf() {
                self.children[i].write_tree(out, indent + INDENT_STEP)?;
            }
        }
        Ok(())
    }
}

impl<K: Ord> Node<K> {
    pub(crate) fn contains<Q>(&self, target: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self;
        loop {
            let i = first_ge(&node.keys, target);
            if i < node.keys.len() && node.keys[i].borrow() == target {
                return true;
            }
            if node.is_leaf() {
                return false;
            }
            node = &node.children[i];
        }
    }

    /// Adds `entry` unless already present. Returns whether it was added.
    ///
    /// Afterwards `self` may hold `MAXIMUM + 1` keys.
    pub(crate) fn loose_insert(&mut self, entry: K, cfg: SetConfig) -> bool {
        let i = first_ge(&self.keys, &entry);
        if i < self.keys.len() && self.keys[i] == entry {
            return false;
        }

        if self.is_leaf() {
            insert_item(&mut self.keys, cfg.key_capacity(), i, entry);
            return true;
        }

        let inserted = self.children[i].loose_insert(entry, cfg);
        if self.children[i].keys.len() > cfg.maximum() {
            self.fix_excess(i, cfg);
        }
        inserted
    }

    /// Splits the overfull `children[i]` in two and promotes its median into
    /// `self.keys[i]`. May leave `self` one key over `MAXIMUM`.
    pub(crate) fn fix_excess(&mut self, i: usize, cfg: SetConfig) {
        debug_assert_eq!(self.children[i].keys.len(), cfg.maximum() + 1);

        insert_item(&mut self.children, cfg.child_capacity(), i + 1, Box::new(Node::new(cfg)));
        let (head, tail) = self.children.split_at_mut(i + 1);
        let left = &mut head[i];
        let right = &mut tail[0];

        split(&mut left.children, &mut right.children, cfg.child_capacity());
        split(&mut left.keys, &mut right.keys, cfg.key_capacity());

        let median = detach_item(&mut left.keys);
        tracing::trace!(
            child = i,
            left_keys = left.keys.len(),
            right_keys = right.keys.len(),
            "split overfull child"
        );
        insert_item(&mut self.keys, cfg.key_capacity(), i, median);
    }

    /// Removes `target` if present and returns it.
    ///
    /// Afterwards `self` may hold `MINIMUM - 1` keys.
    pub(crate) fn loose_remove<Q>(&mut self, target: &Q, cfg: SetConfig) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let i = first_ge(&self.keys, target);
        let found = i < self.keys.len() && self.keys[i].borrow() == target;

        if self.is_leaf() {
            return found.then(|| delete_item(&mut self.keys, i));
        }

        let removed = if found {
            // Replace with the in-order predecessor.
            let predecessor = self.children[i].remove_biggest(cfg);
            Some(mem::replace(&mut self.keys[i], predecessor))
        } else {
            self.children[i].loose_remove(target, cfg)
        };

        if self.children[i].keys.len() < cfg.minimum() {
            self.fix_shortage(i, cfg);
        }
        removed
    }

    /// Removes and returns the largest key in this subtree.
    ///
    /// Afterwards `self` may hold `MINIMUM - 1` keys.
    pub(crate) fn remove_biggest(&mut self, cfg: SetConfig) -> K {
        assert!(!self.keys.is_empty(), "remove_biggest on an empty node");

        if self.is_leaf() {
            return detach_item(&mut self.keys);
        }

        let last = self.children.len() - 1;
        let biggest = self.children[last].remove_biggest(cfg);
        if self.children[last].keys.len() < cfg.minimum() {
            self.fix_shortage(last, cfg);
        }
        biggest
    }

    /// Restores `children[i]`, which holds `MINIMUM - 1` keys.
    ///
    /// Borrows from the left sibling, then the right; failing both, merges
    /// with the right sibling, or with the left one for the last child.
    pub(crate) fn fix_shortage(&mut self, i: usize, cfg: SetConfig) {
        debug_assert_eq!(self.children[i].keys.len() + 1, cfg.minimum());

        let has_right = i + 1 < self.children.len();
        if i > 0 && self.children[i - 1].keys.len() > cfg.minimum() {
            self.transfer_right(i - 1, cfg);
        } else if has_right && self.children[i + 1].keys.len() > cfg.minimum() {
            self.transfer_left(i + 1, cfg);
        } else if has_right {
            self.merge_with_next(i, cfg);
        } else {
            self.merge_with_next(i - 1, cfg);
        }
    }

    /// Rotates the last key of `children[i]` up through `keys[i]` and down
    /// into the front of `children[i + 1]`, along with its last subtree.
    pub(crate) fn transfer_right(&mut self, i: usize, cfg: SetConfig) {
        let (head, tail) = self.children.split_at_mut(i + 1);
        let donor = &mut head[i];
        let recipient = &mut tail[0];

        if !donor.is_leaf() {
            let grandchild = detach_item(&mut donor.children);
            insert_item(&mut recipient.children, cfg.child_capacity(), 0, grandchild);
        }

        let lifted = detach_item(&mut donor.keys);
        let lowered = mem::replace(&mut self.keys[i], lifted);
        insert_item(&mut recipient.keys, cfg.key_capacity(), 0, lowered);

        tracing::trace!(from = i, to = i + 1, "transferred key right");
    }

    /// Rotates the first key of `children[i]` up through `keys[i - 1]` and
    /// down onto the end of `children[i - 1]`, along with its first subtree.
    pub(crate) fn transfer_left(&mut self, i: usize, cfg: SetConfig) {
        let (head, tail) = self.children.split_at_mut(i);
        let recipient = &mut head[i - 1];
        let donor = &mut tail[0];

        if !donor.is_leaf() {
            let grandchild = delete_item(&mut donor.children, 0);
            attach_item(&mut recipient.children, cfg.child_capacity(), grandchild);
        }

        let lifted = delete_item(&mut donor.keys, 0);
        let lowered = mem::replace(&mut self.keys[i - 1], lifted);
        attach_item(&mut recipient.keys, cfg.key_capacity(), lowered);

        tracing::trace!(from = i, to = i - 1, "transferred key left");
    }

    /// Fuses `children[i]`, `keys[i]` and `children[i + 1]` into `children[i]`
    /// and drops the emptied right sibling.
    pub(crate) fn merge_with_next(&mut self, i: usize, cfg: SetConfig) {
        debug_assert!(i + 1 < self.children.len());

        let separator = delete_item(&mut self.keys, i);
        let mut next = delete_item(&mut self.children, i + 1);
        let left = &mut self.children[i];

        attach_item(&mut left.keys, cfg.key_capacity(), separator);
        merge(&mut left.keys, cfg.key_capacity(), &mut next.keys);
        merge(&mut left.children, cfg.child_capacity(), &mut next.children);

        tracing::trace!(child = i, keys = left.keys.len(), "merged sibling children");
    }
}
