//! # bset
//!
//! An in-memory ordered set backed by a B-tree with a configurable branching
//! factor.
//!
//! Every node other than the root holds between `MINIMUM` and
//! `MAXIMUM = 2 * MINIMUM` keys, and all leaves sit at the same depth. The
//! tree only grows or shrinks in height at the root.
//!
//! ## Example
//!
//! ```rust
//! use bset::Set;
//!
//! let mut set: Set<u32> = Set::new();
//! for k in [5, 1, 4, 2, 3] {
//!     set.insert(k);
//! }
//!
//! assert!(set.contains(&3));
//! assert!(set.remove(&3));
//! assert!(!set.contains(&3));
//! assert_eq!(format!("{set:?}"), "{1, 2, 4, 5}");
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::mem;

mod items;
mod node;
pub mod stats;

pub use items::index_of_maximal;
pub use stats::Statistician;

use items::{attach_item, detach_item};
use node::Node;

// =============================================================================
// Configuration
// =============================================================================

/// Branching-factor configuration shared by every node of one tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetConfig {
    minimum: usize,
}

/// Error returned when a [`SetConfig`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `minimum` must be at least 1.
    MinimumTooSmall,
    /// `minimum` exceeds [`SetConfig::MAX_MINIMUM`].
    MinimumTooLarge(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinimumTooSmall => write!(f, "minimum keys per node must be at least 1"),
            Self::MinimumTooLarge(minimum) => {
                write!(f, "minimum keys per node is too large: {minimum}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl SetConfig {
    pub const DEFAULT_MINIMUM: usize = 2;
    /// Largest accepted `minimum`. Keeps every node's arrays well inside
    /// what a single allocation can hold.
    pub const MAX_MINIMUM: usize = u16::MAX as usize;

    /// Validates `minimum`, the fewest keys a non-root node may hold.
    pub fn new(minimum: usize) -> Result<Self, ConfigError> {
        if minimum == 0 {
            return Err(ConfigError::MinimumTooSmall);
        }
        if minimum > Self::MAX_MINIMUM {
            return Err(ConfigError::MinimumTooLarge(minimum));
        }
        Ok(Self { minimum })
    }

    #[inline]
    pub const fn minimum(self) -> usize {
        self.minimum
    }

    #[inline]
    pub const fn maximum(self) -> usize {
        2 * self.minimum
    }

    /// Key slots per node, including the transient overflow slot.
    #[inline]
    pub(crate) const fn key_capacity(self) -> usize {
        self.maximum() + 1
    }

    #[inline]
    pub(crate) const fn child_capacity(self) -> usize {
        self.maximum() + 2
    }
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            minimum: Self::DEFAULT_MINIMUM,
        }
    }
}

// =============================================================================
// Set
// =============================================================================

/// An ordered set of unique keys stored in a B-tree.
///
/// Cloning performs a deep copy of every node; the clone and the original
/// share nothing.
#[derive(Clone)]
pub struct Set<K> {
    root: Node<K>,
    config: SetConfig,
    len: usize,
}

impl<K> Set<K> {
    pub fn new() -> Self {
        Self::with_config(SetConfig::default())
    }

    pub fn with_config(config: SetConfig) -> Self {
        Self {
            root: Node::new(config),
            config,
            len: 0,
        }
    }

    pub fn with_minimum(minimum: usize) -> Result<Self, ConfigError> {
        SetConfig::new(minimum).map(Self::with_config)
    }

    #[inline]
    pub fn config(&self) -> SetConfig {
        self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of node levels; `0` for an empty set.
    pub fn height(&self) -> usize {
        if self.root.keys.is_empty() {
            return 0;
        }
        let mut height = 1;
        let mut node = &self.root;
        while let Some(first) = node.children.first() {
            node = first;
            height += 1;
        }
        height
    }

    pub fn clear(&mut self) {
        self.root = Node::new(self.config);
        self.len = 0;
    }
}

impl<K: Ord> Set<K> {
    pub fn contains<Q>(&self, target: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.contains(target)
    }

    /// Adds `entry`. Returns `false` if it was already present.
    pub fn insert(&mut self, entry: K) -> bool {
        let inserted = self.root.loose_insert(entry, self.config);
        if self.root.keys.len() > self.config.maximum() {
            self.grow_root();
        }
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes `target`. Returns `false` if it was not present.
    pub fn remove<Q>(&mut self, target: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(target).is_some()
    }

    /// Removes `target` and returns the stored key.
    pub fn take<Q>(&mut self, target: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let removed = self.root.loose_remove(target, self.config);
        if self.root.keys.is_empty() && self.root.children.len() == 1 {
            self.shrink_root();
        }
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Moves the overfull root down into a fresh sole child and splits it,
    /// adding one level to the tree.
    fn grow_root(&mut self) {
        let cfg = self.config;
        let old_root = mem::replace(&mut self.root, Node::new(cfg));
        attach_item(&mut self.root.children, cfg.child_capacity(), Box::new(old_root));
        self.root.fix_excess(0, cfg);
        tracing::trace!(height = self.height(), "grew root");
    }

    /// Replaces a keyless root with its sole child, removing one level.
    fn shrink_root(&mut self) {
        let child = detach_item(&mut self.root.children);
        self.root = *child;
        tracing::trace!(height = self.height(), "shrank root");
    }
}

impl<K: fmt::Display> Set<K> {
    /// Renders the tree sideways: the largest keys first, each level indented
    /// four more spaces than its parent. For debugging only.
    pub fn dump(&self, indent: usize) -> String {
        let mut out = String::new();
        self.root
            .write_tree(&mut out, indent)
            .expect("writing to a String cannot fail");
        out
    }

    pub fn print(&self, indent: usize) {
        print!("{}", self.dump(indent));
    }
}

impl<K> Default for Set<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Display> fmt::Display for Set<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write_tree(f, 0)
    }
}

impl<K: fmt::Debug> fmt::Debug for Set<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::with_capacity(self.len);
        self.root.in_order(&mut keys);
        f.debug_set().entries(keys).finish()
    }
}

impl<K: Ord> Extend<K> for Set<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for Set<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}


#[cfg(test)]
mod proptests;
