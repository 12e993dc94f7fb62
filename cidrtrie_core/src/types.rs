//! Data structures for the prefix trie

use crate::constants::{V4_BITS, V6_BITS};
use crate::prefix::Prefix;

/// Address family tag carried by keys and nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Node has never been on the path of a write.
    #[default]
    Unset,
    V4,
    V6,
}

impl Family {
    /// Longest prefix length valid for this family.
    pub const fn max_len(self) -> u8 {
        match self {
            Family::Unset => 0,
            Family::V4 => V4_BITS,
            Family::V6 => V6_BITS,
        }
    }

    pub const fn is_set(self) -> bool {
        !matches!(self, Family::Unset)
    }
}

/// Stable index of a node inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn from_index(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(i) => NodeId(i),
            Err(_) => panic!("node arena exceeded {} slots", u32::MAX),
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == NodeId::ROOT
    }
}

/// Trie vertex. `children[0]` is reached by path bit 0, `children[1]` by bit 1.
#[derive(Debug, Clone)]
pub struct Node<V> {
    pub value: Option<V>,
    pub children: [Option<NodeId>; 2],
    pub parent: Option<NodeId>, // non-owning
    pub family: Family,
}

impl<V> Node<V> {
    pub(crate) fn new(parent: Option<NodeId>, family: Family) -> Self {
        Self {
            value: None,
            children: [None, None],
            parent,
            family,
        }
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.children[0].is_some() || self.children[1].is_some()
    }

    /// Valueless and childless: must not stay linked (except the root).
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.value.is_none() && !self.has_children()
    }
}

/// A stored key together with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<V> {
    pub prefix: Prefix,
    pub value: V,
}

impl<V> Match<V> {
    pub fn new(prefix: Prefix, value: V) -> Self {
        Self { prefix, value }
    }

    pub fn into_pair(self) -> (Prefix, V) {
        (self.prefix, self.value)
    }
}
