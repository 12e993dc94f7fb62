//! Node arena backing one trie instance.
//!
//! Nodes are addressed by `NodeId`; slot 0 is the root and is never freed.
//! Slots released by pruning go on a free list and are handed out again by
//! the next allocation. None of this is synchronised: the owning
//! `PrefixTrie` serialises access through its reader-writer lock.

use crate::types::{Family, Node, NodeId};
use log::trace;

#[derive(Debug, Clone)]
pub struct Tree<V> {
    nodes: Vec<Node<V>>,
    free: Vec<NodeId>,
    stored: usize, // nodes currently holding a value
}

impl<V> Default for Tree<V> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<V> Tree<V> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(Node::new(None, Family::Unset));
        Self {
            nodes,
            free: Vec::new(),
            stored: 0,
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<V> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn root(&self) -> &Node<V> {
        self.node(NodeId::ROOT)
    }

    #[inline]
    pub fn child(&self, id: NodeId, bit: u8) -> Option<NodeId> {
        self.node(id).children[bit as usize]
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.stored
    }

    pub fn is_empty(&self) -> bool {
        self.stored == 0
    }

    /// Live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Creates a child under `parent` on side `bit`. The slot must be empty.
    pub(crate) fn attach(&mut self, parent: NodeId, bit: u8, family: Family) -> NodeId {
        debug_assert!(self.child(parent, bit).is_none(), "attach over a live child");
        let node = Node::new(Some(parent), family);
        let id = match self.free.pop() {
            Some(id) => {
                trace!("[ALLOC] Reusing freed slot {}", id.index());
                self.nodes[id.index()] = node;
                id
            }
            None => {
                let id = NodeId::from_index(self.nodes.len());
                self.nodes.push(node);
                id
            }
        };
        self.node_mut(parent).children[bit as usize] = Some(id);
        id
    }

    /// Unlinks a dead, non-root node from its parent and recycles its slot.
    /// Returns the parent.
    pub(crate) fn detach(&mut self, id: NodeId) -> NodeId {
        debug_assert!(!id.is_root(), "root is never detached");
        debug_assert!(self.node(id).is_dead(), "detaching a live node");
        let (parent, bit) = self.slot_of(id).unwrap_or_else(|| {
            panic!("node {} has no parent but is not the root", id.index())
        });
        self.node_mut(parent).children[bit as usize] = None;
        *self.node_mut(id) = Node::new(None, Family::Unset);
        self.free.push(id);
        parent
    }

    /// Parent of `id` and the side of the parent it hangs from.
    ///
    /// Panics when the parent does not link back to `id`: the tree is
    /// corrupt and continuing would hand out wrong keys.
    pub fn slot_of(&self, id: NodeId) -> Option<(NodeId, u8)> {
        let parent = self.node(id).parent?;
        let kids = &self.node(parent).children;
        if kids[0] == Some(id) {
            Some((parent, 0))
        } else if kids[1] == Some(id) {
            Some((parent, 1))
        } else {
            panic!(
                "back-link mismatch: node {} names parent {} which does not own it",
                id.index(),
                parent.index()
            )
        }
    }

    /// Distance from the root, i.e. the prefix length this node stands for.
    pub fn depth(&self, id: NodeId) -> u8 {
        let mut depth = 0u8;
        let mut cur = id;
        while let Some(parent) = self.node(cur).parent {
            depth += 1;
            cur = parent;
        }
        depth
    }

    /// Stores `value` at `id`, returning what it replaces.
    pub(crate) fn put_value(&mut self, id: NodeId, family: Family, value: V) -> Option<V> {
        let node = self.node_mut(id);
        node.family = family;
        let prev = node.value.replace(value);
        if prev.is_none() {
            self.stored += 1;
        }
        prev
    }

    pub(crate) fn take_value(&mut self, id: NodeId) -> Option<V> {
        let prev = self.node_mut(id).value.take();
        if prev.is_some() {
            self.stored -= 1;
        }
        prev
    }

    /// Drops every node but the root and resets the root.
    pub(crate) fn reset(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0] = Node::new(None, Family::Unset);
        self.free.clear();
        self.stored = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_slots_are_reused() {
        let mut t: Tree<u32> = Tree::default();
        let a = t.attach(NodeId::ROOT, 0, Family::V4);
        let b = t.attach(a, 1, Family::V4);
        assert_eq!(t.node_count(), 3);
        assert_eq!(t.depth(b), 2);
        assert_eq!(t.slot_of(b), Some((a, 1)));

        assert_eq!(t.detach(b), a);
        assert_eq!(t.node_count(), 2);
        assert!(t.child(a, 1).is_none());

        let c = t.attach(a, 0, Family::V4);
        assert_eq!(c, b, "freed slot should be handed out again");
        assert_eq!(t.slot_of(c), Some((a, 0)));
    }

    #[test]
    fn value_bookkeeping() {
        let mut t: Tree<&str> = Tree::default();
        let a = t.attach(NodeId::ROOT, 1, Family::V6);
        assert_eq!(t.put_value(a, Family::V6, "x"), None);
        assert_eq!(t.put_value(a, Family::V6, "y"), Some("x"));
        assert_eq!(t.len(), 1);
        assert_eq!(t.take_value(a), Some("y"));
        assert_eq!(t.take_value(a), None);
        assert!(t.is_empty());
    }

    #[test]
    #[should_panic(expected = "back-link mismatch")]
    fn corrupt_back_link_panics() {
        let mut t: Tree<u8> = Tree::default();
        let a = t.attach(NodeId::ROOT, 0, Family::V4);
        t.node_mut(NodeId::ROOT).children[0] = None;
        let _ = t.slot_of(a);
    }

    #[test]
    fn reset_keeps_only_root() {
        let mut t: Tree<u8> = Tree::default();
        let a = t.attach(NodeId::ROOT, 0, Family::V4);
        t.put_value(a, Family::V4, 7);
        t.reset();
        assert_eq!(t.node_count(), 1);
        assert!(t.is_empty());
        assert!(!t.root().has_children());
        assert_eq!(t.root().family, Family::Unset);
    }
}
