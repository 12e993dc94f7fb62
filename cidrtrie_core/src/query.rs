//! Exact, longest-prefix, subtree and ancestor queries, plus node handles.
//!
//! Everything here only reads the arena; callers hold the shared lock.

use crate::arena::Tree;
use crate::helpers::canonical;
use crate::path::{descend, own_prefix, path_bits, stored_prefix};
use crate::prefix::Prefix;
use crate::types::NodeId;

impl<V> Tree<V> {
    /// Value stored at exactly `prefix`.
    pub fn exact(&self, prefix: &Prefix) -> Option<&V> {
        self.find(prefix).and_then(|id| self.node(id).value.as_ref())
    }

    pub fn has_key(&self, prefix: &Prefix) -> bool {
        self.exact(prefix).is_some()
    }

    /// Deepest valued node on `prefix`'s path (the start node included).
    fn longest_match_id(&self, prefix: &Prefix) -> Option<(NodeId, u8)> {
        let mut cur = NodeId::ROOT;
        let mut depth = 0u8;
        let mut best = self.node(cur).value.as_ref().map(|_| (cur, depth));
        for bit in path_bits(prefix) {
            cur = match self.child(cur, bit) {
                Some(next) => next,
                None => break,
            };
            depth += 1;
            if self.node(cur).value.is_some() {
                best = Some((cur, depth));
            }
        }
        best
    }

    /// Most specific stored prefix covering `prefix`, with its value.
    pub fn longest_match(&self, prefix: &Prefix) -> Option<(Prefix, &V)> {
        let (id, depth) = self.longest_match_id(prefix)?;
        let node = self.node(id);
        let key = stored_prefix(node.family, canonical(prefix.bits(), depth), depth);
        node.value.as_ref().map(|v| (key, v))
    }

    pub fn contains(&self, prefix: &Prefix) -> bool {
        self.longest_match_id(prefix).is_some()
    }

    /// Every stored key at or below `prefix`'s node, pre-order, left first.
    /// `prefix` itself need not be stored.
    pub fn subtree(&self, prefix: &Prefix) -> Vec<(Prefix, &V)> {
        let mut out = Vec::new();
        if let Some(id) = self.find(prefix) {
            self.collect(id, prefix.bits(), prefix.prefix_len(), &mut out);
        }
        out
    }

    /// Every stored key in the trie, pre-order, left first.
    pub fn entries(&self) -> Vec<(Prefix, &V)> {
        let mut out = Vec::with_capacity(self.len());
        self.collect(NodeId::ROOT, 0, 0, &mut out);
        out
    }

    fn collect<'a>(&'a self, start: NodeId, bits: u128, depth: u8, out: &mut Vec<(Prefix, &'a V)>) {
        let mut stack = vec![(start, bits, depth)];
        while let Some((id, bits, depth)) = stack.pop() {
            let node = self.node(id);
            if let Some(v) = node.value.as_ref() {
                out.push((stored_prefix(node.family, bits, depth), v));
            }
            // right pushed first so left is visited first
            for bit in [1u8, 0u8] {
                if let Some(child) = node.children[bit as usize] {
                    stack.push((child, descend(bits, depth, bit), depth + 1));
                }
            }
        }
    }

    /// Nearest strict ancestor of `prefix`'s node that holds a value.
    pub fn valued_ancestor(&self, prefix: &Prefix) -> Option<(Prefix, &V)> {
        let id = self.find(prefix)?;
        self.handle(id).valued_ancestor().and_then(|n| n.entry())
    }

    /// Handle on the node at exactly `prefix`, valued or not.
    pub fn node_ref(&self, prefix: &Prefix) -> Option<NodeRef<'_, V>> {
        self.find(prefix).map(|id| self.handle(id))
    }

    /// Handle on the node of the longest stored prefix covering `prefix`.
    pub fn locate(&self, prefix: &Prefix) -> Option<NodeRef<'_, V>> {
        self.longest_match_id(prefix).map(|(id, _)| self.handle(id))
    }

    pub fn root_ref(&self) -> NodeRef<'_, V> {
        self.handle(NodeId::ROOT)
    }

    fn handle(&self, id: NodeId) -> NodeRef<'_, V> {
        NodeRef { tree: self, id }
    }
}

/// Read-only handle on one node, borrowed from a locked tree.
pub struct NodeRef<'a, V> {
    tree: &'a Tree<V>,
    id: NodeId,
}

impl<V> Clone for NodeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NodeRef<'_, V> {}

impl<'a, V> NodeRef<'a, V> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    pub fn depth(&self) -> u8 {
        self.tree.depth(self.id)
    }

    /// Key this node stands for; `None` only for a never-written root.
    pub fn prefix(&self) -> Option<Prefix> {
        own_prefix(self.tree, self.id)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.tree.node(self.id).value.as_ref()
    }

    pub fn entry(&self) -> Option<(Prefix, &'a V)> {
        Some((self.prefix()?, self.value()?))
    }

    pub fn children(&self) -> [Option<NodeRef<'a, V>>; 2] {
        self.tree
            .node(self.id)
            .children
            .map(|c| c.map(|id| self.tree.handle(id)))
    }

    /// Structural parent, valued or not.
    pub fn parent(&self) -> Option<NodeRef<'a, V>> {
        self.tree.node(self.id).parent.map(|id| self.tree.handle(id))
    }

    /// Closest strict ancestor holding a value.
    pub fn valued_ancestor(&self) -> Option<NodeRef<'a, V>> {
        let mut cur = self.parent();
        while let Some(n) = cur {
            if n.value().is_some() {
                return Some(n);
            }
            cur = n.parent();
        }
        None
    }

    /// This node and every valued node below it, pre-order.
    pub fn descendants(&self) -> Vec<(Prefix, &'a V)> {
        let mut out = Vec::new();
        let (bits, depth) = match self.prefix() {
            Some(p) => (p.bits(), p.prefix_len()),
            None => (0, 0),
        };
        self.tree.collect(self.id, bits, depth, &mut out);
        out
    }
}
