//! Upsert / insert-if-absent / update-if-present / delete / clear.
//!
//! These run with the caller holding the trie's write lock for the whole
//! call, so each one is a single atomic step for every observer.

use crate::arena::Tree;
use crate::errors::Error;
use crate::path::path_bits;
use crate::prefix::Prefix;
use crate::types::NodeId;
#[cfg(feature = "trace")]
use log::trace;
use log::debug;

impl<V> Tree<V> {
    /// Node at exactly `prefix`'s depth along its path, if it exists.
    pub fn find(&self, prefix: &Prefix) -> Option<NodeId> {
        let mut cur = NodeId::ROOT;
        for bit in path_bits(prefix) {
            cur = self.child(cur, bit)?;
        }
        Some(cur)
    }

    /// Walks `prefix`'s path, creating every missing node on the way.
    fn materialize(&mut self, prefix: &Prefix) -> NodeId {
        let family = prefix.family();
        let mut cur = NodeId::ROOT;
        if !self.root().family.is_set() {
            self.node_mut(NodeId::ROOT).family = family;
        }
        for bit in path_bits(prefix) {
            cur = match self.child(cur, bit) {
                Some(next) => next,
                None => {
                    #[cfg(feature = "trace")]
                    trace!("[MATERIALIZE] new node under {} bit={}", cur.index(), bit);
                    self.attach(cur, bit, family)
                }
            };
        }
        cur
    }

    /// Stores `value` under `prefix`, replacing any previous value.
    pub fn upsert(&mut self, prefix: Prefix, value: V) -> Option<V> {
        let id = self.materialize(&prefix);
        let prev = self.put_value(id, prefix.family(), value);
        debug!(
            "[UPSERT] prefix={} replaced={} nodes={}",
            prefix,
            prev.is_some(),
            self.node_count()
        );
        prev
    }

    /// Stores `value` only if `prefix` holds nothing yet.
    ///
    /// On collision the tree is left exactly as it was: the existence check
    /// only walks existing nodes and materialisation happens after it.
    pub fn insert_if_absent(&mut self, prefix: Prefix, value: V) -> Result<(), Error> {
        if let Some(id) = self.find(&prefix) {
            if self.node(id).value.is_some() {
                debug!("[ADD] prefix={} already present", prefix);
                return Err(Error::AlreadyPresent(prefix));
            }
        }
        let id = self.materialize(&prefix);
        self.put_value(id, prefix.family(), value);
        debug!("[ADD] prefix={} nodes={}", prefix, self.node_count());
        Ok(())
    }

    /// Replaces the value of an already stored `prefix`. Never creates nodes.
    pub fn update_if_present(&mut self, prefix: Prefix, value: V) -> Result<V, Error> {
        let id = match self.find(&prefix) {
            Some(id) if self.node(id).value.is_some() => id,
            _ => {
                debug!("[SET] prefix={} not present", prefix);
                return Err(Error::NotPresent(prefix));
            }
        };
        match self.put_value(id, prefix.family(), value) {
            Some(prev) => {
                debug!("[SET] prefix={}", prefix);
                Ok(prev)
            }
            None => unreachable!("value checked under the same write lock"),
        }
    }

    /// Removes `prefix`'s value and prunes the branch that only existed for it.
    pub fn delete(&mut self, prefix: Prefix) -> Result<V, Error> {
        let id = self.find(&prefix).ok_or(Error::NotPresent(prefix))?;
        let value = match self.take_value(id) {
            Some(v) => v,
            None => {
                debug!("[DELETE] prefix={} has a node but no value", prefix);
                return Err(Error::NotPresent(prefix));
            }
        };
        let pruned = self.prune_from(id);
        debug!(
            "[DELETE] prefix={} pruned={} nodes={}",
            prefix,
            pruned,
            self.node_count()
        );
        Ok(value)
    }

    /// Unlinks `id` and each ancestor that is left valueless and childless,
    /// stopping at the first one still in use or at the root.
    fn prune_from(&mut self, id: NodeId) -> usize {
        let mut cur = id;
        let mut pruned = 0;
        while !cur.is_root() && self.node(cur).is_dead() {
            #[cfg(feature = "trace")]
            trace!("[PRUNE] unlinking node {}", cur.index());
            cur = self.detach(cur);
            pruned += 1;
        }
        if cur.is_root() && self.is_empty() && !self.root().has_children() {
            // back to the pristine empty state
            self.node_mut(NodeId::ROOT).family = Default::default();
        }
        pruned
    }

    /// Empties the trie.
    pub fn clear(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Family;

    fn v4(o: [u8; 4], len: u8) -> Prefix {
        Prefix::v4(o, len).unwrap()
    }

    #[test]
    fn upsert_creates_one_node_per_bit() {
        let mut t = Tree::default();
        assert_eq!(t.upsert(v4([10, 0, 0, 0], 8), 1), None);
        assert_eq!(t.node_count(), 9);
        assert_eq!(t.upsert(v4([10, 0, 0, 0], 8), 2), Some(1));
        assert_eq!(t.node_count(), 9);
        assert_eq!(t.root().family, Family::V4);
    }

    #[test]
    fn failed_add_leaves_no_trace() {
        let mut t = Tree::default();
        t.insert_if_absent(v4([10, 0, 0, 0], 8), "a").unwrap();
        let before = t.node_count();
        let err = t.insert_if_absent(v4([10, 0, 0, 0], 8), "b").unwrap_err();
        assert_eq!(err, Error::AlreadyPresent(v4([10, 0, 0, 0], 8)));
        assert_eq!(t.node_count(), before);
        assert_eq!(t.node(t.find(&v4([10, 0, 0, 0], 8)).unwrap()).value, Some("a"));
    }

    #[test]
    fn delete_prunes_to_branch_point() {
        let mut t = Tree::default();
        t.upsert(v4([10, 0, 0, 0], 8), 'a');
        t.upsert(v4([10, 1, 0, 0], 16), 'b');
        let with_both = t.node_count();
        assert_eq!(with_both, 1 + 8 + 8);
        assert_eq!(t.delete(v4([10, 1, 0, 0], 16)), Ok('b'));
        assert_eq!(t.node_count(), 9);
        assert_eq!(t.delete(v4([10, 0, 0, 0], 8)), Ok('a'));
        assert_eq!(t.node_count(), 1);
        assert_eq!(t.root().family, Family::Unset);
    }

    #[test]
    fn delete_of_inner_node_keeps_descendants() {
        let mut t = Tree::default();
        t.upsert(v4([10, 0, 0, 0], 8), 'a');
        t.upsert(v4([10, 1, 0, 0], 16), 'b');
        let n = t.node_count();
        t.delete(v4([10, 0, 0, 0], 8)).unwrap();
        assert_eq!(t.node_count(), n);
        assert!(t.find(&v4([10, 0, 0, 0], 8)).is_some());
    }

    #[test]
    fn misses_do_not_mutate() {
        let mut t: Tree<u8> = Tree::default();
        t.upsert(v4([10, 0, 0, 0], 16), 1);
        let n = t.node_count();
        assert!(matches!(t.delete(v4([10, 0, 0, 0], 8)), Err(Error::NotPresent(_))));
        assert!(matches!(
            t.update_if_present(v4([10, 0, 0, 0], 24), 2),
            Err(Error::NotPresent(_))
        ));
        assert_eq!(t.node_count(), n);
    }
}
