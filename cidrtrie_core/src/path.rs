//! Path codec: prefix <-> root-to-node bit sequence.

use crate::arena::Tree;
use crate::helpers::{get_bit, set_bit};
use crate::prefix::Prefix;
use crate::types::{Family, NodeId};

/// Traversal bits of a prefix, most significant first.
#[derive(Debug, Clone)]
pub struct PathBits {
    bits: u128,
    pos: u8,
    len: u8,
}

impl Iterator for PathBits {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.pos >= self.len {
            return None;
        }
        let b = get_bit(self.bits, self.pos);
        self.pos += 1;
        Some(b)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.len - self.pos) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for PathBits {}

pub fn path_bits(prefix: &Prefix) -> PathBits {
    PathBits {
        bits: prefix.bits(),
        pos: 0,
        len: prefix.prefix_len(),
    }
}

/// Key bits of the child reached from a node at `depth` through `bit`.
#[inline]
pub fn descend(bits: u128, depth: u8, bit: u8) -> u128 {
    set_bit(bits, depth, bit)
}

/// Rebuilds the key a node stands for from its chain of parent links.
///
/// Returns `None` when the node carries no family (only possible for the
/// root of a trie that was never written to).
pub fn own_prefix<V>(tree: &Tree<V>, id: NodeId) -> Option<Prefix> {
    let family = tree.node(id).family;
    if !family.is_set() {
        return None;
    }
    let depth = tree.depth(id);
    let mut bits = 0u128;
    let mut pos = depth;
    let mut cur = id;
    while let Some((parent, bit)) = tree.slot_of(cur) {
        pos -= 1;
        bits = set_bit(bits, pos, bit);
        cur = parent;
    }
    debug_assert_eq!(pos, 0);
    Prefix::new(family, bits, depth).ok()
}

/// Key for a valued node whose bits and depth are already known.
pub(crate) fn stored_prefix(family: Family, bits: u128, depth: u8) -> Prefix {
    match Prefix::new(family, bits, depth) {
        Ok(p) => p,
        Err(e) => panic!("stored node at depth {depth} has no valid key: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_follow_address_order() {
        let p = Prefix::v4([0b1010_0000, 0, 0, 0], 4).unwrap();
        let bits: Vec<u8> = path_bits(&p).collect();
        assert_eq!(bits, vec![1, 0, 1, 0]);
        assert_eq!(path_bits(&p).len(), 4);
    }

    #[test]
    fn zero_length_prefix_has_empty_path() {
        let p = Prefix::v6([0xff; 16], 0).unwrap();
        assert_eq!(path_bits(&p).count(), 0);
    }

    #[test]
    fn own_prefix_inverts_the_walk() {
        let target = Prefix::v4([192, 168, 4, 0], 22).unwrap();
        let mut t: Tree<()> = Tree::default();
        let mut cur = NodeId::ROOT;
        for bit in path_bits(&target) {
            cur = t.attach(cur, bit, Family::V4);
        }
        assert_eq!(own_prefix(&t, cur), Some(target));
        assert_eq!(own_prefix(&t, NodeId::ROOT), None);
    }

    #[test]
    fn descend_sets_the_next_bit() {
        let root = 0u128;
        let right = descend(root, 0, 1);
        assert_eq!(right, 1u128 << 127);
        assert_eq!(descend(right, 1, 0), right);
    }
}
