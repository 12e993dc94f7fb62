//! Text front-end for `cidrtrie_core`.
//!
//! Keys are written either as a bare address (`8.8.8.8`, `2001:db8::1`),
//! which stands for the single-address prefix, or in `address/length`
//! notation. Results are always formatted as `address/length`.

pub mod parse;

pub use crate::parse::{format, is_cidr, parse, parse_with_notation, Notation};
pub use cidrtrie_core::Error;

use cidrtrie_core::PrefixTrie;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// String-keyed trie. Cheap to clone; clones share the same tree.
pub struct CidrTrie<V> {
    inner: Arc<PrefixTrie<V>>,
}

impl<V> Clone for CidrTrie<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for CidrTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CidrTrie<V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PrefixTrie::new()),
        }
    }

    /// Wrap a trie that other code also holds.
    pub fn from_shared(inner: Arc<PrefixTrie<V>>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<PrefixTrie<V>> {
        &self.inner
    }

    /// Insert any CIDR (`1.2.3.0/24`, `2001:db8::/32`, …) or address,
    /// overwriting what was there.
    pub fn insert(&self, cidr: &str, value: V) -> Result<Option<V>, Error> {
        let p = parse(cidr)?;
        Ok(self.inner.upsert(p, value))
    }

    /// Overwrite only an already stored key.
    pub fn set(&self, cidr: &str, value: V) -> Result<V, Error> {
        let p = parse(cidr)?;
        self.inner.update_if_present(p, value)
    }

    /// Insert only a key that is not stored yet.
    pub fn add(&self, cidr: &str, value: V) -> Result<(), Error> {
        let p = parse(cidr)?;
        self.inner.insert_if_absent(p, value)
    }

    /// Remove an exact stored prefix.
    pub fn delete(&self, cidr: &str) -> Result<V, Error> {
        let p = parse(cidr)?;
        self.inner.delete(p)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Is the address or prefix covered by any stored key?
    pub fn contains(&self, cidr: &str) -> Result<bool, Error> {
        Ok(self.inner.contains(&parse(cidr)?))
    }

    /// Is it a stored key itself?
    pub fn has_key(&self, cidr: &str) -> Result<bool, Error> {
        Ok(self.inner.has_key(&parse(cidr)?))
    }

    /// Longest stored prefix covering `cidr`, formatted.
    pub fn get_key(&self, cidr: &str) -> Result<Option<String>, Error> {
        let p = parse(cidr)?;
        Ok(self.inner.read().longest_match(&p).map(|(k, _)| format(&k)))
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.keys().iter().map(format).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<V: Clone> CidrTrie<V> {
    /// Value of the longest stored prefix covering `cidr`.
    pub fn get(&self, cidr: &str) -> Result<Option<V>, Error> {
        let p = parse(cidr)?;
        Ok(self.inner.longest_match(&p).map(|m| m.value))
    }

    /// Key and value of the longest stored prefix covering `cidr`.
    pub fn get_kv(&self, cidr: &str) -> Result<Option<(String, V)>, Error> {
        let p = parse(cidr)?;
        Ok(self
            .inner
            .longest_match(&p)
            .map(|m| (format(&m.prefix), m.value)))
    }

    /// Value stored at exactly `cidr`, no covering match.
    pub fn get_exact(&self, cidr: &str) -> Result<Option<V>, Error> {
        let p = parse(cidr)?;
        Ok(self.inner.get(&p))
    }

    pub fn values(&self) -> Vec<V> {
        self.inner.values()
    }

    pub fn to_map(&self) -> HashMap<String, V> {
        self.inner
            .entries()
            .into_iter()
            .map(|(k, v)| (format(&k), v))
            .collect()
    }

    /// The longest stored prefix covering `cidr` and every stored key below
    /// it, pre-order. Empty when nothing covers `cidr`.
    pub fn children(&self, cidr: &str) -> Result<Vec<(String, V)>, Error> {
        let p = parse(cidr)?;
        let snap = self.inner.read();
        let Some(node) = snap.locate(&p) else {
            debug!("[CHILDREN] nothing covers {}", p);
            return Ok(Vec::new());
        };
        let out = node
            .descendants()
            .into_iter()
            .map(|(k, v)| (format(&k), v.clone()))
            .collect();
        Ok(out)
    }

    /// Nearest stored strict ancestor of the longest stored prefix covering
    /// `cidr`.
    pub fn parent(&self, cidr: &str) -> Result<Option<(String, V)>, Error> {
        let p = parse(cidr)?;
        let snap = self.inner.read();
        let found = snap
            .locate(&p)
            .and_then(|n| n.valued_ancestor())
            .and_then(|n| n.entry())
            .map(|(k, v)| (format(&k), v.clone()));
        Ok(found)
    }

    /// Stored keys at or below `cidr`'s exact node.
    pub fn subtree(&self, cidr: &str) -> Result<Vec<(String, V)>, Error> {
        let p = parse(cidr)?;
        Ok(self
            .inner
            .subtree(&p)
            .into_iter()
            .map(|(k, v)| (format(&k), v))
            .collect())
    }
}
