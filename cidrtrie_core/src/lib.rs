pub mod arena;
pub mod constants;
pub mod errors;
pub mod helpers;
pub mod mutation;
pub mod path;
pub mod prefix;
pub mod query;
pub mod telemetry;
pub mod types;

pub use crate::arena::Tree;
pub use crate::errors::Error;
pub use crate::prefix::Prefix;
pub use crate::query::NodeRef;
pub use crate::types::{Family, Match, NodeId};

use constants::DEFAULT_CAPACITY;
use log::{debug, info};
use metrics::{counter, gauge};
use once_cell::sync::OnceCell;
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

/// Thread-safe prefix trie: one reader-writer lock guards the whole tree.
///
/// Every mutation holds the write lock from its first path step to its last
/// write; every query holds the read lock until its result is built. Clone
/// the `Arc` around it to share between threads.
pub struct PrefixTrie<V> {
    inner: RwLock<Tree<V>>,
}

/// Shared-lock view of a trie. All `Tree` queries and node handles are
/// available through `Deref`; writers wait until it is dropped.
pub struct Snapshot<'a, V> {
    guard: RwLockReadGuard<'a, Tree<V>>,
}

impl<V> Deref for Snapshot<'_, V> {
    type Target = Tree<V>;

    fn deref(&self) -> &Tree<V> {
        &self.guard
    }
}

impl<V> Default for PrefixTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for PrefixTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.inner.read();
        f.debug_struct("PrefixTrie")
            .field("prefixes", &t.len())
            .field("nodes", &t.node_count())
            .finish()
    }
}

impl<V> PrefixTrie<V> {
    // ---- logging bootstraper -------------------------------------------------
    fn ensure_logging() {
        static INIT: OnceCell<()> = OnceCell::new();
        INIT.get_or_init(|| {
            let _ = env_logger::builder()
                .is_test(std::env::var("RUST_TEST_THREADS").is_ok())
                .try_init();
        });
    }

    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` pre-sizes the node arena; it is not a limit.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::ensure_logging();
        telemetry::init();
        Self {
            inner: RwLock::new(Tree::with_capacity(capacity)),
        }
    }

    fn report(tree: &Tree<V>) {
        gauge!("cidrtrie_nodes").set(tree.node_count() as f64);
        gauge!("cidrtrie_prefixes").set(tree.len() as f64);
    }

    fn rejected<T>(res: Result<T, Error>) -> Result<T, Error> {
        if res.is_err() {
            counter!("cidrtrie_rejected_total").increment(1);
        }
        res
    }

    /// Insert or overwrite. Returns the value it replaced.
    pub fn upsert(&self, prefix: Prefix, value: V) -> Option<V> {
        counter!("cidrtrie_upserts_total").increment(1);
        let mut tree = self.inner.write();
        let prev = tree.upsert(prefix, value);
        Self::report(&tree);
        prev
    }

    /// Insert only when `prefix` holds no value; `AlreadyPresent` otherwise.
    pub fn insert_if_absent(&self, prefix: Prefix, value: V) -> Result<(), Error> {
        counter!("cidrtrie_upserts_total").increment(1);
        let mut tree = self.inner.write();
        let res = tree.insert_if_absent(prefix, value);
        Self::report(&tree);
        Self::rejected(res)
    }

    /// Overwrite only when `prefix` already holds a value; `NotPresent` otherwise.
    pub fn update_if_present(&self, prefix: Prefix, value: V) -> Result<V, Error> {
        counter!("cidrtrie_upserts_total").increment(1);
        let res = self.inner.write().update_if_present(prefix, value);
        Self::rejected(res)
    }

    /// Applies every pair under a single write lock.
    pub fn bulk_upsert<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = (Prefix, V)>,
    {
        let mut tree = self.inner.write();
        let mut n = 0;
        for (p, v) in items {
            tree.upsert(p, v);
            n += 1;
        }
        counter!("cidrtrie_upserts_total").increment(n as u64);
        debug!("[BULK] applied {} upserts", n);
        Self::report(&tree);
        n
    }

    /// Removes `prefix` and prunes its dead branch. Returns the removed value.
    pub fn delete(&self, prefix: Prefix) -> Result<V, Error> {
        counter!("cidrtrie_deletes_total").increment(1);
        let mut tree = self.inner.write();
        let res = tree.delete(prefix);
        Self::report(&tree);
        Self::rejected(res)
    }

    /// Clears the entire tree.
    pub fn clear(&self) {
        counter!("cidrtrie_clears_total").increment(1);
        let mut tree = self.inner.write();
        let dropped = tree.len();
        tree.clear();
        Self::report(&tree);
        info!("[CLEAR] Tree cleared ({} prefixes dropped).", dropped);
    }

    /// Holds the shared lock until the returned snapshot is dropped.
    pub fn read(&self) -> Snapshot<'_, V> {
        Snapshot {
            guard: self.inner.read(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }

    /// Longest-prefix-match test: is `prefix` covered by any stored key?
    pub fn contains(&self, prefix: &Prefix) -> bool {
        counter!("cidrtrie_lookups_total").increment(1);
        self.inner.read().contains(prefix)
    }

    /// Is `prefix` itself a stored key?
    pub fn has_key(&self, prefix: &Prefix) -> bool {
        counter!("cidrtrie_lookups_total").increment(1);
        self.inner.read().has_key(prefix)
    }

    pub fn keys(&self) -> Vec<Prefix> {
        self.inner.read().entries().into_iter().map(|(k, _)| k).collect()
    }
}

impl<V: Clone> PrefixTrie<V> {
    /// Exact-match lookup.
    pub fn get(&self, prefix: &Prefix) -> Option<V> {
        counter!("cidrtrie_lookups_total").increment(1);
        self.inner.read().exact(prefix).cloned()
    }

    /// Longest-prefix-match lookup.
    pub fn longest_match(&self, prefix: &Prefix) -> Option<Match<V>> {
        counter!("cidrtrie_lookups_total").increment(1);
        let tree = self.inner.read();
        tree.longest_match(prefix)
            .map(|(k, v)| Match::new(k, v.clone()))
    }

    pub fn entries(&self) -> Vec<(Prefix, V)> {
        owned(self.inner.read().entries())
    }

    pub fn values(&self) -> Vec<V> {
        self.inner
            .read()
            .entries()
            .into_iter()
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn to_map(&self) -> HashMap<Prefix, V> {
        self.inner
            .read()
            .entries()
            .into_iter()
            .map(|(k, v)| (k, v.clone()))
            .collect()
    }

    /// Stored keys at or below `prefix` (which need not be stored itself).
    pub fn subtree(&self, prefix: &Prefix) -> Vec<(Prefix, V)> {
        owned(self.inner.read().subtree(prefix))
    }

    /// Nearest stored strict ancestor of `prefix`'s node.
    pub fn valued_ancestor(&self, prefix: &Prefix) -> Option<Match<V>> {
        self.inner
            .read()
            .valued_ancestor(prefix)
            .map(|(k, v)| Match::new(k, v.clone()))
    }
}

fn owned<V: Clone>(entries: Vec<(Prefix, &V)>) -> Vec<(Prefix, V)> {
    entries.into_iter().map(|(k, v)| (k, v.clone())).collect()
}
