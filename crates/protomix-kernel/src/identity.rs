//! Identity-keyed side table.
//!
//! Associates a record with an object by reference identity without writing
//! anything onto the object. Keys are held weakly: once every strong handle
//! to a key object is gone its entry is dead, and the next `purge` (run on
//! every record creation) drops it.
//!
//! Entries are indexed by record address. A live weak handle pins the
//! address, so an address cannot be reused while its entry exists.

use crate::value::{Object, WeakObject};
use std::collections::HashMap;

struct Entry<R> {
    key: WeakObject,
    record: R,
}

/// Side table from object identity to a record of type `R`.
pub struct IdentityStore<R> {
    entries: HashMap<usize, Entry<R>>,
}

impl<R: Default> IdentityStore<R> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Run `f` on the record for `identity`, creating an empty record on
    /// first sight.
    pub fn with_record<T>(&mut self, identity: &Object, f: impl FnOnce(&mut R) -> T) -> T {
        let addr = identity.addr();
        if !self.entries.contains_key(&addr) {
            self.purge();
            tracing::trace!(addr, "identity record created");
        }
        let entry = self.entries.entry(addr).or_insert_with(|| Entry {
            key: identity.downgrade(),
            record: R::default(),
        });
        f(&mut entry.record)
    }

    /// Read-only access; `None` when `identity` has no record yet.
    pub fn peek<T>(&self, identity: &Object, f: impl FnOnce(&R) -> T) -> Option<T> {
        self.entries
            .get(&identity.addr())
            .filter(|entry| entry.key.is_live())
            .map(|entry| f(&entry.record))
    }

    pub fn contains(&self, identity: &Object) -> bool {
        self.peek(identity, |_| ()).is_some()
    }

    /// Drop entries whose key object is gone. Returns how many were dropped.
    pub fn purge(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.key.is_live());
        let dropped = before - self.entries.len();
        if dropped > 0 {
            tracing::trace!(dropped, "identity records purged");
        }
        dropped
    }

    /// Number of entries whose key is still reachable.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.key.is_live())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Default> Default for IdentityStore<R> {
    fn default() -> Self {
        Self::new()
    }
}
