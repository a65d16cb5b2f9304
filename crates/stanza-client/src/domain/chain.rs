//! # Listener Chain
//!
//! Ordered collection of stanza observers with copy-on-write semantics.
//!
//! Reads vastly outnumber writes here: every dispatched stanza iterates the
//! chain, while listeners are added and removed rarely. The entry vector is
//! therefore kept behind an `Arc` that writers replace wholesale; a
//! dispatch takes an O(1) snapshot and iterates it without holding any
//! lock, so mutation in flight never skips, repeats, or tears an entry
//! within one dispatch.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::entities::{ListenerEntry, StanzaFilter, StanzaListener};

/// Copy-on-write chain of stanza listeners.
pub struct ListenerChain {
    entries: RwLock<Arc<Vec<ListenerEntry>>>,
}

impl ListenerChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Appends a permanent listener that observes every stanza.
    pub fn add_listener(&self, listener: Arc<dyn StanzaListener>) {
        self.push(ListenerEntry::bare(listener));
    }

    /// Appends a listener scoped to stanzas accepted by `filter`.
    pub fn add_filtered_listener(
        &self,
        filter: Arc<dyn StanzaFilter>,
        listener: Arc<dyn StanzaListener>,
    ) {
        self.push(ListenerEntry::filtered(filter, listener));
    }

    /// Removes a bare-registered listener. Returns whether it was found.
    pub fn remove_listener(&self, listener: &Arc<dyn StanzaListener>) -> bool {
        self.remove_filtered_listener(None, listener)
    }

    /// Removes the registration matching both identities.
    ///
    /// A `None` filter behaves as the bare removal: it only matches
    /// registrations made without a filter. Returns whether a matching
    /// entry was found and removed.
    pub fn remove_filtered_listener(
        &self,
        filter: Option<&Arc<dyn StanzaFilter>>,
        listener: &Arc<dyn StanzaListener>,
    ) -> bool {
        let mut entries = self.entries.write();
        let Some(position) = entries.iter().position(|e| e.matches(filter, listener)) else {
            return false;
        };

        let mut next = entries.as_ref().clone();
        next.remove(position);
        *entries = Arc::new(next);
        debug!(remaining = entries.len(), "Listener removed from chain");
        true
    }

    /// An immutable snapshot of the chain for one dispatch pass.
    ///
    /// Never blocks on writers beyond the brief pointer read, and never
    /// observes a partially mutated sequence.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<ListenerEntry>> {
        self.entries.read().clone()
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn push(&self, entry: ListenerEntry) {
        let mut entries = self.entries.write();
        let mut next = entries.as_ref().clone();
        next.push(entry);
        *entries = Arc::new(next);
        debug!(len = entries.len(), "Listener added to chain");
    }
}

impl Default for ListenerChain {
    fn default() -> Self {
        Self::new()
    }
}
