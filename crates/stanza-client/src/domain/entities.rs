//! # Core Domain Entities
//!
//! Defines the stored shapes of the two collections the client maintains:
//! pending reply callbacks and registered stanza listeners.
//!
//! ## Entities
//!
//! - [`PendingCallback`]: One TTL'd reply handler awaiting its reply
//! - [`ListenerEntry`]: One chain registration, bare or filter-scoped
//! - [`StanzaListener`] / [`StanzaFilter`]: The observer traits stored in
//!   the chain

use std::fmt;
use std::sync::Arc;

use stanza_types::Stanza;

/// A reply handler.
///
/// Invoked at most once, with the matched reply stanza. Expiry never
/// invokes the handler; it only removes it.
pub type ReplyCallback = Box<dyn FnOnce(&Stanza) + Send + 'static>;

/// Observer for inbound stanzas.
///
/// Every listener in the chain sees every dispatched stanza (subject to its
/// filter). Implemented for any `Fn(&Stanza)` closure.
pub trait StanzaListener: Send + Sync {
    /// Called once per dispatched stanza.
    fn on_stanza(&self, stanza: &Stanza);
}

impl<F> StanzaListener for F
where
    F: Fn(&Stanza) + Send + Sync,
{
    fn on_stanza(&self, stanza: &Stanza) {
        self(stanza);
    }
}

/// Predicate scoping a listener to a subset of inbound stanzas.
///
/// Implemented for any `Fn(&Stanza) -> bool` closure.
pub trait StanzaFilter: Send + Sync {
    /// Whether the paired listener should observe this stanza.
    fn accept(&self, stanza: &Stanza) -> bool;
}

impl<F> StanzaFilter for F
where
    F: Fn(&Stanza) -> bool + Send + Sync,
{
    fn accept(&self, stanza: &Stanza) -> bool {
        self(stanza)
    }
}

/// A pending reply callback awaiting its correlated reply.
///
/// Lifecycle: created at registration time; consumed by a matching reply or
/// removed by an expiry sweep; never mutated in between.
pub struct PendingCallback {
    /// Correlation identifier, unique among pending callbacks.
    pub id: String,
    /// Absolute wall-clock deadline in milliseconds.
    pub expires_at: u64,
    /// The handler, invoked at most once with the matched reply.
    pub handler: ReplyCallback,
}

impl PendingCallback {
    /// Creates a new pending callback.
    pub fn new(id: impl Into<String>, expires_at: u64, handler: ReplyCallback) -> Self {
        Self {
            id: id.into(),
            expires_at,
            handler,
        }
    }

    /// The `(deadline, id)` key this entry occupies in the TTL index.
    ///
    /// The id tiebreak keeps entries with identical deadlines distinct in
    /// the sorted index.
    #[must_use]
    pub fn deadline_key(&self) -> (u64, String) {
        (self.expires_at, self.id.clone())
    }
}

impl fmt::Debug for PendingCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCallback")
            .field("id", &self.id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// One registration in the listener chain.
///
/// Equality is identity-based: removal matches on the listener pointer, and
/// on the filter pointer when one was registered. Two registrations of
/// behaviorally identical closures are still distinct entries.
#[derive(Clone)]
pub struct ListenerEntry {
    filter: Option<Arc<dyn StanzaFilter>>,
    listener: Arc<dyn StanzaListener>,
}

impl ListenerEntry {
    /// Creates an unfiltered (permanent) registration.
    pub fn bare(listener: Arc<dyn StanzaListener>) -> Self {
        Self {
            filter: None,
            listener,
        }
    }

    /// Creates a filter-scoped registration.
    pub fn filtered(filter: Arc<dyn StanzaFilter>, listener: Arc<dyn StanzaListener>) -> Self {
        Self {
            filter: Some(filter),
            listener,
        }
    }

    /// Whether this entry's listener should observe the stanza.
    #[must_use]
    pub fn accepts(&self, stanza: &Stanza) -> bool {
        match &self.filter {
            Some(filter) => filter.accept(stanza),
            None => true,
        }
    }

    /// The registered listener.
    #[must_use]
    pub fn listener(&self) -> &Arc<dyn StanzaListener> {
        &self.listener
    }

    /// Identity match for removal.
    ///
    /// A `None` filter argument matches only bare registrations; it never
    /// matches a filtered one. A `Some` filter requires both the filter and
    /// the listener pointers to match.
    #[must_use]
    pub fn matches(
        &self,
        filter: Option<&Arc<dyn StanzaFilter>>,
        listener: &Arc<dyn StanzaListener>,
    ) -> bool {
        let listener_matches = Arc::ptr_eq(&self.listener, listener);
        match (filter, &self.filter) {
            (None, None) => listener_matches,
            (Some(wanted), Some(registered)) => {
                listener_matches && Arc::ptr_eq(wanted, registered)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("filtered", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}
