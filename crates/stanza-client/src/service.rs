//! # Stanza Client Service
//!
//! The service composing the correlation core: identifier generator,
//! callback registry, listener chain, and the session binding.
//!
//! ## Architecture
//!
//! This service implements both inbound ports:
//! - [`StanzaSender`]: the outbound send path
//! - [`InboundDispatch`]: the per-stanza dispatch entry point
//!
//! It depends on two outbound ports (implemented by the transport binding):
//! - [`TransportSession`]: the send primitive
//! - [`SessionBindListener`]: session lifecycle observers
//!
//! ## Thread Safety
//!
//! The service is shared across threads via `Arc`. Outbound sends, inbound
//! dispatch, and timer-driven purges may all enter concurrently; every
//! piece of internal state carries its own short-lived lock, and no lock is
//! held across a callback or listener invocation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, warn};

use crate::domain::{
    CallbackRegistry, ListenerChain, ReplyCallback, StanzaFilter, StanzaIdGenerator,
    StanzaListener,
};
use crate::events::ClientError;
use crate::ports::inbound::{InboundDispatch, StanzaSender};
use crate::ports::outbound::{SessionBindListener, TransportSession};
use stanza_types::Stanza;

/// Request/reply correlation client.
///
/// The dispatcher itself is stateless between calls; all state lives in the
/// registry, the chain, and the session slot.
pub struct StanzaClient {
    /// Correlation id generator.
    ids: StanzaIdGenerator,
    /// Pending reply callbacks.
    registry: Arc<CallbackRegistry>,
    /// Stanza observers.
    listeners: ListenerChain,
    /// Session lifecycle observers.
    bind_listeners: RwLock<Vec<Arc<dyn SessionBindListener>>>,
    /// The active transport session. Replaced wholesale on connect, read by
    /// any thread.
    session: RwLock<Option<Arc<dyn TransportSession>>>,
}

impl StanzaClient {
    /// Creates a new client. `id_prefix` prefixes every generated
    /// correlation identifier.
    #[must_use]
    pub fn new(id_prefix: &str) -> Self {
        Self {
            ids: StanzaIdGenerator::new(id_prefix),
            registry: Arc::new(CallbackRegistry::new()),
            listeners: ListenerChain::new(),
            bind_listeners: RwLock::new(Vec::new()),
            session: RwLock::new(None),
        }
    }

    /// The callback registry, shared so a purge timer can hold it.
    #[must_use]
    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    /// Adds a permanent stanza listener.
    pub fn add_listener(&self, listener: Arc<dyn StanzaListener>) {
        self.listeners.add_listener(listener);
    }

    /// Adds a stanza listener scoped by `filter`.
    pub fn add_filtered_listener(
        &self,
        filter: Arc<dyn StanzaFilter>,
        listener: Arc<dyn StanzaListener>,
    ) {
        self.listeners.add_filtered_listener(filter, listener);
    }

    /// Removes a bare-registered listener. Returns whether it was found.
    pub fn remove_listener(&self, listener: &Arc<dyn StanzaListener>) -> bool {
        self.listeners.remove_listener(listener)
    }

    /// Removes the registration matching both identities; a `None` filter
    /// behaves as the bare removal.
    pub fn remove_filtered_listener(
        &self,
        filter: Option<&Arc<dyn StanzaFilter>>,
        listener: &Arc<dyn StanzaListener>,
    ) -> bool {
        self.listeners.remove_filtered_listener(filter, listener)
    }

    /// Adds a session lifecycle observer.
    pub fn add_bind_listener(&self, listener: Arc<dyn SessionBindListener>) {
        self.bind_listeners.write().push(listener);
    }

    /// Removes a session lifecycle observer by identity.
    pub fn remove_bind_listener(&self, listener: &Arc<dyn SessionBindListener>) -> bool {
        let mut listeners = self.bind_listeners.write();
        let Some(position) = listeners.iter().position(|l| Arc::ptr_eq(l, listener)) else {
            return false;
        };
        listeners.remove(position);
        true
    }

    /// Binds `session` as the active send target and notifies bind
    /// listeners.
    pub fn handle_connect(&self, session: Arc<dyn TransportSession>) {
        *self.session.write() = Some(session.clone());
        debug!("Transport session bound");

        for listener in self.bind_listener_snapshot() {
            listener.on_connect(&session);
        }
    }

    /// Notifies bind listeners that the active session was lost.
    ///
    /// Pending callbacks are left alone; they expire on their own TTL
    /// schedule. The session reference is replaced on the next connect.
    pub fn handle_disconnect(&self) {
        warn!("Transport session lost");

        for listener in self.bind_listener_snapshot() {
            listener.on_disconnect();
        }
    }

    /// Whether a session has been bound.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.read().is_some()
    }

    fn bind_listener_snapshot(&self) -> Vec<Arc<dyn SessionBindListener>> {
        self.bind_listeners.read().clone()
    }

    fn current_session(&self) -> Result<Arc<dyn TransportSession>, ClientError> {
        self.session.read().clone().ok_or(ClientError::NotConnected)
    }

    /// Returns the stanza's id, stamping a fresh one if it carries none.
    fn stamp_id(&self, stanza: &mut Stanza) -> String {
        match stanza.id() {
            Some(id) => id.to_string(),
            None => {
                let id = self.ids.next_id();
                stanza.set_id(id.clone());
                id
            }
        }
    }
}

impl StanzaSender for StanzaClient {
    fn send(&self, mut stanza: Stanza) -> Result<String, ClientError> {
        let session = self.current_session()?;
        let id = self.stamp_id(&mut stanza);

        debug!(id = %id, kind = ?stanza.kind(), "Sending stanza");
        session.send(&stanza)?;
        Ok(id)
    }

    fn send_with_callback(
        &self,
        mut stanza: Stanza,
        callback: ReplyCallback,
        ttl_ms: u64,
    ) -> Result<String, ClientError> {
        let session = self.current_session()?;
        let id = self.stamp_id(&mut stanza);

        // Register before the transport send: a reply can arrive on another
        // thread before send() returns, and it must find the callback.
        self.registry.register(&id, callback, ttl_ms);

        debug!(id = %id, ttl_ms, kind = ?stanza.kind(), "Sending stanza with reply callback");
        if let Err(e) = session.send(&stanza) {
            // Nothing went out, so no reply can ever match; drop the
            // registration without invoking the handler.
            drop(self.registry.unregister(&id));
            return Err(e.into());
        }
        Ok(id)
    }
}

impl InboundDispatch for StanzaClient {
    fn dispatch(&self, stanza: &Stanza) {
        if let Some(id) = stanza.id() {
            if let Some(handler) = self.registry.resolve(id) {
                debug!(id = %id, "Reply matched pending callback");
                handler(stanza);
            }
        }

        let snapshot = self.listeners.snapshot();
        for entry in snapshot.iter() {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                if entry.accepts(stanza) {
                    entry.listener().on_stanza(stanza);
                }
            }));
            if outcome.is_err() {
                error!(kind = ?stanza.kind(), "Stanza listener panicked during dispatch");
            }
        }
    }
}
