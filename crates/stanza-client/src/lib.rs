//! # Stanza Client - Request/Reply Correlation Core
//!
//! Correlates replies from a stanza-oriented transport with the requests
//! that caused them, and fans every inbound stanza out to a chain of
//! observers.
//!
//! ## Architecture Role
//!
//! ```text
//!  caller ──send_with_callback──→ [StanzaClient]
//!                                      │ stamp id, register TTL'd callback
//!                                      ↓
//!                               [TransportSession]
//!                                      │
//!                                      ↓ reply echoes the id
//!  transport ──dispatch──→ [StanzaClient] ──→ matched callback (at most once)
//!                                      │
//!                                      └──→ every chain listener (filtered)
//! ```
//!
//! ## Guarantees
//!
//! - Identifiers are unique for the lifetime of one client instance.
//! - A pending callback fires at most once, and only for a matching reply;
//!   expiry removes it without firing.
//! - Both callback indexes (by id, by deadline) stay consistent under one
//!   exclusive lock.
//! - A panicking listener never disturbs the other listeners or the
//!   dispatch caller.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

// Re-export main types
pub use domain::{
    purge_task, CallbackRegistry, ListenerChain, ListenerEntry, PendingCallback,
    RegistryStats, ReplyCallback, StanzaFilter, StanzaIdGenerator, StanzaListener,
};
pub use events::ClientError;
pub use ports::inbound::{InboundDispatch, StanzaSender};
pub use ports::outbound::{SessionBindListener, TransportSession};
pub use service::StanzaClient;
