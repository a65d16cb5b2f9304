//! # Error Types
//!
//! Defines the transport boundary's failure vocabulary.

use thiserror::Error;

/// Errors surfaced by a transport session when sending a stanza.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The underlying link is down or the session was torn down.
    #[error("Transport link is down")]
    LinkDown,

    /// The transport rejected or failed to deliver the stanza.
    #[error("Send failed: {0}")]
    SendFailed(String),
}
