//! Error types for the correlation client.

use stanza_types::TransportError;
use thiserror::Error;

/// Correlation client errors.
///
/// Registry and chain operations never produce these; only the
/// transport-facing send path fails.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No transport session has been bound.
    #[error("No transport session bound")]
    NotConnected,

    /// The bound session failed to send.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
