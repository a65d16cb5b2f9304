//! Inbound ports (API) for the correlation client.

use crate::domain::ReplyCallback;
use crate::events::ClientError;
use stanza_types::Stanza;

/// Outbound send API.
pub trait StanzaSender: Send + Sync {
    /// Sends a stanza, stamping a fresh correlation id if it carries none.
    ///
    /// Returns the id the stanza went out with.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] when no session is bound;
    /// [`ClientError::Transport`] when the bound session fails to send.
    fn send(&self, stanza: Stanza) -> Result<String, ClientError>;

    /// As [`StanzaSender::send`], additionally registering `callback` for
    /// the stanza's id for `ttl_ms` milliseconds.
    ///
    /// A zero TTL sends without registering anything; callers that rely on
    /// the callback firing must pass a positive TTL.
    ///
    /// # Errors
    ///
    /// As [`StanzaSender::send`]. On a transport failure the registration
    /// is rolled back and the callback is dropped un-invoked.
    fn send_with_callback(
        &self,
        stanza: Stanza,
        callback: ReplyCallback,
        ttl_ms: u64,
    ) -> Result<String, ClientError>;
}

/// Inbound dispatch entry point, driven by the transport binding.
pub trait InboundDispatch: Send + Sync {
    /// Delivers one inbound stanza to the correlation logic and then to
    /// every registered listener. Never fails; listener failures are
    /// contained and reported through logs.
    fn dispatch(&self, stanza: &Stanza);
}
