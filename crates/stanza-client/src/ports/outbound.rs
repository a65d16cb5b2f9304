//! Outbound ports (SPI) for the correlation client.

use std::sync::Arc;

use stanza_types::{Stanza, TransportError};

/// The transport channel a bound session exposes.
///
/// Implementations own the wire: encoding, framing, and delivery. The
/// client only needs the one send primitive.
pub trait TransportSession: Send + Sync {
    /// Sends a single stanza.
    fn send(&self, stanza: &Stanza) -> Result<(), TransportError>;
}

/// Observer for session lifecycle changes.
pub trait SessionBindListener: Send + Sync {
    /// A session was bound and is now the active send target.
    fn on_connect(&self, session: &Arc<dyn TransportSession>);

    /// The active session was lost. Pending callbacks are unaffected; they
    /// expire on their own TTL schedule.
    fn on_disconnect(&self);
}
