//! # Correlation Identifier Generator
//!
//! Produces the identifiers stamped on outgoing requests.
//!
//! The counter starts at a random value so that two independently started
//! clients sharing an id prefix are unlikely to collide while talking to
//! the same peer. Within one generator instance, identifiers are unique for
//! any realistic number of in-flight requests: the counter advances by
//! exactly one per call and the u64 range vastly exceeds what a session can
//! hold pending, so wraparound is permitted.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generator for correlation identifiers of the form `prefix-hexcounter`.
///
/// Never blocks and never fails; `next_id` is safe to call from any thread.
pub struct StanzaIdGenerator {
    /// Caller-supplied id prefix.
    prefix: String,
    /// Monotonically advancing counter, randomly seeded.
    counter: AtomicU64,
}

impl StanzaIdGenerator {
    /// Creates a generator with a randomized starting counter.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_seed(prefix, rand::random())
    }

    /// Creates a generator with an explicit starting counter.
    ///
    /// Used by tests that need deterministic identifiers.
    pub fn with_seed(prefix: impl Into<String>, seed: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(seed),
        }
    }

    /// Returns the next identifier: the prefix, a separator, and the
    /// counter value in lower hex.
    #[must_use]
    pub fn next_id(&self) -> String {
        let value = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{:x}", self.prefix, value)
    }

    /// The id prefix this generator was created with.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
