//! # Callback Registry
//!
//! Dual-indexed store of pending reply callbacks.
//!
//! Flow:
//! 1. The send path calls `register()` with the stamped id and a TTL
//! 2. The dispatcher calls `resolve()` when a reply carries that id
//! 3. Expired entries are removed by the sweep that runs inside every
//!    `resolve()`, by an explicit `purge_expired()` call, or by the
//!    background [`purge_task`]
//!
//! Both indexes (id-keyed and deadline-ordered) live behind one exclusive
//! lock; every operation updates them together, so they always hold the
//! same set of live entries. The lock is never held across a handler
//! invocation: `resolve` hands the handler back to the caller, which fires
//! it after the lock is released. A fired callback may therefore re-enter
//! the registry without deadlock.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::entities::{PendingCallback, ReplyCallback};

/// The two registry indexes, always mutated together under the lock.
#[derive(Default)]
struct RegistryIndexes {
    /// Correlation id -> pending callback.
    by_id: HashMap<String, PendingCallback>,
    /// `(expires_at, id)` pairs ordered by deadline, earliest first.
    by_deadline: BTreeSet<(u64, String)>,
}

/// Statistics for the callback registry.
#[derive(Debug, Default)]
pub struct RegistryStats {
    /// Total callbacks registered.
    pub registered: AtomicU64,
    /// Total callbacks consumed by a matching reply.
    pub resolved: AtomicU64,
    /// Total callbacks removed by an expiry sweep.
    pub purged: AtomicU64,
    /// Total callbacks replaced by a re-registration of the same id.
    pub overwritten: AtomicU64,
}

/// Dual-indexed TTL'd store of pending reply callbacks.
///
/// For any single id, resolution and expiry are mutually exclusive: the
/// lock guarantees exactly one of "consumed by reply" or "removed by sweep"
/// happens for a given entry, never both.
pub struct CallbackRegistry {
    indexes: Mutex<RegistryIndexes>,
    stats: RegistryStats,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            indexes: Mutex::new(RegistryIndexes::default()),
            stats: RegistryStats::default(),
        }
    }

    /// Registers `handler` for `id`, kept alive for `ttl_ms` milliseconds.
    ///
    /// A zero TTL registers nothing; callers that need a callback to fire
    /// must pass a positive TTL. Re-registering an id that is already
    /// pending overwrites the previous entry in both indexes.
    pub fn register(&self, id: &str, handler: ReplyCallback, ttl_ms: u64) {
        if ttl_ms == 0 {
            debug!(id, "Zero TTL, callback not registered");
            return;
        }
        let expires_at = Self::now_ms().saturating_add(ttl_ms);

        let indexes = &mut *self.indexes.lock();
        let pending = PendingCallback::new(id, expires_at, handler);
        if let Some(stale) = indexes.by_id.insert(id.to_string(), pending) {
            indexes.by_deadline.remove(&stale.deadline_key());
            self.stats.overwritten.fetch_add(1, Ordering::Relaxed);
            warn!(id, "Pending callback overwritten by re-registration");
        }
        indexes.by_deadline.insert((expires_at, id.to_string()));
        self.stats.registered.fetch_add(1, Ordering::Relaxed);

        debug!(id, expires_at, "Registered pending callback");
    }

    /// Removes and returns the pending callback for `id`.
    ///
    /// Runs an expiry sweep first, under the same lock acquisition, so an
    /// entry whose deadline has passed is never handed out even when no
    /// timer ran. The caller invokes the returned handler after the lock is
    /// released.
    pub fn resolve(&self, id: &str) -> Option<ReplyCallback> {
        let now = Self::now_ms();

        let indexes = &mut *self.indexes.lock();
        Self::sweep(indexes, now, &self.stats);

        let PendingCallback {
            id: stored_id,
            expires_at,
            handler,
        } = indexes.by_id.remove(id)?;
        indexes.by_deadline.remove(&(expires_at, stored_id));
        self.stats.resolved.fetch_add(1, Ordering::Relaxed);

        debug!(id, "Resolved pending callback");
        Some(handler)
    }

    /// Removes every entry whose deadline is at or before `now_ms`.
    ///
    /// Returns the number of entries removed. Callable standalone (e.g. on
    /// a timer); cost is bounded by the number of actually-expired entries,
    /// not the registry size.
    pub fn purge_expired(&self, now_ms: u64) -> usize {
        let indexes = &mut *self.indexes.lock();
        Self::sweep(indexes, now_ms, &self.stats)
    }

    /// Removes the entry for `id` without counting it as resolved.
    ///
    /// Used by the send path to roll back a registration when the
    /// transport send fails and no reply can ever arrive.
    pub(crate) fn unregister(&self, id: &str) -> Option<ReplyCallback> {
        let indexes = &mut *self.indexes.lock();
        let PendingCallback {
            id: stored_id,
            expires_at,
            handler,
        } = indexes.by_id.remove(id)?;
        indexes.by_deadline.remove(&(expires_at, stored_id));
        debug!(id, "Rolled back pending callback");
        Some(handler)
    }

    /// Pops expired entries off the front of the deadline index.
    ///
    /// The minimum element is inspected repeatedly; the loop stops at the
    /// first entry whose deadline is still in the future.
    fn sweep(indexes: &mut RegistryIndexes, now_ms: u64, stats: &RegistryStats) -> usize {
        let mut removed = 0;
        while let Some(&(deadline, _)) = indexes.by_deadline.first() {
            if deadline > now_ms {
                break;
            }
            if let Some((_, id)) = indexes.by_deadline.pop_first() {
                indexes.by_id.remove(&id);
                stats.purged.fetch_add(1, Ordering::Relaxed);
                removed += 1;
                debug!(id = %id, deadline, "Purged expired callback");
            }
        }
        removed
    }

    /// Number of currently pending callbacks.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.indexes.lock().by_id.len()
    }

    /// Whether no callbacks are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.lock().by_id.is_empty()
    }

    /// Whether a callback is pending for `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.indexes.lock().by_id.contains_key(id)
    }

    /// The absolute deadline for `id`, if pending.
    #[must_use]
    pub fn deadline(&self, id: &str) -> Option<u64> {
        self.indexes.lock().by_id.get(id).map(|p| p.expires_at)
    }

    /// Registry statistics.
    #[must_use]
    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    /// The ids currently held by each index, for consistency checks.
    ///
    /// The first vector holds the id-keyed index's keys, the second the ids
    /// in the deadline index, both unsorted.
    #[must_use]
    pub fn index_ids(&self) -> (Vec<String>, Vec<String>) {
        let indexes = self.indexes.lock();
        let by_id = indexes.by_id.keys().cloned().collect();
        let by_deadline = indexes.by_deadline.iter().map(|(_, id)| id.clone()).collect();
        (by_id, by_deadline)
    }

    /// Current wall-clock time in milliseconds: the clock deadlines are
    /// measured against. Standalone `purge_expired` callers pass this.
    #[must_use]
    pub fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task that sweeps the registry on a timer.
///
/// Replies already sweep on every `resolve`; this task bounds the lifetime
/// of callbacks whose ids are never echoed back at all.
pub async fn purge_task(registry: Arc<CallbackRegistry>, interval: Duration) {
    let mut purge_interval = tokio::time::interval(interval);
    purge_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        purge_interval.tick().await;
        let removed = registry.purge_expired(CallbackRegistry::now_ms());
        if removed > 0 {
            debug!(removed, "Purged expired callbacks on timer");
        }
    }
}
