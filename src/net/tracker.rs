//! In-flight listing stream tracking.
//!
//! # Responsibilities
//! - Generate unique listing IDs for tracing
//! - Count listing streams whose producer is still running
//! - Let the lifecycle coordinator report what it is draining

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::observability::metrics;

/// Global atomic counter for listing IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static LISTING_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a listing stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListingId(u64);

impl ListingId {
    /// Generate a new unique listing ID.
    pub fn new() -> Self {
        Self(LISTING_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ListingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listing-{}", self.0)
    }
}

/// Counts active listing streams.
#[derive(Debug, Clone, Default)]
pub struct ActivityTracker {
    active_count: Arc<AtomicU64>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new active stream. Returns a guard that decrements on drop.
    pub fn track(&self) -> ActivityGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        metrics::set_active_listings(self.active_count());
        let id = ListingId::new();
        tracing::trace!(listing_id = %id, "Listing started");
        ActivityGuard {
            active_count: Arc::clone(&self.active_count),
            id,
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }
}

/// Guard that tracks a listing stream's lifetime.
#[derive(Debug)]
pub struct ActivityGuard {
    active_count: Arc<AtomicU64>,
    id: ListingId,
}

impl ActivityGuard {
    pub fn id(&self) -> ListingId {
        self.id
    }
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        let remaining = self.active_count.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_active_listings(remaining);
        tracing::trace!(listing_id = %self.id, "Listing finished");
    }
}
