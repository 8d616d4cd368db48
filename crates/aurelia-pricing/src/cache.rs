//! Injectable TTL cache with get-or-refresh semantics.
//!
//! One value, one expiry. The instance is owned by whoever constructs the
//! consumer (no process-wide singleton), so tests can inject their own with
//! a zero or infinite TTL.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

struct CachedValue<T> {
    value: T,
    fetched_at: Instant,
}

/// A single-slot cache that refreshes through a caller-supplied future once
/// the TTL has elapsed.
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<CachedValue<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value if it is still fresh, otherwise run `refresh`
    /// and cache its result. A failed refresh leaves the slot untouched and
    /// surfaces the error to the caller.
    ///
    /// The slot lock is held across the refresh so concurrent callers do not
    /// stampede the upstream source.
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok(cached.value.clone());
            }
        }

        let value = refresh().await?;
        *slot = Some(CachedValue {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    /// Drop the cached value, forcing the next call to refresh.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}
