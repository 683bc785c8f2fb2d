//! Time-bounded, single-flight cache for an authenticated session.
//!
//! The cache holds the refresh lock while `login` runs, so callers that arrive
//! during a refresh wait for it and reuse its result instead of logging in
//! again. Whatever `login` returns is cached for the full window, including
//! "no session" after a failed login.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

/// Default freshness window (30 minutes).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

struct Cached<T> {
    value: T,
    refreshed_at: Instant,
}

pub struct SessionCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Cached<T>>>,
}

impl<T: Clone> Default for SessionCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl<T: Clone> SessionCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value, running `login` first if it is missing or stale.
    pub async fn get_or_refresh<F, Fut>(&self, login: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.refreshed_at.elapsed() < self.ttl {
                return cached.value.clone();
            }
            debug!(ttl_secs = self.ttl.as_secs(), "Cached session expired");
        }

        let value = login().await;
        *slot = Some(Cached {
            value: value.clone(),
            refreshed_at: Instant::now(),
        });
        value
    }

    /// Drop the cached value so the next caller logs in again.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }

    /// Whether a value is cached and inside the window.
    pub async fn is_fresh(&self) -> bool {
        self.slot
            .lock()
            .await
            .as_ref()
            .is_some_and(|c| c.refreshed_at.elapsed() < self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_value_reused_inside_window() {
        let cache = SessionCache::new(Duration::from_secs(60));
        let logins = &AtomicU32::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_refresh(move || async move {
                    logins.fetch_add(1, Ordering::SeqCst);
                    Some("session")
                })
                .await;
            assert_eq!(value, Some("session"));
        }

        assert_eq!(logins.load(Ordering::SeqCst), 1);
        assert!(cache.is_fresh().await);
    }

    #[tokio::test]
    async fn test_failed_login_cached_as_anonymous() {
        let cache: SessionCache<Option<&str>> = SessionCache::new(Duration::from_secs(60));
        let logins = &AtomicU32::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_refresh(move || async move {
                    logins.fetch_add(1, Ordering::SeqCst);
                    None
                })
                .await;
            assert!(value.is_none());
        }

        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_refreshes_every_time() {
        let cache = SessionCache::new(Duration::ZERO);
        let logins = &AtomicU32::new(0);

        for _ in 0..2 {
            cache
                .get_or_refresh(move || async move {
                    logins.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }

        assert_eq!(logins.load(Ordering::SeqCst), 2);
        assert!(!cache.is_fresh().await);
    }

    #[tokio::test]
    async fn test_invalidate_forces_login() {
        let cache = SessionCache::new(Duration::from_secs(60));
        let logins = &AtomicU32::new(0);
        let login = move || async move {
            logins.fetch_add(1, Ordering::SeqCst) + 1
        };

        assert_eq!(cache.get_or_refresh(login).await, 1);
        cache.invalidate().await;
        assert!(!cache.is_fresh().await);
        assert_eq!(cache.get_or_refresh(login).await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_single_flight() {
        let cache = Arc::new(SessionCache::new(Duration::from_secs(60)));
        let logins = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let logins = logins.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(|| async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        logins.fetch_add(1, Ordering::SeqCst);
                        "session"
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "session");
        }
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }
}
