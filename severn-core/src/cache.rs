//! In-memory caches for feed responses.
//!
//! Both hold a single entry that is swapped whole on every successful
//! refresh, and both take the lock for the full check-then-fill.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

/// Memoises a value derived from a payload, keyed by the payload's SHA-256.
#[derive(Debug)]
pub struct ContentCache<T> {
    entry: parking_lot::Mutex<Option<(String, T)>>,
}

impl<T: Clone> Default for ContentCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ContentCache<T> {
    pub fn new() -> Self {
        Self { entry: parking_lot::Mutex::new(None) }
    }

    pub fn digest(content: &str) -> String {
        hex::encode(Sha256::digest(content.as_bytes()))
    }

    /// Return the cached value for `content`, or compute it with `derive`
    /// and replace the entry. Failures leave the previous entry in place.
    pub fn get_or_try_insert_with<E>(
        &self,
        content: &str,
        derive: impl FnOnce(&str) -> Result<T, E>,
    ) -> Result<T, E> {
        let key = Self::digest(content);
        let mut entry = self.entry.lock();

        if let Some((_, value)) = entry.as_ref().filter(|(cached_key, _)| *cached_key == key) {
            tracing::debug!("payload unchanged, reusing parsed data");
            return Ok(value.clone());
        }

        let value = derive(content)?;
        *entry = Some((key, value.clone()));
        Ok(value)
    }

    pub fn get(&self, content: &str) -> Option<T> {
        let key = Self::digest(content);
        self.entry
            .lock()
            .as_ref()
            .filter(|(cached_key, _)| *cached_key == key)
            .map(|(_, value)| value.clone())
    }

    pub fn clear(&self) {
        *self.entry.lock() = None;
    }
}

/// Holds a value for a fixed time after it was stored.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: tokio::sync::Mutex<Option<(DateTime<Utc>, T)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: tokio::sync::Mutex::new(None) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value if it was stored less than `ttl` before `now`.
    pub async fn get(&self, now: DateTime<Utc>) -> Option<T> {
        let entry = self.entry.lock().await;
        self.fresh(entry.as_ref(), now)
    }

    pub async fn insert(&self, now: DateTime<Utc>, value: T) {
        *self.entry.lock().await = Some((now, value));
    }

    /// Return the fresh cached value, or run `refresh` and store its result.
    ///
    /// The lock is held across `refresh`, so concurrent callers wait for a
    /// single fetch instead of racing. Errors are returned without touching
    /// the stored entry.
    pub async fn get_or_try_refresh<E, F, Fut>(
        &self,
        now: DateTime<Utc>,
        refresh: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut entry = self.entry.lock().await;

        if let Some(value) = self.fresh(entry.as_ref(), now) {
            tracing::debug!("serving cached value");
            return Ok(value);
        }

        let value = refresh().await?;
        *entry = Some((now, value.clone()));
        Ok(value)
    }

    pub async fn clear(&self) {
        *self.entry.lock().await = None;
    }

    fn fresh(&self, entry: Option<&(DateTime<Utc>, T)>, now: DateTime<Utc>) -> Option<T> {
        entry
            .filter(|(stored_at, _)| now >= *stored_at && now - *stored_at < self.ttl)
            .map(|(_, value)| value.clone())
    }
}
