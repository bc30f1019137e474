use anyhow::{Result, anyhow};
use async_trait::async_trait;
use fjall::Keyspace;
use moka::Expiry;
use moka::future::Cache;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::task;

use crate::models::WeatherResult;

/// Key/value store with per-entry expiry used by the weather lookup.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored result, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<WeatherResult>>;

    /// Stores a result that expires after `ttl`.
    async fn put(&self, key: &str, value: &WeatherResult, ttl: Duration) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Cache persisted to disk in a fjall keyspace
pub struct PersistentCache {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl PersistentCache {
    /// Opens (or creates) the cache database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(PersistentCache { store: items })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put_value<T: Serialize + Send + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get_value<T: DeserializeOwned + Send + 'static>(
        &self,
        key: &str,
    ) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        if now < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for PersistentCache {
    async fn get(&self, key: &str) -> Result<Option<WeatherResult>> {
        self.get_value(key).await
    }

    async fn put(&self, key: &str, value: &WeatherResult, ttl: Duration) -> Result<()> {
        self.put_value(key, value.clone(), ttl).await
    }
}

/// Default bound on the number of results held by a `MemoryCache`
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Cached result together with the TTL it was stored with
#[derive(Clone)]
struct TimedResult {
    result: WeatherResult,
    ttl: Duration,
}

/// Expires each entry after the TTL given to its own `put`
struct PerEntryTtl;

impl Expiry<String, TimedResult> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &TimedResult,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &TimedResult,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local cache, lost on restart. Bounded in size; expired entries
/// are evicted by moka's housekeeping whether or not they are read again.
pub struct MemoryCache {
    entries: Cache<String, TimedResult>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { entries }
    }

    /// Number of live entries, after pending evictions have run
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<WeatherResult>> {
        Ok(self.entries.get(key).await.map(|entry| entry.result))
    }

    async fn put(&self, key: &str, value: &WeatherResult, ttl: Duration) -> Result<()> {
        let entry = TimedResult {
            result: value.clone(),
            ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }
}
