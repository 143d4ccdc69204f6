//! Cache layer that orchestrates caching logic with network fetching.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::storage::{CacheStorage, StoredEntry};
use super::traits::{entity_key, CacheResult, Cacheable, QueryKey};
use crate::error::ApiError;

/// Cache layer that manages caching logic and network fetching.
///
/// Sits between the views and the HTTP client, serving fresh entries from
/// storage and refetching once they go stale.
#[derive(Clone)]
pub struct CacheLayer {
  storage: Arc<dyn CacheStorage>,
  /// How long before cached data is considered stale
  stale_time: Duration,
}

impl CacheLayer {
  pub fn new(storage: impl CacheStorage + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
      stale_time: Duration::from_secs(300),
    }
  }

  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  fn is_stale(&self, cached_at: DateTime<Utc>) -> bool {
    match (Utc::now() - cached_at).to_std() {
      Ok(age) => age > self.stale_time,
      // Cached "in the future" (clock moved back)
      Err(_) => false,
    }
  }

  /// Decode an entry, dropping it if it no longer decodes.
  fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<(T, DateTime<Utc>)> {
    let entry = self.storage.get(key)?;
    match serde_json::from_str(&entry.json) {
      Ok(data) => Some((data, entry.cached_at)),
      Err(e) => {
        warn!(key, error = %e, "dropping undecodable cache entry");
        self.storage.remove(key);
        None
      }
    }
  }

  fn store<T: Serialize>(&self, key: &str, data: &T) -> Result<(), ApiError> {
    let json = serde_json::to_string(data)?;
    self.storage.put(key, StoredEntry::now(json));
    Ok(())
  }

  /// Cache-first resolution shared by [`fetch`](Self::fetch) and
  /// [`fetch_one`](Self::fetch_one).
  ///
  /// 1. Check cache - if fresh, return immediately
  /// 2. If stale/missing, fetch from network
  /// 3. On a network failure, return the stale entry (offline)
  /// 4. Update cache with new data
  ///
  /// Server and decode errors are returned as-is; retrying is up to the caller.
  async fn resolve<T, F, Fut>(&self, key: &str, label: &str, fetcher: F) -> Result<CacheResult<T>, ApiError>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
  {
    let Some((cached, cached_at)) = self.lookup::<T>(key) else {
      debug!(query = label, "cache miss, fetching");
      let data = fetcher().await?;
      self.store(key, &data)?;
      return Ok(CacheResult::from_network(data));
    };

    if !self.is_stale(cached_at) {
      debug!(query = label, "cache hit");
      return Ok(CacheResult::from_cache(cached, cached_at));
    }

    debug!(query = label, "cache stale, refetching");
    match fetcher().await {
      Ok(data) => {
        self.store(key, &data)?;
        Ok(CacheResult::from_network(data))
      }
      Err(e) if e.is_network() => {
        warn!(query = label, error = %e, "network unavailable, serving stale cache");
        Ok(CacheResult::offline(cached, cached_at))
      }
      Err(e) => Err(e),
    }
  }

  /// Fetch a query result by key.
  pub async fn fetch<K, T, F, Fut>(&self, key: &K, fetcher: F) -> Result<CacheResult<T>, ApiError>
  where
    K: QueryKey,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
  {
    self
      .resolve(&key.cache_hash(), &key.description(), fetcher)
      .await
  }

  /// Fetch a single entity with caching.
  pub async fn fetch_one<T, F, Fut>(&self, id: &str, fetcher: F) -> Result<CacheResult<T>, ApiError>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
  {
    let key = entity_key::<T>(id);
    self.resolve(&key, &key, fetcher).await
  }

  /// Store entities individually so detail lookups hit the cache.
  pub fn prime<T: Cacheable>(&self, entities: &[T]) -> Result<(), ApiError> {
    for entity in entities {
      self.store(&entity_key::<T>(&entity.cache_key()), entity)?;
    }
    Ok(())
  }

  pub fn invalidate<K: QueryKey>(&self, key: &K) {
    self.storage.remove(&key.cache_hash());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheSource, MemoryStorage, NoopStorage};
  use serde::Deserialize;
  use std::sync::atomic::{AtomicU32, Ordering};

  struct Key(&'static str);

  impl QueryKey for Key {
    fn cache_hash(&self) -> String {
      self.0.to_string()
    }

    fn description(&self) -> String {
      self.0.to_string()
    }
  }

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Thing {
    id: u32,
  }

  impl Cacheable for Thing {
    fn cache_key(&self) -> String {
      self.id.to_string()
    }

    fn entity_type() -> &'static str {
      "thing"
    }
  }

  #[tokio::test]
  async fn test_second_fetch_hits_cache() {
    let cache = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicU32::new(0);

    for _ in 0..2 {
      let result = cache
        .fetch(&Key("k"), || async {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok::<_, ApiError>(vec![1, 2, 3])
        })
        .await
        .unwrap();
      assert_eq!(result.data, vec![1, 2, 3]);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_zero_stale_time_always_refetches() {
    let cache = CacheLayer::new(MemoryStorage::new()).with_stale_time(Duration::ZERO);
    cache
      .fetch(&Key("k"), || async { Ok::<_, ApiError>(1) })
      .await
      .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let result = cache
      .fetch(&Key("k"), || async { Ok::<_, ApiError>(2) })
      .await
      .unwrap();
    assert_eq!(result.data, 2);
    assert_eq!(result.source, CacheSource::Network);
  }

  #[tokio::test]
  async fn test_errors_are_not_cached() {
    let cache = CacheLayer::new(MemoryStorage::new());
    let err = cache
      .fetch(&Key("k"), || async {
        Err::<u32, _>(ApiError::Server {
          status: 500,
          body: String::new(),
        })
      })
      .await;
    assert!(err.is_err());

    let ok = cache
      .fetch(&Key("k"), || async { Ok::<_, ApiError>(7) })
      .await
      .unwrap();
    assert_eq!(ok.data, 7);
  }

  #[tokio::test]
  async fn test_primed_entities_serve_fetch_one() {
    let cache = CacheLayer::new(MemoryStorage::new());
    cache.prime(&[Thing { id: 1 }, Thing { id: 2 }]).unwrap();

    let result = cache
      .fetch_one("2", || async { Err::<Thing, _>(ApiError::Validation("unreachable".into())) })
      .await
      .unwrap();
    assert_eq!(result.data, Thing { id: 2 });
    assert_eq!(result.source, CacheSource::Cache);
  }

  #[tokio::test]
  async fn test_invalidate_forces_refetch() {
    let cache = CacheLayer::new(MemoryStorage::new());
    cache
      .fetch(&Key("k"), || async { Ok::<_, ApiError>(1) })
      .await
      .unwrap();
    cache.invalidate(&Key("k"));

    let result = cache
      .fetch(&Key("k"), || async { Ok::<_, ApiError>(2) })
      .await
      .unwrap();
    assert_eq!(result.data, 2);
  }

  #[tokio::test]
  async fn test_noop_storage_never_hits() {
    let cache = CacheLayer::new(NoopStorage);
    cache
      .fetch(&Key("k"), || async { Ok::<_, ApiError>(1) })
      .await
      .unwrap();
    let result = cache
      .fetch(&Key("k"), || async { Ok::<_, ApiError>(2) })
      .await
      .unwrap();
    assert_eq!(result.source, CacheSource::Network);
  }

  async fn network_error() -> ApiError {
    // Nothing listens on the discard port
    let err = reqwest::Client::new()
      .get("http://127.0.0.1:9")
      .send()
      .await
      .unwrap_err();
    ApiError::from(err)
  }

  #[tokio::test]
  async fn test_stale_entry_served_when_network_fails() {
    let cache = CacheLayer::new(MemoryStorage::new()).with_stale_time(Duration::ZERO);
    cache
      .fetch(&Key("k"), || async { Ok::<_, ApiError>(1) })
      .await
      .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let err = network_error().await;
    assert!(err.is_network());
    let result = cache
      .fetch(&Key("k"), || async move { Err::<u32, _>(err) })
      .await
      .unwrap();
    assert_eq!(result.data, 1);
    assert_eq!(result.source, CacheSource::Offline);
  }

  #[tokio::test]
  async fn test_server_error_is_not_masked_by_stale_entry() {
    let cache = CacheLayer::new(MemoryStorage::new()).with_stale_time(Duration::ZERO);
    cache
      .fetch(&Key("k"), || async { Ok::<_, ApiError>(1) })
      .await
      .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let result = cache
      .fetch(&Key("k"), || async {
        Err::<u32, _>(ApiError::Server {
          status: 503,
          body: String::new(),
        })
      })
      .await;
    assert!(matches!(result, Err(ApiError::Server { status: 503, .. })));
  }
}
