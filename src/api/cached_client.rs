//! Products client with transparent in-memory caching.

use crate::cache::{CacheLayer, CacheResult, MemoryStorage, NoopStorage, PageStore};
use crate::config::Config;
use crate::error::ApiError;
use crate::paging::{Page, PageParamSequencer};

use super::cache::ProductQueryKey;
use super::client::ProductsClient;
use super::types::{NewProduct, Product};

/// Products client with transparent caching support.
///
/// Wraps [`ProductsClient`] with the same API, serving fresh results from
/// the cache. It also owns the page store backing infinite queries, so every
/// view handed a clone of this client shares the same cached pages.
#[derive(Clone)]
pub struct CachedProductsClient {
  inner: ProductsClient,
  cache: CacheLayer,
  pages: PageStore<Product>,
  sequencer: PageParamSequencer,
}

impl CachedProductsClient {
  pub fn new(config: &Config) -> Result<Self, ApiError> {
    let inner = ProductsClient::new(&config.api)?;
    let cache = if config.cache.enabled {
      CacheLayer::new(MemoryStorage::new())
    } else {
      CacheLayer::new(NoopStorage)
    };

    let sequencer = PageParamSequencer::new(config.paging.page_size)?;

    Ok(Self::with_cache(
      inner,
      cache.with_stale_time(config.cache.stale_time()),
      sequencer,
    ))
  }

  pub fn with_cache(inner: ProductsClient, cache: CacheLayer, sequencer: PageParamSequencer) -> Self {
    Self {
      inner,
      cache,
      pages: PageStore::new(),
      sequencer,
    }
  }

  /// Uncached client, for views that manage their own fetch state.
  pub fn raw(&self) -> &ProductsClient {
    &self.inner
  }

  pub fn page_store(&self) -> PageStore<Product> {
    self.pages.clone()
  }

  pub fn sequencer(&self) -> PageParamSequencer {
    self.sequencer
  }

  /// Default product listing. Also primes the per-product cache.
  pub async fn list_products(&self) -> Result<CacheResult<Vec<Product>>, ApiError> {
    let result = self
      .cache
      .fetch(&ProductQueryKey::AllProducts, || {
        let inner = self.inner.clone();
        async move { inner.list_products().await }
      })
      .await?;

    self.cache.prime(&result.data)?;
    Ok(result)
  }

  pub async fn get_product(&self, id: u64) -> Result<CacheResult<Product>, ApiError> {
    self
      .cache
      .fetch_one(&id.to_string(), || {
        let inner = self.inner.clone();
        async move { inner.get_product(id).await }
      })
      .await
  }

  /// A numbered page, cached per (limit, skip).
  pub async fn product_page(&self, limit: u64, skip: u64) -> Result<CacheResult<Page<Product>>, ApiError> {
    self
      .cache
      .fetch(&ProductQueryKey::ProductPage { limit, skip }, || {
        let inner = self.inner.clone();
        async move { inner.product_page(limit, skip).await }
      })
      .await
  }

  /// Next page for an infinite query. Not cached here: the page store
  /// holds accumulated pages.
  pub async fn next_page(&self, skip: u64) -> Result<Page<Product>, ApiError> {
    self.inner.product_page(self.sequencer.page_size(), skip).await
  }

  /// Create a product (not cached - write operation). The default listing
  /// is invalidated so the next load picks the new product up.
  pub async fn add_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
    let created = self.inner.add_product(product).await?;
    self.cache.invalidate(&ProductQueryKey::AllProducts);
    Ok(created)
  }
}
