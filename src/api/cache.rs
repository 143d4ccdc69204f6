//! Caching implementations for product types.

use sha2::{Digest, Sha256};

use crate::cache::{Cacheable, QueryKey};

use super::types::Product;

impl Cacheable for Product {
  fn cache_key(&self) -> String {
    self.id.to_string()
  }

  fn entity_type() -> &'static str {
    "product"
  }
}

/// Query keys for product API calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProductQueryKey {
  /// Default product listing
  AllProducts,
  /// One numbered page
  ProductPage { limit: u64, skip: u64 },
  /// Incrementally loaded product list, shared by both infinite views
  InfiniteProducts,
}

impl ProductQueryKey {
  fn raw(&self) -> String {
    match self {
      Self::AllProducts => "products".to_string(),
      Self::ProductPage { limit, skip } => format!("products:limit={}:skip={}", limit, skip),
      Self::InfiniteProducts => "infinite_products".to_string(),
    }
  }
}

impl QueryKey for ProductQueryKey {
  fn cache_hash(&self) -> String {
    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(self.raw().as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::AllProducts => "all products".to_string(),
      Self::ProductPage { limit, skip } => format!("products {}..{}", skip, skip + limit),
      Self::InfiniteProducts => "infinite products".to_string(),
    }
  }
}
