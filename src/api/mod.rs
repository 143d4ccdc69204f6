pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod types;

pub use cached_client::CachedProductsClient;
pub use client::ProductsClient;
pub use types::{NewProduct, Product};
