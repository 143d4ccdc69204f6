//! In-memory query cache sitting between views and the HTTP client.
//!
//! - Query results are stored by hashed query key with a fresh/stale window
//! - Individual entities can be primed from list results
//! - Incrementally loaded lists keep their pages and load guard in a
//!   [`PageStore`], shared by every view registered on the same key

mod layer;
mod pages;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use pages::PageStore;
pub use storage::{MemoryStorage, NoopStorage};
pub use traits::{CacheResult, CacheSource, Cacheable, QueryKey};
