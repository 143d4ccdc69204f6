//! Pages and the append-only collection they accumulate into.

use serde::{Deserialize, Serialize};

/// One fetched batch of items, tagged with the offset used to request it
/// and the total the server reported at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: u64,
  pub skip: u64,
  pub limit: u64,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, total: u64, skip: u64, limit: u64) -> Self {
    Self {
      items,
      total,
      skip,
      limit,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

/// Pages in fetch order. Append-only: never reordered, never deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCollection<T> {
  pages: Vec<Page<T>>,
}

impl<T> Default for PageCollection<T> {
  fn default() -> Self {
    Self { pages: Vec::new() }
  }
}

impl<T> PageCollection<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, page: Page<T>) {
    self.pages.push(page);
  }

  pub fn len(&self) -> usize {
    self.pages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pages.is_empty()
  }

  pub fn last(&self) -> Option<&Page<T>> {
    self.pages.last()
  }

  /// Server total as reported by the most recently fetched page.
  pub fn last_total(&self) -> Option<u64> {
    self.last().map(|p| p.total)
  }

  pub fn pages(&self) -> &[Page<T>] {
    &self.pages
  }

  /// All items across pages, in fetch order.
  pub fn items(&self) -> impl Iterator<Item = &T> {
    self.pages.iter().flat_map(|p| p.items.iter())
  }

  /// Number of items actually received (may be below `len * page_size`
  /// when the last page is short).
  pub fn item_count(&self) -> usize {
    self.pages.iter().map(|p| p.items.len()).sum()
  }
}

/// What a paginated list is doing right now, as seen by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
  Idle,
  LoadingFirst,
  LoadingMore,
  Error,
  Exhausted,
}

impl FetchState {
  /// Derive the view-facing state from the trigger state, how many pages
  /// are held, and whether the last fetch failed.
  pub fn derive(fetching: bool, exhausted: bool, page_count: usize, has_error: bool) -> Self {
    if fetching {
      if page_count == 0 {
        FetchState::LoadingFirst
      } else {
        FetchState::LoadingMore
      }
    } else if exhausted {
      FetchState::Exhausted
    } else if has_error {
      FetchState::Error
    } else {
      FetchState::Idle
    }
  }
}
