//! Next-offset computation for incrementally loaded lists.

use super::page::PageCollection;
use crate::error::ApiError;

/// Maps "pages fetched so far" to the `skip` of the next request.
///
/// Counts pages, not items: a short final page still counts as a full
/// `page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParamSequencer {
  page_size: u64,
  initial_offset: u64,
}

impl PageParamSequencer {
  pub fn new(page_size: u64) -> Result<Self, ApiError> {
    if page_size == 0 {
      return Err(ApiError::Validation("page size must be greater than zero".into()));
    }
    Ok(Self {
      page_size,
      initial_offset: 0,
    })
  }

  pub fn page_size(&self) -> u64 {
    self.page_size
  }

  /// `Some(fetched_pages * page_size)` while that is below `last_total`,
  /// `None` once the list is exhausted.
  pub fn next_offset(&self, fetched_pages: usize, last_total: u64) -> Option<u64> {
    let total_fetched = (fetched_pages as u64).saturating_mul(self.page_size);
    (total_fetched < last_total).then_some(total_fetched)
  }

  /// Offset to request after `pages`. An empty collection yields the
  /// initial offset rather than consulting `next_offset`.
  pub fn offset_after<T>(&self, pages: &PageCollection<T>) -> Option<u64> {
    match pages.last_total() {
      None => Some(self.initial_offset),
      Some(total) => self.next_offset(pages.len(), total),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::paging::page::Page;

  fn seq(size: u64) -> PageParamSequencer {
    PageParamSequencer::new(size).unwrap()
  }

  #[test]
  fn test_zero_page_size_rejected() {
    assert!(PageParamSequencer::new(0).is_err());
  }

  #[test]
  fn test_offsets_while_below_total() {
    for page_size in [1u64, 3, 10, 30] {
      let total = 95;
      let s = seq(page_size);
      for n in 0..200usize {
        let expected = n as u64 * page_size;
        if expected < total {
          assert_eq!(s.next_offset(n, total), Some(expected), "n={n} size={page_size}");
        } else {
          assert_eq!(s.next_offset(n, total), None, "n={n} size={page_size}");
        }
      }
    }
  }

  #[test]
  fn test_idempotent() {
    let s = seq(10);
    assert_eq!(s.next_offset(2, 25), s.next_offset(2, 25));
    assert_eq!(s.next_offset(3, 25), s.next_offset(3, 25));
  }

  #[test]
  fn test_zero_total_is_exhausted_immediately() {
    let s = seq(10);
    assert_eq!(s.next_offset(0, 0), None);

    let mut pages: PageCollection<u32> = PageCollection::new();
    pages.push(Page::new(Vec::new(), 0, 0, 10));
    assert_eq!(s.offset_after(&pages), None);
  }

  #[test]
  fn test_exactly_divisible_total() {
    let s = seq(10);
    assert_eq!(s.next_offset(2, 30), Some(20));
    assert_eq!(s.next_offset(3, 30), None);
  }

  #[test]
  fn test_sequence_for_total_25() {
    let s = seq(10);
    let mut pages: PageCollection<u32> = PageCollection::new();
    let mut offsets = Vec::new();

    while let Some(offset) = s.offset_after(&pages) {
      offsets.push(offset);
      let n = (25 - offset).min(10) as u32;
      pages.push(Page::new((0..n).collect(), 25, offset, 10));
    }

    assert_eq!(offsets, vec![0, 10, 20]);
    assert_eq!(s.offset_after(&pages), None);
  }

  #[test]
  fn test_no_overflow_on_huge_counts() {
    let s = seq(u64::MAX);
    assert_eq!(s.next_offset(2, u64::MAX), None);
  }
}
