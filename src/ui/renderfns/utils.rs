use crate::cache::{CacheResult, CacheSource};
use chrono::{DateTime, Utc};

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Format a price the way the product screens show it
pub fn format_price(price: f64) -> String {
  format!("${:.2}", price)
}

/// `ceil(total / limit)`, with at least one page
pub fn page_count(total: u64, limit: u64) -> u64 {
  if limit == 0 {
    return 1;
  }
  total.div_ceil(limit).max(1)
}

/// Title suffix saying where a cached query result came from. Empty for
/// data fresh off the network.
pub fn source_label<T>(result: &CacheResult<T>) -> String {
  let age = result.cached_at.map(age);
  match (result.source, age) {
    (CacheSource::Network, _) => String::new(),
    (CacheSource::Cache, Some(age)) => format!(" (cached {})", age),
    (CacheSource::Cache, None) => " (cached)".to_string(),
    (CacheSource::Offline, Some(age)) => format!(" (offline, cached {})", age),
    (CacheSource::Offline, None) => " (offline)".to_string(),
  }
}

fn age(at: DateTime<Utc>) -> String {
  let secs = (Utc::now() - at).num_seconds().max(0);
  match secs {
    0..=59 => format!("{}s ago", secs),
    60..=3599 => format!("{}m ago", secs / 60),
    _ => format!("{}h ago", secs / 3600),
  }
}
