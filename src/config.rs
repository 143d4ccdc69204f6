use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub paging: PagingConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl ApiConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagingConfig {
  /// Items per request for both numbered and infinite lists
  #[serde(default = "default_page_size")]
  pub page_size: u64,
}

impl Default for PagingConfig {
  fn default() -> Self {
    Self {
      page_size: default_page_size(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Seconds before a cached query is refetched
  #[serde(default = "default_stale_secs")]
  pub stale_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      stale_secs: default_stale_secs(),
    }
  }
}

impl CacheConfig {
  pub fn stale_time(&self) -> Duration {
    Duration::from_secs(self.stale_secs)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Log file path (default: $XDG_DATA_HOME/qfetch/qfetch.log)
  pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

fn default_page_size() -> u64 {
  10
}

fn default_stale_secs() -> u64 {
  300
}

fn default_true() -> bool {
  true
}

impl Config {
  /// Load configuration from file, falling back to defaults.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./qfetch.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/qfetch/config.yaml
  ///
  /// `QFETCH_BASE_URL` overrides `api.base_url` from any source.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Ok(base_url) = std::env::var("QFETCH_BASE_URL") {
      config.api.base_url = base_url;
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("qfetch.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("qfetch").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Reject values the rest of the app cannot work with.
  pub fn validate(&self) -> Result<()> {
    if self.paging.page_size == 0 {
      return Err(eyre!("paging.page_size must be greater than zero"));
    }
    Url::parse(&self.api.base_url)
      .map_err(|e| eyre!("Invalid api.base_url '{}': {}", self.api.base_url, e))?;
    Ok(())
  }

  /// Resolved log file location.
  pub fn log_path(&self) -> Result<PathBuf> {
    if let Some(path) = &self.log.file {
      return Ok(path.clone());
    }
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("qfetch").join("qfetch.log"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_yaml_uses_defaults() {
    let config = Config::from_yaml("{}").unwrap();
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.paging.page_size, 10);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.stale_time(), Duration::from_secs(300));
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_partial_yaml_overrides() {
    let config = Config::from_yaml(
      "api:\n  base_url: http://localhost:8080\npaging:\n  page_size: 25\ncache:\n  enabled: false\n",
    )
    .unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8080");
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.paging.page_size, 25);
    assert!(!config.cache.enabled);
  }

  #[test]
  fn test_zero_page_size_is_invalid() {
    let config = Config::from_yaml("paging:\n  page_size: 0\n").unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_bad_base_url_is_invalid() {
    let config = Config::from_yaml("api:\n  base_url: not a url\n").unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_explicit_log_file_wins() {
    let config = Config::from_yaml("log:\n  file: /tmp/q.log\n").unwrap();
    assert_eq!(config.log_path().unwrap(), PathBuf::from("/tmp/q.log"));
  }

  #[test]
  fn test_missing_explicit_path_errors() {
    assert!(Config::load(Some(Path::new("/definitely/not/here.yaml"))).is_err());
  }
}
