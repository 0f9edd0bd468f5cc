use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub github: GitHubConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub retry: RetryConfig,
  /// Write logs to this file instead of stderr
  pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
  pub api_url: String,
  pub owner: String,
  pub repo: String,
  pub user_agent: String,
  /// Token from the config file; environment variables take precedence
  pub token: Option<String>,
  /// Per-request network timeout
  pub timeout_secs: u64,
  /// Pause between issue pages
  pub page_delay_ms: u64,
  pub max_issue_pages: u32,
  pub per_page: u32,
}

impl Default for GitHubConfig {
  fn default() -> Self {
    Self {
      api_url: "https://api.github.com".to_string(),
      owner: "citizenfx".to_string(),
      repo: "fivem".to_string(),
      user_agent: concat!("artifact-index/", env!("CARGO_PKG_VERSION")).to_string(),
      token: None,
      timeout_secs: 30,
      page_delay_ms: 1_000,
      max_issue_pages: 10,
      per_page: 100,
    }
  }
}

impl GitHubConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn page_delay(&self) -> Duration {
    Duration::from_millis(self.page_delay_ms)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub tags_ttl_ms: u64,
  pub issues_ttl_ms: u64,
  /// TTL every read is checked against
  pub read_ttl_ms: u64,
  /// Check freshness against each entry's own write TTL instead of `read_ttl_ms`
  pub honor_entry_ttl: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      tags_ttl_ms: 3_600_000,
      issues_ttl_ms: 1_800_000,
      read_ttl_ms: 3_600_000,
      honor_entry_ttl: false,
    }
  }
}

impl CacheConfig {
  pub fn tags_ttl(&self) -> Duration {
    Duration::from_millis(self.tags_ttl_ms)
  }

  pub fn issues_ttl(&self) -> Duration {
    Duration::from_millis(self.issues_ttl_ms)
  }

  pub fn read_ttl(&self) -> Duration {
    Duration::from_millis(self.read_ttl_ms)
  }
}

/// Retry settings.
///
/// Accepted for compatibility with existing config files. No request path
/// retries today; a failed fetch falls back to the cache instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
  pub max_retries: u32,
  pub retry_delay_ms: u64,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_retries: 3,
      retry_delay_ms: 1_000,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./artifact-index.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/artifact-index/config.yaml
  ///
  /// Falls back to defaults when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(ConfigError::NotFound(p.to_path_buf()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("artifact-index.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("artifact-index").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Get the GitHub token.
  ///
  /// Checks ARTIFACT_INDEX_GITHUB_TOKEN first, then GITHUB_TOKEN, then the
  /// config file. Requests go out unauthenticated when none is set.
  pub fn github_token(&self) -> Option<String> {
    std::env::var("ARTIFACT_INDEX_GITHUB_TOKEN")
      .or_else(|_| std::env::var("GITHUB_TOKEN"))
      .ok()
      .filter(|t| !t.is_empty())
      .or_else(|| self.github.token.clone().filter(|t| !t.is_empty()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.github.api_url, "https://api.github.com");
    assert_eq!(config.github.timeout(), Duration::from_secs(30));
    assert_eq!(config.github.page_delay(), Duration::from_millis(1_000));
    assert_eq!(config.github.max_issue_pages, 10);
    assert_eq!(config.github.per_page, 100);
    assert_eq!(config.cache.tags_ttl(), Duration::from_millis(3_600_000));
    assert_eq!(config.cache.issues_ttl(), Duration::from_millis(1_800_000));
    assert_eq!(config.cache.read_ttl(), config.cache.tags_ttl());
    assert!(!config.cache.honor_entry_ttl);
    assert_eq!(config.retry.max_retries, 3);
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
      file,
      "github:\n  owner: someone\n  page_delay_ms: 0\ncache:\n  honor_entry_ttl: true\nlog_file: /tmp/artifact-index.log"
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.github.owner, "someone");
    assert_eq!(config.github.repo, "fivem");
    assert_eq!(config.github.page_delay(), Duration::ZERO);
    assert!(config.cache.honor_entry_ttl);
    assert_eq!(config.cache.tags_ttl_ms, 3_600_000);
    assert_eq!(
      config.log_file.as_deref(),
      Some(Path::new("/tmp/artifact-index.log"))
    );
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");

    let err = Config::load(Some(&missing)).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(p) if p == missing));
  }

  #[test]
  fn test_invalid_yaml_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "github: [not, a, map").unwrap();

    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }
}
