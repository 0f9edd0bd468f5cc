//! Error types for upstream access and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the GitHub API.
#[derive(Debug, Error)]
pub enum UpstreamError {
  /// The API answered with a non-2xx status.
  #[error("GitHub API error: {status} - {body}")]
  Status { status: u16, body: String },

  /// The request never produced a response (connect failure, timeout, ...).
  #[error("GitHub API request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The response body was not the JSON we expected.
  #[error("Failed to decode GitHub API response: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("Invalid GitHub API URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("Invalid GitHub token: not a valid header value")]
  InvalidToken,
}

impl UpstreamError {
  /// HTTP status code, if the upstream answered at all.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Status { status, .. } => Some(*status),
      Self::Transport(e) => e.status().map(|s| s.as_u16()),
      _ => None,
    }
  }
}

/// Upstream resource a fetch was reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
  Tags,
  Issues,
}

impl std::fmt::Display for Resource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Resource::Tags => write!(f, "tags"),
      Resource::Issues => write!(f, "issues"),
    }
  }
}

/// A fetch that failed with no cached data to fall back on.
#[derive(Debug, Error)]
#[error("failed to fetch GitHub {resource}: {source}")]
pub struct FetchError {
  pub resource: Resource,
  #[source]
  pub source: UpstreamError,
}

impl FetchError {
  pub fn new(resource: Resource, source: UpstreamError) -> Self {
    Self { resource, source }
  }
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Config file not found: {}", .0.display())]
  NotFound(PathBuf),

  #[error("Failed to read config file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse config file {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },
}
