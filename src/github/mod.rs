//! GitHub REST API access.

mod client;
mod types;

pub use client::GitHubClient;
pub use types::{GitHubIssue, GitHubTag, IssueLabel, RateLimitInfo, TagCommit};

use async_trait::async_trait;

use crate::error::UpstreamError;

/// The upstream calls the artifact service depends on.
///
/// [`GitHubClient`] is the HTTP implementation; tests substitute scripted
/// fakes.
#[async_trait]
pub trait GitHubApi: Send + Sync {
  /// First page of repository tags.
  async fn list_tags(&self, per_page: u32) -> Result<Vec<GitHubTag>, UpstreamError>;

  /// One page (1-based) of issues in any state.
  async fn list_issues(&self, page: u32, per_page: u32) -> Result<Vec<GitHubIssue>, UpstreamError>;

  /// Rate limit state after the most recent call, if the backend tracks one.
  fn rate_limit(&self) -> RateLimitInfo {
    RateLimitInfo::default()
  }
}
