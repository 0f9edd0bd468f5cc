//! GitHub API client implementation

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::config::GitHubConfig;
use crate::error::UpstreamError;

use super::types::{GitHubIssue, GitHubTag, RateLimitInfo};
use super::GitHubApi;

/// GitHub REST client scoped to a single repository.
pub struct GitHubClient {
  http_client: reqwest::Client,
  base_url: Url,
  owner: String,
  repo: String,
  rate_limit: Mutex<RateLimitInfo>,
}

impl GitHubClient {
  /// Create a new client. `token` is sent as `Authorization: token <token>`.
  pub fn new(config: &GitHubConfig, token: Option<&str>) -> Result<Self, UpstreamError> {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::ACCEPT,
      HeaderValue::from_static("application/vnd.github.v3+json"),
    );

    if let Some(token) = token {
      let mut value = HeaderValue::from_str(&format!("token {}", token))
        .map_err(|_| UpstreamError::InvalidToken)?;
      value.set_sensitive(true);
      headers.insert(header::AUTHORIZATION, value);
    }

    let http_client = reqwest::Client::builder()
      .default_headers(headers)
      .user_agent(config.user_agent.clone())
      .timeout(config.timeout())
      .build()?;

    // A base without a trailing slash would lose its last segment on join.
    let mut base = config.api_url.clone();
    if !base.ends_with('/') {
      base.push('/');
    }

    Ok(Self {
      http_client,
      base_url: Url::parse(&base)?,
      owner: config.owner.clone(),
      repo: config.repo.clone(),
      rate_limit: Mutex::new(RateLimitInfo::default()),
    })
  }

  /// Rate limit state from the most recent response.
  pub fn rate_limit(&self) -> RateLimitInfo {
    *self
      .rate_limit
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn repo_url(&self, endpoint: &str) -> Result<Url, UpstreamError> {
    Ok(
      self
        .base_url
        .join(&format!("repos/{}/{}/{}", self.owner, self.repo, endpoint))?,
    )
  }

  /// URL of the first tags page.
  pub fn tags_url(&self, per_page: u32) -> Result<Url, UpstreamError> {
    let mut url = self.repo_url("tags")?;
    url
      .query_pairs_mut()
      .append_pair("per_page", &per_page.to_string());
    Ok(url)
  }

  /// URL of one page of issues in any state.
  pub fn issues_url(&self, page: u32, per_page: u32) -> Result<Url, UpstreamError> {
    let mut url = self.repo_url("issues")?;
    url
      .query_pairs_mut()
      .append_pair("state", "all")
      .append_pair("per_page", &per_page.to_string())
      .append_pair("page", &page.to_string());
    Ok(url)
  }

  /// GET `url` and decode the JSON body.
  async fn api_get<T: DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
    debug!(%url, "GitHub API request");

    let response = self.http_client.get(url).send().await?;
    self.update_rate_limit(response.headers());

    let status = response.status();
    if !status.is_success() {
      // An unreadable error body still reports the status.
      let body = response.text().await.unwrap_or_default();
      return Err(UpstreamError::Status {
        status: status.as_u16(),
        body,
      });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
  }

  fn update_rate_limit(&self, headers: &HeaderMap) {
    let parse = |name: &str| {
      headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    };

    let remaining = parse("x-ratelimit-remaining");
    let reset = parse("x-ratelimit-reset");

    let mut state = self
      .rate_limit
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(remaining) = remaining {
      state.remaining = Some(remaining);
    }
    if let Some(reset) = reset.and_then(|r| i64::try_from(r).ok()) {
      state.reset_at = Utc.timestamp_opt(reset, 0).single();
    }
  }
}

#[async_trait]
impl GitHubApi for GitHubClient {
  async fn list_tags(&self, per_page: u32) -> Result<Vec<GitHubTag>, UpstreamError> {
    let url = self.tags_url(per_page)?;
    self.api_get(url).await
  }

  async fn list_issues(&self, page: u32, per_page: u32) -> Result<Vec<GitHubIssue>, UpstreamError> {
    let url = self.issues_url(page, per_page)?;
    self.api_get(url).await
  }

  fn rate_limit(&self) -> RateLimitInfo {
    GitHubClient::rate_limit(self)
  }
}
