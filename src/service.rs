//! Artifact service: GitHub fetching behind the cache, plus artifact queries.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::artifacts::{self, ArtifactEntry, ArtifactPage, ArtifactsQuery};
use crate::cache::{CacheLayer, CacheResult, CacheSource, Clock};
use crate::config::Config;
use crate::error::{FetchError, Resource, UpstreamError};
use crate::github::{GitHubApi, GitHubClient, GitHubIssue, GitHubTag, RateLimitInfo};

const TAGS_KEY: &str = "tags";
const ISSUES_KEY: &str = "issues";

/// Fetch limits and cache lifetimes.
#[derive(Debug, Clone)]
pub struct FetchSettings {
  pub per_page: u32,
  pub max_issue_pages: u32,
  /// Pause between issue pages
  pub page_delay: Duration,
  pub tags_ttl: Duration,
  pub issues_ttl: Duration,
}

impl Default for FetchSettings {
  fn default() -> Self {
    Self {
      per_page: 100,
      max_issue_pages: 10,
      page_delay: Duration::from_millis(1_000),
      tags_ttl: crate::cache::TAGS_TTL,
      issues_ttl: crate::cache::ISSUES_TTL,
    }
  }
}

impl From<&Config> for FetchSettings {
  fn from(config: &Config) -> Self {
    Self {
      per_page: config.github.per_page,
      max_issue_pages: config.github.max_issue_pages,
      page_delay: config.github.page_delay(),
      tags_ttl: config.cache.tags_ttl(),
      issues_ttl: config.cache.issues_ttl(),
    }
  }
}

/// Release artifact service.
///
/// Owns its cache, so two services never share entries. The cache is
/// internally locked; wrap the service in an `Arc` to share it between tasks.
pub struct ArtifactsService<A: GitHubApi = GitHubClient> {
  api: A,
  cache: CacheLayer,
  settings: FetchSettings,
}

impl ArtifactsService<GitHubClient> {
  /// Build the HTTP client and cache from configuration.
  pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
    let token = config.github_token();
    if token.is_none() {
      info!("No GitHub token configured, using unauthenticated requests");
    }

    let client = GitHubClient::new(&config.github, token.as_deref())?;
    let cache = CacheLayer::in_memory()
      .with_read_ttl(config.cache.read_ttl())
      .with_entry_ttl(config.cache.honor_entry_ttl);

    Ok(Self::new(client, cache, FetchSettings::from(config)))
  }
}

impl<A: GitHubApi> ArtifactsService<A> {
  pub fn new(api: A, cache: CacheLayer, settings: FetchSettings) -> Self {
    Self {
      api,
      cache,
      settings,
    }
  }

  /// Service with default settings on a fresh in-memory cache.
  pub fn with_api(api: A) -> Self {
    Self::new(api, CacheLayer::in_memory(), FetchSettings::default())
  }

  /// Replace the cache clock.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.cache = self.cache.with_clock(clock);
    self
  }

  pub fn api(&self) -> &A {
    &self.api
  }

  pub fn cache(&self) -> &CacheLayer {
    &self.cache
  }

  pub fn settings(&self) -> &FetchSettings {
    &self.settings
  }

  /// Upstream rate limit as of the last request.
  pub fn rate_limit(&self) -> RateLimitInfo {
    self.api.rate_limit()
  }

  /// Fetch repository tags (first page).
  ///
  /// With `use_cache`, a fresh cached list is returned without a request. A
  /// failed request falls back to cached tags of any age.
  pub async fn fetch_github_tags(&self, use_cache: bool) -> Result<Vec<GitHubTag>, FetchError> {
    let per_page = self.settings.per_page;
    let result = self
      .cache
      .fetch(TAGS_KEY, self.settings.tags_ttl, use_cache, || {
        self.api.list_tags(per_page)
      })
      .await
      .map_err(|e| FetchError::new(Resource::Tags, e))?;

    Ok(self.log_source(Resource::Tags, result))
  }

  /// Fetch issues in any state, up to `max_issue_pages` pages.
  ///
  /// A failure on the first page falls back to cached issues of any age. A
  /// failure on a later page ends pagination and the pages read so far are
  /// returned and cached.
  pub async fn fetch_github_issues(&self, use_cache: bool) -> Result<Vec<GitHubIssue>, FetchError> {
    let result = self
      .cache
      .fetch(ISSUES_KEY, self.settings.issues_ttl, use_cache, || {
        self.fetch_issue_pages()
      })
      .await
      .map_err(|e| FetchError::new(Resource::Issues, e))?;

    Ok(self.log_source(Resource::Issues, result))
  }

  async fn fetch_issue_pages(&self) -> Result<Vec<GitHubIssue>, UpstreamError> {
    let per_page = self.settings.per_page;
    let max_pages = self.settings.max_issue_pages;
    let mut all_issues = Vec::new();

    for page in 1..=max_pages {
      let issues = match self.api.list_issues(page, per_page).await {
        Ok(issues) => issues,
        Err(e) if page == 1 && all_issues.is_empty() => return Err(e),
        Err(e) => {
          warn!(page, error = %e, "Issue page failed, keeping pages fetched so far");
          break;
        }
      };

      let count = issues.len();
      if count == 0 {
        break;
      }
      all_issues.extend(issues);
      debug!(page, count, total = all_issues.len(), "Fetched issue page");

      if count < per_page as usize {
        break;
      }

      if page < max_pages {
        tokio::time::sleep(self.settings.page_delay).await;
      }
    }

    Ok(all_issues)
  }

  /// Current artifact set, flattened to one entry per (version, platform).
  pub async fn list_artifacts(&self) -> Result<Vec<ArtifactEntry>, FetchError> {
    let tags = self.fetch_github_tags(true).await?;
    Ok(artifacts::process_tags(&tags, Utc::now()).into_entries())
  }

  /// Filter, sort and paginate the artifact set.
  pub async fn get_artifacts(&self, query: &ArtifactsQuery) -> Result<Vec<ArtifactEntry>, FetchError> {
    let entries = self.list_artifacts().await?;
    Ok(artifacts::query::run(entries, query))
  }

  /// Like [`get_artifacts`](Self::get_artifacts), with pagination and per-platform stats.
  pub async fn get_artifact_page(&self, query: &ArtifactsQuery) -> Result<ArtifactPage, FetchError> {
    let entries = self.list_artifacts().await?;
    Ok(artifacts::summary::build_page(entries, query))
  }

  fn log_source<T>(&self, resource: Resource, result: CacheResult<T>) -> T {
    match result.source {
      CacheSource::Network => {
        let limit = self.rate_limit();
        debug!(
          %resource,
          remaining = ?limit.remaining,
          reset_at = ?limit.reset_at,
          "Fetched from GitHub"
        );
        if limit.remaining == Some(0) {
          warn!(%resource, reset_at = ?limit.reset_at, "GitHub rate limit exhausted");
        }
      }
      CacheSource::CacheFresh => debug!(%resource, cached_at = ?result.cached_at, "Served from cache"),
      CacheSource::CacheStale => {
        warn!(%resource, cached_at = ?result.cached_at, "Serving stale cached data")
      }
    }
    result.data
  }
}
