//! Query results with pagination and per-platform metadata.

use serde::Serialize;

use super::query::{self, ArtifactsQuery};
use super::types::{ArtifactEntry, Platform, SupportStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub limit: usize,
  pub offset: i64,
  /// Entries left after filtering
  pub filtered: usize,
  /// Entries before filtering
  pub total: usize,
  pub current_page: usize,
  pub total_pages: usize,
}

impl Pagination {
  pub fn new(limit: usize, offset: i64, filtered: usize, total: usize) -> Self {
    let limit = limit.max(1);
    let start = usize::try_from(offset).unwrap_or(0);
    Self {
      limit,
      offset,
      filtered,
      total,
      current_page: start / limit + 1,
      total_pages: filtered.div_ceil(limit),
    }
  }
}

/// Counts and highlights for one platform, over the unfiltered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
  pub platform: Platform,
  pub total: usize,
  pub filtered: usize,
  pub recommended: usize,
  pub latest: usize,
  pub active: usize,
  pub deprecated: usize,
  pub eol: usize,
  /// Highest build on this platform
  pub latest_build: Option<ArtifactEntry>,
  /// Highest build with `recommended` status
  pub recommended_build: Option<ArtifactEntry>,
}

impl PlatformStats {
  fn collect(platform: Platform, all: &[ArtifactEntry], filtered: &[ArtifactEntry]) -> Self {
    let mut stats = Self {
      platform,
      total: 0,
      filtered: filtered.iter().filter(|e| e.platform == platform).count(),
      recommended: 0,
      latest: 0,
      active: 0,
      deprecated: 0,
      eol: 0,
      latest_build: None,
      recommended_build: None,
    };

    let highest = |current: &Option<ArtifactEntry>, candidate: &ArtifactEntry| match current {
      Some(best) => query::parse_version(&candidate.version) > query::parse_version(&best.version),
      None => true,
    };

    for entry in all.iter().filter(|e| e.platform == platform) {
      stats.total += 1;
      match entry.support_status {
        SupportStatus::Recommended => stats.recommended += 1,
        SupportStatus::Latest => stats.latest += 1,
        SupportStatus::Active => stats.active += 1,
        SupportStatus::Deprecated => stats.deprecated += 1,
        SupportStatus::Eol => stats.eol += 1,
      }

      if highest(&stats.latest_build, entry) {
        stats.latest_build = Some(entry.clone());
      }
      if entry.support_status == SupportStatus::Recommended
        && highest(&stats.recommended_build, entry)
      {
        stats.recommended_build = Some(entry.clone());
      }
    }

    stats
  }
}

/// How many filtered entries carry a status, with what that status means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
  pub status: SupportStatus,
  pub description: &'static str,
  pub count: usize,
}

fn count_statuses(filtered: &[ArtifactEntry]) -> Vec<StatusCount> {
  SupportStatus::ALL
    .into_iter()
    .map(|status| StatusCount {
      status,
      description: status.description(),
      count: filtered.iter().filter(|e| e.support_status == status).count(),
    })
    .collect()
}

/// One page of query results plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactPage {
  pub artifacts: Vec<ArtifactEntry>,
  pub pagination: Pagination,
  /// Stats for the platforms the query covers
  pub stats: Vec<PlatformStats>,
  /// Every status tier, counted over the filtered entries
  pub statuses: Vec<StatusCount>,
}

/// Run `query` over `entries` and describe the result.
///
/// The artifacts are exactly what [`query::run`] returns.
pub fn build_page(entries: Vec<ArtifactEntry>, query: &ArtifactsQuery) -> ArtifactPage {
  let platforms: Vec<Platform> = Platform::ALL
    .into_iter()
    .filter(|p| query.platform_filter().map_or(true, |f| f == p.as_str()))
    .collect();

  let total = entries.len();
  let mut filtered = query::filter_artifacts(entries.clone(), query);
  let stats = platforms
    .iter()
    .map(|&p| PlatformStats::collect(p, &entries, &filtered))
    .collect();
  let statuses = count_statuses(&filtered);

  query::sort_artifacts(&mut filtered, &query.sort_by, query.sort_order);
  let limit = query.effective_limit();
  let pagination = Pagination::new(limit, query.offset, filtered.len(), total);

  ArtifactPage {
    artifacts: query::paginate_artifacts(filtered, limit, query.offset),
    pagination,
    stats,
    statuses,
  }
}
