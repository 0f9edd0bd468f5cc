//! Filter, sort and paginate artifact entries.
//!
//! The pipeline always runs in that order:
//!
//! ```ignore
//! let page = query::run(entries, &ArtifactsQuery {
//!     platform: Some("linux".into()),
//!     sort_by: SortKey::Date,
//!     limit: 10,
//!     ..Default::default()
//! });
//! ```

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::types::{ArtifactEntry, SupportStatus};

/// Page size used when a query leaves `limit` at 0.
pub const DEFAULT_LIMIT: usize = 50;

/// Field to sort by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
  /// Leading digits of the version, numerically
  #[default]
  Version,
  /// Artifact date, chronologically
  Date,
  /// Size in bytes
  Size,
  /// Any other field name: version strings compared lexicographically
  #[serde(untagged)]
  Other(String),
}

impl From<&str> for SortKey {
  fn from(s: &str) -> Self {
    match s {
      "" | "version" => SortKey::Version,
      "date" => SortKey::Date,
      "size" => SortKey::Size,
      other => SortKey::Other(other.to_string()),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl From<&str> for SortOrder {
  /// `"asc"` sorts ascending; anything else, including empty, descending.
  fn from(s: &str) -> Self {
    if s == "asc" {
      SortOrder::Asc
    } else {
      SortOrder::Desc
    }
  }
}

/// Query over the flattened artifact set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactsQuery {
  /// Exact, case-sensitive platform name. `None`, empty and `"all"` match everything.
  pub platform: Option<String>,
  /// Exact version match
  pub version: Option<String>,
  pub status: Option<SupportStatus>,
  /// Keep `eol` entries
  pub include_eol: bool,
  pub sort_by: SortKey,
  pub sort_order: SortOrder,
  /// Page size; 0 means [`DEFAULT_LIMIT`]
  pub limit: usize,
  /// Negative offsets produce an empty page
  pub offset: i64,
}

impl ArtifactsQuery {
  pub fn effective_limit(&self) -> usize {
    if self.limit == 0 {
      DEFAULT_LIMIT
    } else {
      self.limit
    }
  }

  pub(crate) fn platform_filter(&self) -> Option<&str> {
    match self.platform.as_deref() {
      None | Some("") | Some("all") => None,
      Some(platform) => Some(platform),
    }
  }
}

/// Apply every filter the query sets.
///
/// Filters are independent, so their order doesn't change the result. Input
/// order is preserved.
pub fn filter_artifacts(mut entries: Vec<ArtifactEntry>, query: &ArtifactsQuery) -> Vec<ArtifactEntry> {
  if let Some(platform) = query.platform_filter() {
    entries.retain(|e| e.platform.as_str() == platform);
  }

  if let Some(version) = query.version.as_deref().filter(|v| !v.is_empty()) {
    entries.retain(|e| e.version == version);
  }

  if let Some(status) = query.status {
    entries.retain(|e| e.support_status == status);
  }

  if !query.include_eol {
    entries.retain(|e| e.support_status != SupportStatus::Eol);
  }

  entries
}

/// Integer value of the leading ASCII digits; 0 when there are none.
pub fn parse_version(version: &str) -> u64 {
  let end = version
    .find(|c: char| !c.is_ascii_digit())
    .unwrap_or(version.len());
  version[..end].parse().unwrap_or(0)
}

fn parse_date(date: &str) -> Option<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(date).ok()
}

/// Ascending comparison of two entries on `key`.
pub fn compare(a: &ArtifactEntry, b: &ArtifactEntry, key: &SortKey) -> Ordering {
  match key {
    SortKey::Version => parse_version(&a.version).cmp(&parse_version(&b.version)),
    // Unparseable dates sort as the earliest possible instant, equal to each other.
    SortKey::Date => parse_date(&a.date).cmp(&parse_date(&b.date)),
    SortKey::Size => a.size.cmp(&b.size),
    SortKey::Other(_) => a.version.cmp(&b.version),
  }
}

/// Stable sort; entries that compare equal keep their relative order.
pub fn sort_artifacts(entries: &mut [ArtifactEntry], key: &SortKey, order: SortOrder) {
  entries.sort_by(|a, b| {
    let ordering = compare(a, b, key);
    match order {
      SortOrder::Asc => ordering,
      SortOrder::Desc => ordering.reverse(),
    }
  });
}

/// Slice `[offset, min(offset + limit, len))`; empty when the offset is out of range.
pub fn paginate_artifacts(entries: Vec<ArtifactEntry>, limit: usize, offset: i64) -> Vec<ArtifactEntry> {
  let start = match usize::try_from(offset) {
    Ok(start) if start < entries.len() => start,
    _ => return Vec::new(),
  };

  entries.into_iter().skip(start).take(limit).collect()
}

/// Filter, sort, then paginate.
pub fn run(entries: Vec<ArtifactEntry>, query: &ArtifactsQuery) -> Vec<ArtifactEntry> {
  let mut filtered = filter_artifacts(entries, query);
  sort_artifacts(&mut filtered, &query.sort_by, query.sort_order);
  paginate_artifacts(filtered, query.effective_limit(), query.offset)
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::artifacts::types::Platform;

  pub(crate) fn entry(version: &str, platform: Platform) -> ArtifactEntry {
    let build = parse_version(version);
    ArtifactEntry {
      version: version.to_string(),
      hash: format!("hash-{version}"),
      platform,
      date: "2025-01-01T00:00:00Z".to_string(),
      support_status: SupportStatus::from_build(build),
      url: format!("https://example.com/{platform}/{version}"),
      size: 0,
    }
  }

  fn versions(entries: &[ArtifactEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.version.as_str()).collect()
  }

  fn mixed() -> Vec<ArtifactEntry> {
    vec![
      entry("24769", Platform::Windows),
      entry("24100", Platform::Windows),
      entry("19000", Platform::Windows),
      entry("24769", Platform::Linux),
      entry("23500", Platform::Linux),
      entry("19000", Platform::Linux),
    ]
  }

  #[test]
  fn test_parse_version() {
    assert_eq!(parse_version("24769"), 24769);
    assert_eq!(parse_version("123abc"), 123);
    assert_eq!(parse_version("abc"), 0);
    assert_eq!(parse_version(""), 0);
    assert_eq!(parse_version("99999999999999999999999"), 0);
  }

  #[test]
  fn test_sort_key_and_order_from_str() {
    assert_eq!(SortKey::from(""), SortKey::Version);
    assert_eq!(SortKey::from("date"), SortKey::Date);
    assert_eq!(SortKey::from("size"), SortKey::Size);
    assert_eq!(SortKey::from("hash"), SortKey::Other("hash".to_string()));
    assert_eq!(SortOrder::from("asc"), SortOrder::Asc);
    assert_eq!(SortOrder::from("ASC"), SortOrder::Desc);
    assert_eq!(SortOrder::from(""), SortOrder::Desc);
  }

  #[test]
  fn test_cleared_filters_with_eol_is_identity() {
    let input = mixed();
    let query = ArtifactsQuery {
      include_eol: true,
      ..Default::default()
    };
    assert_eq!(filter_artifacts(input.clone(), &query), input);
  }

  #[test]
  fn test_eol_excluded_by_default() {
    let filtered = filter_artifacts(mixed(), &ArtifactsQuery::default());
    assert_eq!(filtered.len(), 4);
    assert!(filtered.iter().all(|e| e.support_status != SupportStatus::Eol));
  }

  #[test]
  fn test_platform_filter() {
    let all = ArtifactsQuery {
      platform: Some("all".to_string()),
      include_eol: true,
      ..Default::default()
    };
    assert_eq!(filter_artifacts(mixed(), &all).len(), 6);

    let linux = ArtifactsQuery {
      platform: Some("linux".to_string()),
      include_eol: true,
      ..Default::default()
    };
    let filtered = filter_artifacts(mixed(), &linux);
    assert_eq!(versions(&filtered), vec!["24769", "23500", "19000"]);

    // Case-sensitive.
    let upper = ArtifactsQuery {
      platform: Some("Linux".to_string()),
      ..Default::default()
    };
    assert!(filter_artifacts(mixed(), &upper).is_empty());
  }

  #[test]
  fn test_version_and_status_filters() {
    let by_version = ArtifactsQuery {
      version: Some("24769".to_string()),
      ..Default::default()
    };
    let filtered = filter_artifacts(mixed(), &by_version);
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|e| e.version == "24769"));

    let by_status = ArtifactsQuery {
      status: Some(SupportStatus::Latest),
      ..Default::default()
    };
    assert_eq!(versions(&filter_artifacts(mixed(), &by_status)), vec!["24100"]);

    // Asking for eol without include_eol finds nothing.
    let eol_only = ArtifactsQuery {
      status: Some(SupportStatus::Eol),
      ..Default::default()
    };
    assert!(filter_artifacts(mixed(), &eol_only).is_empty());
  }

  #[test]
  fn test_filters_compose_in_any_order() {
    let platform = ArtifactsQuery {
      platform: Some("windows".to_string()),
      include_eol: true,
      ..Default::default()
    };
    let status = ArtifactsQuery {
      status: Some(SupportStatus::Recommended),
      include_eol: true,
      ..Default::default()
    };
    let combined = ArtifactsQuery {
      platform: platform.platform.clone(),
      status: status.status,
      include_eol: true,
      ..Default::default()
    };

    let a = filter_artifacts(filter_artifacts(mixed(), &platform), &status);
    let b = filter_artifacts(filter_artifacts(mixed(), &status), &platform);
    let c = filter_artifacts(mixed(), &combined);
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(versions(&a), vec!["24769"]);
  }

  #[test]
  fn test_version_sort() {
    let mut entries = vec![
      entry("100", Platform::Windows),
      entry("50", Platform::Windows),
      entry("200", Platform::Windows),
    ];

    sort_artifacts(&mut entries, &SortKey::Version, SortOrder::Desc);
    assert_eq!(versions(&entries), vec!["200", "100", "50"]);

    sort_artifacts(&mut entries, &SortKey::Version, SortOrder::Asc);
    assert_eq!(versions(&entries), vec!["50", "100", "200"]);
  }

  #[test]
  fn test_sort_is_stable_on_ties() {
    let mut entries = vec![
      entry("100", Platform::Linux),
      entry("200", Platform::Windows),
      entry("100", Platform::Windows),
    ];

    sort_artifacts(&mut entries, &SortKey::Version, SortOrder::Desc);
    let order: Vec<(&str, Platform)> = entries
      .iter()
      .map(|e| (e.version.as_str(), e.platform))
      .collect();
    assert_eq!(
      order,
      vec![
        ("200", Platform::Windows),
        ("100", Platform::Linux),
        ("100", Platform::Windows),
      ]
    );

    sort_artifacts(&mut entries, &SortKey::Version, SortOrder::Asc);
    assert_eq!(entries[0].platform, Platform::Linux);
    assert_eq!(entries[1].platform, Platform::Windows);
  }

  #[test]
  fn test_date_sort_with_unparseable_dates() {
    let mut entries = vec![
      entry("1", Platform::Windows),
      entry("2", Platform::Windows),
      entry("3", Platform::Windows),
      entry("4", Platform::Windows),
    ];
    entries[0].date = "2025-03-01T00:00:00Z".to_string();
    entries[1].date = "not a date".to_string();
    entries[2].date = "2025-01-01T00:00:00+02:00".to_string();
    entries[3].date = String::new();

    sort_artifacts(&mut entries, &SortKey::Date, SortOrder::Asc);
    assert_eq!(versions(&entries), vec!["2", "4", "3", "1"]);

    sort_artifacts(&mut entries, &SortKey::Date, SortOrder::Desc);
    assert_eq!(versions(&entries), vec!["1", "3", "2", "4"]);
  }

  #[test]
  fn test_size_sort() {
    let mut entries = vec![
      entry("1", Platform::Windows),
      entry("1", Platform::Linux),
    ];
    entries[0].size = 850;
    entries[1].size = 400;

    sort_artifacts(&mut entries, &SortKey::Size, SortOrder::Asc);
    assert_eq!(entries[0].size, 400);

    sort_artifacts(&mut entries, &SortKey::Size, SortOrder::Desc);
    assert_eq!(entries[0].size, 850);
  }

  #[test]
  fn test_unknown_key_sorts_lexicographically() {
    let mut entries = vec![
      entry("9", Platform::Windows),
      entry("10", Platform::Windows),
      entry("100", Platform::Windows),
    ];

    sort_artifacts(&mut entries, &SortKey::from("hash"), SortOrder::Asc);
    assert_eq!(versions(&entries), vec!["10", "100", "9"]);
  }

  #[test]
  fn test_pagination() {
    let entries: Vec<ArtifactEntry> = (0..10)
      .map(|i| entry(&i.to_string(), Platform::Windows))
      .collect();

    let page = paginate_artifacts(entries.clone(), 3, 7);
    assert_eq!(page, entries[7..10].to_vec());

    assert!(paginate_artifacts(entries.clone(), 3, 10).is_empty());
    assert!(paginate_artifacts(entries.clone(), 3, -1).is_empty());
    assert_eq!(paginate_artifacts(entries.clone(), 3, 0), entries[0..3].to_vec());
    assert_eq!(paginate_artifacts(entries.clone(), 50, 8).len(), 2);
    assert!(paginate_artifacts(Vec::new(), 3, 0).is_empty());
  }

  #[test]
  fn test_run_defaults_limit_to_fifty() {
    let entries: Vec<ArtifactEntry> = (0..60)
      .map(|i| entry(&(24000 + i).to_string(), Platform::Windows))
      .collect();

    let page = run(entries, &ArtifactsQuery::default());
    assert_eq!(page.len(), DEFAULT_LIMIT);
    assert_eq!(page[0].version, "24059");
    assert_eq!(page[49].version, "24010");
  }

  #[test]
  fn test_run_pipeline() {
    let query = ArtifactsQuery {
      platform: Some("windows".to_string()),
      sort_order: SortOrder::Asc,
      limit: 1,
      offset: 1,
      ..Default::default()
    };

    let page = run(mixed(), &query);
    assert_eq!(versions(&page), vec!["24769"]);
  }
}
