//! Artifact domain types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  Windows,
  Linux,
}

impl Platform {
  pub const ALL: [Platform; 2] = [Platform::Windows, Platform::Linux];

  pub fn as_str(&self) -> &'static str {
    match self {
      Platform::Windows => "windows",
      Platform::Linux => "linux",
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Lifecycle tier of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportStatus {
  Recommended,
  Latest,
  Active,
  Deprecated,
  Eol,
}

impl SupportStatus {
  /// Every tier, best supported first.
  pub const ALL: [SupportStatus; 5] = [
    SupportStatus::Recommended,
    SupportStatus::Latest,
    SupportStatus::Active,
    SupportStatus::Deprecated,
    SupportStatus::Eol,
  ];

  /// Tier for a build number.
  ///
  /// | build ≥ | status      |
  /// |---------|-------------|
  /// | 24500   | recommended |
  /// | 24000   | latest      |
  /// | 23000   | active      |
  /// | 20000   | deprecated  |
  /// | else    | eol         |
  pub fn from_build(build: u64) -> Self {
    match build {
      24500.. => SupportStatus::Recommended,
      24000.. => SupportStatus::Latest,
      23000.. => SupportStatus::Active,
      20000.. => SupportStatus::Deprecated,
      _ => SupportStatus::Eol,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      SupportStatus::Recommended => "recommended",
      SupportStatus::Latest => "latest",
      SupportStatus::Active => "active",
      SupportStatus::Deprecated => "deprecated",
      SupportStatus::Eol => "eol",
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      SupportStatus::Recommended => "Fully supported, recommended for production use",
      SupportStatus::Latest => "Most recent build, supported for testing",
      SupportStatus::Active => "Currently supported",
      SupportStatus::Deprecated => "Support ended, but still usable",
      SupportStatus::Eol => "End of life, not supported and may be inaccessible from server browser",
    }
  }
}

impl fmt::Display for SupportStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown support status '{0}' (expected recommended, latest, active, deprecated or eol)")]
pub struct ParseStatusError(String);

impl FromStr for SupportStatus {
  type Err = ParseStatusError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "recommended" => Ok(SupportStatus::Recommended),
      "latest" => Ok(SupportStatus::Latest),
      "active" => Ok(SupportStatus::Active),
      "deprecated" => Ok(SupportStatus::Deprecated),
      "eol" => Ok(SupportStatus::Eol),
      other => Err(ParseStatusError(other.to_string())),
    }
  }
}

/// One platform-specific downloadable build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
  /// Build number, e.g. "24769"
  pub version: String,
  pub hash: String,
  pub platform: Platform,
  /// RFC 3339 timestamp
  pub date: String,
  pub support_status: SupportStatus,
  pub url: String,
  /// Size in bytes (estimate)
  pub size: u64,
}

/// Artifacts keyed by version, one map per platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactData {
  pub windows: HashMap<String, Artifact>,
  pub linux: HashMap<String, Artifact>,
}

impl ArtifactData {
  pub fn insert(&mut self, artifact: Artifact) {
    let map = match artifact.platform {
      Platform::Windows => &mut self.windows,
      Platform::Linux => &mut self.linux,
    };
    map.insert(artifact.version.clone(), artifact);
  }

  pub fn len(&self) -> usize {
    self.windows.len() + self.linux.len()
  }

  pub fn is_empty(&self) -> bool {
    self.windows.is_empty() && self.linux.is_empty()
  }

  /// Flatten into entries: every Windows artifact, then every Linux one.
  ///
  /// Order within a platform follows map iteration and is unspecified.
  pub fn into_entries(self) -> Vec<ArtifactEntry> {
    self
      .windows
      .into_iter()
      .chain(self.linux)
      .map(|(version, artifact)| ArtifactEntry {
        version,
        ..ArtifactEntry::from(artifact)
      })
      .collect()
  }
}

/// Flattened, platform-tagged view of an [`Artifact`] used for querying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactEntry {
  pub version: String,
  pub hash: String,
  pub platform: Platform,
  pub date: String,
  pub support_status: SupportStatus,
  pub url: String,
  pub size: u64,
}

impl From<Artifact> for ArtifactEntry {
  fn from(artifact: Artifact) -> Self {
    Self {
      version: artifact.version,
      hash: artifact.hash,
      platform: artifact.platform,
      date: artifact.date,
      support_status: artifact.support_status,
      url: artifact.url,
      size: artifact.size,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_boundaries() {
    let cases = [
      (30000, SupportStatus::Recommended),
      (24500, SupportStatus::Recommended),
      (24499, SupportStatus::Latest),
      (24000, SupportStatus::Latest),
      (23999, SupportStatus::Active),
      (23000, SupportStatus::Active),
      (22999, SupportStatus::Deprecated),
      (20000, SupportStatus::Deprecated),
      (19999, SupportStatus::Eol),
      (0, SupportStatus::Eol),
    ];

    for (build, expected) in cases {
      assert_eq!(SupportStatus::from_build(build), expected, "build {build}");
    }
  }

  #[test]
  fn test_status_parse_and_display() {
    for status in SupportStatus::ALL {
      assert_eq!(status.as_str().parse::<SupportStatus>(), Ok(status));
    }
    assert!("EOL".parse::<SupportStatus>().is_err());
  }

  #[test]
  fn test_status_descriptions() {
    let expected = [
      (SupportStatus::Recommended, "Fully supported, recommended for production use"),
      (SupportStatus::Latest, "Most recent build, supported for testing"),
      (SupportStatus::Active, "Currently supported"),
      (SupportStatus::Deprecated, "Support ended, but still usable"),
      (
        SupportStatus::Eol,
        "End of life, not supported and may be inaccessible from server browser",
      ),
    ];

    assert_eq!(expected.map(|(status, _)| status), SupportStatus::ALL);
    for (status, description) in expected {
      assert_eq!(status.description(), description);
    }
  }

  #[test]
  fn test_entry_serializes_camel_case() {
    let entry = ArtifactEntry {
      version: "24769".to_string(),
      hash: "abc".to_string(),
      platform: Platform::Linux,
      date: "2025-01-01T00:00:00Z".to_string(),
      support_status: SupportStatus::Recommended,
      url: "https://example.com/fx.tar.xz".to_string(),
      size: 1,
    };

    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["supportStatus"], "recommended");
    assert_eq!(value["platform"], "linux");
  }

  #[test]
  fn test_into_entries_puts_windows_first() {
    let mut data = ArtifactData::default();
    for (version, platform) in [("1", Platform::Linux), ("2", Platform::Windows), ("3", Platform::Linux)] {
      data.insert(Artifact {
        version: version.to_string(),
        hash: String::new(),
        platform,
        date: String::new(),
        support_status: SupportStatus::Eol,
        url: String::new(),
        size: 0,
      });
    }

    let entries = data.into_entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].platform, Platform::Windows);
    assert!(entries[1..].iter().all(|e| e.platform == Platform::Linux));
  }
}
