//! Turns raw release tags into per-platform artifacts.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::types::{Artifact, ArtifactData, Platform, SupportStatus};
use crate::github::GitHubTag;

/// Tags that name a server build: `vMAJOR.MINOR.PATCH.BUILD`.
static ARTIFACT_TAG: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^v[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+$").expect("valid regex"));

static BUILD_NUMBER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"v[0-9]+\.[0-9]+\.[0-9]+\.([0-9]+)$").expect("valid regex"));

const ARTIFACTS_BASE_URL: &str = "https://runtime.fivem.net/artifacts/fivem";

/// Estimated Windows download size. Not measured.
pub const WINDOWS_SIZE: u64 = 850 * 1024 * 1024;
/// Estimated Linux download size. Not measured.
pub const LINUX_SIZE: u64 = 400 * 1024 * 1024;

/// Known-good builds used when no upstream tag is usable.
pub const FALLBACK_BUILDS: [(&str, &str); 3] = [
  ("24769", "ad6c90072e62cdb7ee0dcc943d7ded8a5107d542"),
  ("24574", "779c1fa38ec01b33d79a5e994b7e0c1a0bbcg421"),
  ("24573", "b85db86b37fdcab942859d3ef31cc4bd43eee8f6"),
];

pub fn is_artifact_tag(name: &str) -> bool {
  ARTIFACT_TAG.is_match(name)
}

/// Build number from a tag name, or 0 when there isn't a usable one.
pub fn extract_build_number(tag_name: &str) -> u64 {
  BUILD_NUMBER
    .captures(tag_name)
    .and_then(|caps| caps.get(1))
    .and_then(|m| m.as_str().parse().ok())
    .unwrap_or(0)
}

pub fn download_url(platform: Platform, version: &str, hash: &str) -> String {
  match platform {
    Platform::Windows => format!(
      "{}/build_server_windows/master/{}-{}/server.zip",
      ARTIFACTS_BASE_URL, version, hash
    ),
    Platform::Linux => format!(
      "{}/build_proot_linux/master/{}-{}/fx.tar.xz",
      ARTIFACTS_BASE_URL, version, hash
    ),
  }
}

pub fn estimate_size(platform: Platform) -> u64 {
  match platform {
    Platform::Windows => WINDOWS_SIZE,
    Platform::Linux => LINUX_SIZE,
  }
}

fn build_artifact(platform: Platform, build: u64, hash: &str, date: &str) -> Artifact {
  let version = build.to_string();
  Artifact {
    url: download_url(platform, &version, hash),
    size: estimate_size(platform),
    version,
    hash: hash.to_string(),
    platform,
    date: date.to_string(),
    support_status: SupportStatus::from_build(build),
  }
}

fn insert_both_platforms(data: &mut ArtifactData, build: u64, hash: &str, date: &str) {
  for platform in Platform::ALL {
    data.insert(build_artifact(platform, build, hash, date));
  }
}

/// Process raw tags into artifact data.
///
/// Every tag matching `vMAJOR.MINOR.PATCH.BUILD` yields one Windows and one
/// Linux artifact. All artifacts in the batch are stamped with `now`, not the
/// tag's own date. With no matching tag the [`FALLBACK_BUILDS`] are used.
pub fn process_tags(tags: &[GitHubTag], now: DateTime<Utc>) -> ArtifactData {
  let mut builds: Vec<(u64, &GitHubTag)> = tags
    .iter()
    .filter(|tag| is_artifact_tag(&tag.name))
    .map(|tag| (extract_build_number(&tag.name), tag))
    .collect();

  // Stable, so duplicate build numbers keep their upstream order.
  builds.sort_by(|a, b| b.0.cmp(&a.0));

  let date = format_date(now);
  let mut data = ArtifactData::default();
  for (build, tag) in &builds {
    insert_both_platforms(&mut data, *build, &tag.commit.sha, &date);
  }

  if data.windows.is_empty() {
    info!(tags = tags.len(), "No artifact tags found, using fallback builds");
    return fallback_data(now);
  }

  debug!(
    tags = tags.len(),
    artifacts = data.len(),
    "Processed tags into artifacts"
  );
  data
}

/// The hardcoded fallback set, on both platforms.
pub fn fallback_data(now: DateTime<Utc>) -> ArtifactData {
  let date = format_date(now);
  let mut data = ArtifactData::default();
  for (version, hash) in FALLBACK_BUILDS {
    let build = version.parse().unwrap_or(0);
    insert_both_platforms(&mut data, build, hash, &date);
  }
  data
}

fn format_date(now: DateTime<Utc>) -> String {
  now.to_rfc3339_opts(SecondsFormat::Secs, true)
}
