//! Serde types matching GitHub REST API responses.
//!
//! Only the fields the service reads are modelled; everything else in the
//! payload is ignored on decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entry from `GET /repos/{owner}/{repo}/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubTag {
  pub name: String,
  pub commit: TagCommit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCommit {
  pub sha: String,
}

impl GitHubTag {
  pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      commit: TagCommit { sha: sha.into() },
    }
  }
}

/// Entry from `GET /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubIssue {
  pub number: u64,
  pub title: String,
  pub state: String,
  pub url: String,
  #[serde(default)]
  pub body: Option<String>,
  #[serde(default)]
  pub labels: Vec<IssueLabel>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLabel {
  pub name: String,
}

/// Rate limit state reported by the last API response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
  /// `x-ratelimit-remaining`
  pub remaining: Option<u64>,
  /// `x-ratelimit-reset`, converted from epoch seconds
  pub reset_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_tag_decodes_from_api_payload() {
    let payload = json!({
      "name": "v1.0.0.24769",
      "zipball_url": "https://api.github.com/repos/citizenfx/fivem/zipball/refs/tags/v1.0.0.24769",
      "tarball_url": "https://api.github.com/repos/citizenfx/fivem/tarball/refs/tags/v1.0.0.24769",
      "commit": {
        "sha": "ad6c90072e62cdb7ee0dcc943d7ded8a5107d542",
        "url": "https://api.github.com/repos/citizenfx/fivem/commits/ad6c9007"
      },
      "node_id": "REF_abc"
    });

    let tag: GitHubTag = serde_json::from_value(payload).unwrap();
    assert_eq!(
      tag,
      GitHubTag::new("v1.0.0.24769", "ad6c90072e62cdb7ee0dcc943d7ded8a5107d542")
    );
  }

  #[test]
  fn test_issue_decodes_with_null_body() {
    let payload = json!({
      "number": 3021,
      "title": "Server crashes on startup",
      "state": "open",
      "url": "https://api.github.com/repos/citizenfx/fivem/issues/3021",
      "body": null,
      "labels": [{ "id": 1, "name": "bug", "color": "d73a4a" }],
      "created_at": "2025-01-04T10:00:00Z",
      "updated_at": "2025-01-05T12:30:00Z"
    });

    let issue: GitHubIssue = serde_json::from_value(payload).unwrap();
    assert_eq!(issue.number, 3021);
    assert!(issue.body.is_none());
    assert_eq!(issue.labels[0].name, "bug");
    assert!(issue.updated_at > issue.created_at);
  }
}
