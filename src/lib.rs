//! FiveM server artifacts derived from GitHub release tags.
//!
//! [`ArtifactsService`] fetches tags (and issues) from the GitHub API through
//! an in-memory time-bound cache, turns `vMAJOR.MINOR.PATCH.BUILD` tags into
//! Windows and Linux artifacts, and answers filter/sort/paginate queries over
//! them.
//!
//! ```no_run
//! use artifact_index::{ArtifactsQuery, ArtifactsService, Config};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ArtifactsService::from_config(&Config::default())?;
//! let latest_linux = service
//!   .get_artifacts(&ArtifactsQuery {
//!     platform: Some("linux".into()),
//!     limit: 5,
//!     ..Default::default()
//!   })
//!   .await?;
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod service;

pub use artifacts::{
  ArtifactData, ArtifactEntry, ArtifactPage, ArtifactsQuery, Platform, SortKey, SortOrder,
  SupportStatus,
};
pub use cache::CacheLayer;
pub use config::Config;
pub use error::{ConfigError, FetchError, UpstreamError};
pub use github::{GitHubApi, GitHubClient, GitHubIssue, GitHubTag};
pub use service::{ArtifactsService, FetchSettings};
