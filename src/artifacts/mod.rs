//! Artifact records derived from release tags, and queries over them.

pub mod processor;
pub mod query;
pub mod summary;
mod types;

pub use processor::{fallback_data, process_tags};
pub use query::{ArtifactsQuery, SortKey, SortOrder, DEFAULT_LIMIT};
pub use summary::{ArtifactPage, Pagination, PlatformStats, StatusCount};
pub use types::{Artifact, ArtifactData, ArtifactEntry, ParseStatusError, Platform, SupportStatus};
