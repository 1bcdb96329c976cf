//! Release/artifact store backends.
//!
//! The store is the narrow seam between the resolution/publication logic and
//! whatever holds the records. Filters use truthy-field equality: a `None`
//! field matches everything, a `Some` field matches exactly. Results are
//! always ordered by `created_at` descending; semantic re-ordering happens in
//! the resolution engine, not here.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Artifact, Release};

/// Truthy-equality filter over releases.
#[derive(Debug, Clone, Default)]
pub struct ReleaseFilter {
    pub name: Option<String>,
    pub channel: Option<String>,
    pub flavor: Option<String>,
}

/// Truthy-equality filter over artifacts. `platforms` matches any of the
/// listed labels.
#[derive(Debug, Clone, Default)]
pub struct ArtifactFilter {
    pub platforms: Option<Vec<String>>,
    pub filetype: Option<String>,
}

impl ArtifactFilter {
    /// Whether an artifact satisfies this filter.
    pub fn matches(&self, artifact: &Artifact) -> bool {
        if let Some(ref platforms) = self.platforms {
            if !platforms.iter().any(|p| p == &artifact.platform) {
                return false;
            }
        }
        if let Some(ref filetype) = self.filetype {
            if filetype != &artifact.filetype {
                return false;
            }
        }
        true
    }
}

/// Store holding release and artifact records.
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// Insert a release record.
    async fn insert_release(&self, release: Release) -> Result<Release>;

    /// Find releases matching the filter, newest `created_at` first, limited,
    /// each populated with the artifacts matching `artifacts`.
    async fn find_releases(
        &self,
        filter: &ReleaseFilter,
        artifacts: &ArtifactFilter,
        limit: i64,
    ) -> Result<Vec<Release>>;

    /// Fetch releases by exact id, preserving the order of `ids` (missing ids
    /// are skipped). Artifacts are not populated.
    async fn find_releases_by_ids(&self, ids: &[String]) -> Result<Vec<Release>>;

    /// Find artifacts matching the filter across all releases, newest first.
    async fn find_artifacts(&self, filter: &ArtifactFilter, limit: i64) -> Result<Vec<Artifact>>;

    /// Look up a single artifact by id.
    async fn find_artifact(&self, id: &str) -> Result<Option<Artifact>>;

    /// Insert an artifact, replacing any existing record with the same id.
    async fn upsert_artifact(&self, artifact: Artifact) -> Result<Artifact>;

    /// Delete an artifact record. Returns whether a record existed.
    async fn delete_artifact(&self, id: &str) -> Result<bool>;
}
