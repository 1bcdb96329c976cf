//! In-memory store backend.
//!
//! Default backend for single-node deployments and the substitution point for
//! exercising the resolution/publication/deletion pipelines in tests without
//! a database.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ArtifactFilter, ReleaseFilter, ReleaseStore};
use crate::error::Result;
use crate::models::{Artifact, Release};

/// In-memory release/artifact store
#[derive(Default)]
pub struct MemoryStore {
    releases: RwLock<HashMap<String, Release>>,
    artifacts: RwLock<HashMap<String, Artifact>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReleaseStore for MemoryStore {
    async fn insert_release(&self, release: Release) -> Result<Release> {
        let mut releases = self.releases.write().await;
        releases.insert(release.id.clone(), release.clone());
        Ok(release)
    }

    async fn find_releases(
        &self,
        filter: &ReleaseFilter,
        artifacts: &ArtifactFilter,
        limit: i64,
    ) -> Result<Vec<Release>> {
        let releases = self.releases.read().await;
        let all_artifacts = self.artifacts.read().await;

        let mut matched: Vec<Release> = releases
            .values()
            .filter(|r| {
                filter.name.as_ref().map_or(true, |n| n == &r.name)
                    && filter
                        .channel
                        .as_ref()
                        .map_or(true, |c| Some(c) == r.channel.as_ref())
                    && filter.flavor.as_ref().map_or(true, |f| f == &r.flavor)
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched.truncate(limit.max(0) as usize);

        for release in &mut matched {
            let mut populated: Vec<Artifact> = all_artifacts
                .values()
                .filter(|a| a.release_id == release.id && artifacts.matches(a))
                .cloned()
                .collect();
            populated.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            release.artifacts = populated;
        }

        Ok(matched)
    }

    async fn find_releases_by_ids(&self, ids: &[String]) -> Result<Vec<Release>> {
        let releases = self.releases.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| releases.get(id).cloned())
            .collect())
    }

    async fn find_artifacts(&self, filter: &ArtifactFilter, limit: i64) -> Result<Vec<Artifact>> {
        let artifacts = self.artifacts.read().await;
        let mut matched: Vec<Artifact> = artifacts
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched.truncate(limit.max(0) as usize);
        Ok(matched)
    }

    async fn find_artifact(&self, id: &str) -> Result<Option<Artifact>> {
        let artifacts = self.artifacts.read().await;
        Ok(artifacts.get(id).cloned())
    }

    async fn upsert_artifact(&self, artifact: Artifact) -> Result<Artifact> {
        let mut artifacts = self.artifacts.write().await;
        artifacts.insert(artifact.id.clone(), artifact.clone());
        Ok(artifact)
    }

    async fn delete_artifact(&self, id: &str) -> Result<bool> {
        let mut artifacts = self.artifacts.write().await;
        Ok(artifacts.remove(id).is_some())
    }
}
