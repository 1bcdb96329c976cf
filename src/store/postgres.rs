//! Postgres store backend.
//!
//! Uses the runtime sqlx query API with `$n IS NULL OR` predicates so the
//! truthy-equality filter contract matches the in-memory backend exactly.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;

use super::{ArtifactFilter, ReleaseFilter, ReleaseStore};
use crate::error::Result;
use crate::models::{Artifact, Release};

/// Postgres-backed release/artifact store
pub struct PostgresStore {
    db: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing connection pool
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Fetch artifacts for the given release ids, matching the filter,
    /// grouped by release id and ordered newest first within each group.
    async fn artifacts_for_releases(
        &self,
        release_ids: &[String],
        filter: &ArtifactFilter,
    ) -> Result<HashMap<String, Vec<Artifact>>> {
        let rows = sqlx::query_as::<_, Artifact>(
            r#"
            SELECT id, release_id, name, platform, filetype, hash, size, storage_key, created_at
            FROM artifacts
            WHERE release_id = ANY($1)
              AND ($2::text[] IS NULL OR platform = ANY($2))
              AND ($3::text IS NULL OR filetype = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(release_ids)
        .bind(filter.platforms.as_deref())
        .bind(filter.filetype.as_deref())
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<String, Vec<Artifact>> = HashMap::new();
        for artifact in rows {
            grouped
                .entry(artifact.release_id.clone())
                .or_default()
                .push(artifact);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl ReleaseStore for PostgresStore {
    async fn insert_release(&self, release: Release) -> Result<Release> {
        let inserted = sqlx::query_as::<_, Release>(
            r#"
            INSERT INTO releases (id, name, channel, flavor, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, channel, flavor, created_at
            "#,
        )
        .bind(&release.id)
        .bind(&release.name)
        .bind(&release.channel)
        .bind(&release.flavor)
        .bind(release.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(inserted)
    }

    async fn find_releases(
        &self,
        filter: &ReleaseFilter,
        artifacts: &ArtifactFilter,
        limit: i64,
    ) -> Result<Vec<Release>> {
        let mut releases = sqlx::query_as::<_, Release>(
            r#"
            SELECT id, name, channel, flavor, created_at
            FROM releases
            WHERE ($1::text IS NULL OR name = $1)
              AND ($2::text IS NULL OR channel = $2)
              AND ($3::text IS NULL OR flavor = $3)
            ORDER BY created_at DESC
            LIMIT $4
            "#,
        )
        .bind(filter.name.as_deref())
        .bind(filter.channel.as_deref())
        .bind(filter.flavor.as_deref())
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<String> = releases.iter().map(|r| r.id.clone()).collect();
        let mut grouped = self.artifacts_for_releases(&ids, artifacts).await?;
        for release in &mut releases {
            release.artifacts = grouped.remove(&release.id).unwrap_or_default();
        }

        Ok(releases)
    }

    async fn find_releases_by_ids(&self, ids: &[String]) -> Result<Vec<Release>> {
        let rows = sqlx::query_as::<_, Release>(
            r#"
            SELECT id, name, channel, flavor, created_at
            FROM releases
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        // Preserve the caller's id order.
        let mut by_id: HashMap<String, Release> =
            rows.into_iter().map(|r| (r.id.clone(), r)).collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn find_artifacts(&self, filter: &ArtifactFilter, limit: i64) -> Result<Vec<Artifact>> {
        let rows = sqlx::query_as::<_, Artifact>(
            r#"
            SELECT id, release_id, name, platform, filetype, hash, size, storage_key, created_at
            FROM artifacts
            WHERE ($1::text[] IS NULL OR platform = ANY($1))
              AND ($2::text IS NULL OR filetype = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(filter.platforms.as_deref())
        .bind(filter.filetype.as_deref())
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn find_artifact(&self, id: &str) -> Result<Option<Artifact>> {
        let row = sqlx::query_as::<_, Artifact>(
            r#"
            SELECT id, release_id, name, platform, filetype, hash, size, storage_key, created_at
            FROM artifacts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn upsert_artifact(&self, artifact: Artifact) -> Result<Artifact> {
        let upserted = sqlx::query_as::<_, Artifact>(
            r#"
            INSERT INTO artifacts (id, release_id, name, platform, filetype, hash, size, storage_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                release_id = EXCLUDED.release_id,
                name = EXCLUDED.name,
                platform = EXCLUDED.platform,
                filetype = EXCLUDED.filetype,
                hash = EXCLUDED.hash,
                size = EXCLUDED.size,
                storage_key = EXCLUDED.storage_key,
                created_at = EXCLUDED.created_at
            RETURNING id, release_id, name, platform, filetype, hash, size, storage_key, created_at
            "#,
        )
        .bind(&artifact.id)
        .bind(&artifact.release_id)
        .bind(&artifact.name)
        .bind(&artifact.platform)
        .bind(&artifact.filetype)
        .bind(&artifact.hash)
        .bind(artifact.size)
        .bind(&artifact.storage_key)
        .bind(artifact.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(upserted)
    }

    async fn delete_artifact(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM artifacts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
