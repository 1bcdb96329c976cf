//! Asset publication and deletion pipelines.
//!
//! Publication validates the target release, fingerprints the uploaded bytes
//! according to the filetype policy, derives the canonical artifact id, and
//! commits bytes before the record. Deletion removes the record and the
//! bytes as a joint best-effort operation and never masks a partial outcome.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, error, info};

use crate::error::{AppError, Result};
use crate::models::{Artifact, Release};
use crate::services::hash_service;
use crate::storage::BlobStorage;
use crate::store::ReleaseStore;

/// Reserved manifest filename; generated at request time, never uploaded.
const RESERVED_MANIFEST: &str = "RELEASES";

/// One file submitted in a publication call.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Bytes,
}

/// Publication request.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Target release id; `{id}_default` is tried as a fallback.
    pub release_ref: String,
    /// Exactly one file must be present.
    pub files: Vec<UploadedFile>,
    /// Platform label the artifact was built for.
    pub platform: Option<String>,
    /// Optional display-name override for the stored record.
    pub name: Option<String>,
}

/// Asset publication/deletion service
pub struct AssetService {
    store: Arc<dyn ReleaseStore>,
    storage: Arc<dyn BlobStorage>,
}

impl AssetService {
    /// Create a new asset service
    pub fn new(store: Arc<dyn ReleaseStore>, storage: Arc<dyn BlobStorage>) -> Self {
        Self { store, storage }
    }

    /// Resolve the target release, accepting `{id}_default` when the exact id
    /// does not exist. When both exist the flavor-qualified id wins.
    async fn resolve_release(&self, release_ref: &str) -> Result<Release> {
        let candidates = vec![
            release_ref.to_string(),
            format!("{}_default", release_ref),
        ];
        let mut releases = self.store.find_releases_by_ids(&candidates).await?;
        releases
            .pop()
            .ok_or_else(|| AppError::NotFound("The specified release does not exist".into()))
    }

    /// Publish one uploaded file as an artifact of an existing release.
    pub async fn publish(&self, request: PublishRequest) -> Result<Artifact> {
        if request.release_ref.is_empty() {
            return Err(AppError::BadRequest("A release is required.".into()));
        }

        // Existence check happens before any side effect.
        let release = self.resolve_release(&request.release_ref).await?;

        if request.files.len() != 1 {
            return Err(AppError::BadRequest(
                "Exactly one file must be uploaded per call.".into(),
            ));
        }
        let file = &request.files[0];

        if file.filename == RESERVED_MANIFEST {
            return Err(AppError::BadRequest(
                "The RELEASES file should not be uploaded since the release server \
                 will generate it at request time"
                    .into(),
            ));
        }

        let platform = request
            .platform
            .ok_or_else(|| AppError::BadRequest("A platform is required.".into()))?;

        let filetype = file
            .filename
            .rfind('.')
            .map(|idx| file.filename[idx..].to_string())
            .unwrap_or_default();

        let scheme = hash_service::scheme_for(&filetype);
        let hash = hash_service::fingerprint(&file.content, scheme);

        let id = Artifact::derive_id(&release.id, &platform, &file.filename, &filetype);

        debug!(
            artifact_id = %id,
            release_id = %release.id,
            filename = %file.filename,
            ?scheme,
            "Publishing asset"
        );

        let artifact = Artifact {
            id: id.clone(),
            release_id: release.id.clone(),
            name: request.name.unwrap_or_else(|| file.filename.clone()),
            platform,
            filetype,
            hash,
            size: file.content.len() as i64,
            storage_key: id.clone(),
            created_at: Utc::now(),
        };

        // Bytes must be durable before the record commit. The storage key is
        // the artifact id, so a re-publish of the same target overwrites the
        // previous bytes instead of leaving them referenced twice.
        self.storage.put(&artifact.storage_key, file.content.clone()).await?;

        match self.store.upsert_artifact(artifact).await {
            Ok(stored) => {
                info!(artifact_id = %stored.id, size = stored.size, "Asset published");
                Ok(stored)
            }
            Err(e) => {
                // No rollback; report the orphaned bytes for remediation.
                error!(
                    storage_key = %id,
                    error = %e,
                    "Asset record commit failed after bytes were stored; blob is orphaned"
                );
                Err(e)
            }
        }
    }

    /// Delete an artifact's record and bytes.
    ///
    /// The two deletions run jointly with no ordering requirement; success is
    /// reported only when both complete. A one-sided failure surfaces as
    /// [`AppError::PartialDelete`] so callers can trigger remediation.
    pub async fn destroy(&self, artifact_id: &str) -> Result<Artifact> {
        let Some(artifact) = self.store.find_artifact(artifact_id).await? else {
            return Err(AppError::NotFound(
                "No asset found with the specified id".into(),
            ));
        };

        // Owning release fetched for context only.
        let release = self
            .store
            .find_releases_by_ids(std::slice::from_ref(&artifact.release_id))
            .await?
            .pop();
        debug!(
            artifact_id = %artifact.id,
            release = release.as_ref().map(|r| r.name.as_str()).unwrap_or("<missing>"),
            "Deleting asset"
        );

        let (record_result, bytes_result) = tokio::join!(
            self.store.delete_artifact(&artifact.id),
            self.storage.delete(&artifact.storage_key)
        );

        match (record_result, bytes_result) {
            (Ok(_), Ok(())) => {
                info!(artifact_id = %artifact.id, "Asset deleted");
                Ok(artifact)
            }
            (Ok(_), Err(e)) => Err(AppError::PartialDelete(format!(
                "record deleted but bytes remain for {}: {}",
                artifact.id, e
            ))),
            (Err(e), Ok(())) => Err(AppError::PartialDelete(format!(
                "bytes deleted but record remains for {}: {}",
                artifact.id, e
            ))),
            (Err(record_err), Err(bytes_err)) => Err(AppError::Storage(format!(
                "deletion failed on both sides for {}: record: {}; bytes: {}",
                artifact.id, record_err, bytes_err
            ))),
        }
    }
}
