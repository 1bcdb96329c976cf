//! Artifact model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A single downloadable file belonging to a release.
///
/// The `id` is derived deterministically from
/// `(release_id, platform, delta flag, filetype)`; re-publishing the same
/// combination overwrites the previous record. The uploaded filename is kept
/// in `name` for display only and never participates in the id.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Artifact {
    pub id: String,
    pub release_id: String,
    pub name: String,
    pub platform: String,
    /// File extension including the leading dot, e.g. `.exe`.
    pub filetype: String,
    /// Integrity fingerprint; empty for filetypes with no hash scheme.
    pub hash: String,
    pub size: i64,
    /// Key of the stored bytes in the blob store; empty when bytes are missing.
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// Derive the canonical artifact id.
    ///
    /// `{release_id}_{platform}_{delta_?}{filetype-without-dots}`, where the
    /// `delta_` segment is present when the uploaded filename contains
    /// `-delta` (case-insensitive). Collisions on re-publish are intentional.
    pub fn derive_id(release_id: &str, platform: &str, filename: &str, filetype: &str) -> String {
        let delta = if filename.to_lowercase().contains("-delta") {
            "delta_"
        } else {
            ""
        };
        format!(
            "{}_{}_{}{}",
            release_id,
            platform,
            delta,
            filetype.replace('.', "")
        )
    }
}
