//! Asset resolution: query normalization and best-match selection.
//!
//! Turns a partially-specified download request into exactly one artifact or
//! a well-defined miss. Release candidates are fetched by creation time (the
//! newest release may not have its artifacts uploaded yet, so a window of
//! several releases is fetched), then re-ranked by semantic version, because
//! a recreated release gets a fresh `created_at` for what is semantically an
//! older version.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::release::DEFAULT_FLAVOR;
use crate::models::{Artifact, Release};
use crate::services::platform_service;
use crate::store::{ArtifactFilter, ReleaseFilter, ReleaseStore};
use crate::version;

/// How many releases to fetch before the semantic re-sort. The newest release
/// by creation time may have no matching artifacts yet (upload still in
/// flight), so the engine looks a few releases back instead of failing.
const RELEASE_LOOKBACK: i64 = 10;

/// Channel assumed when neither a version nor a channel is requested.
pub const DEFAULT_CHANNEL: &str = "stable";

/// Raw, request-shaped query fields before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawQuery {
    pub version: Option<String>,
    pub channel: Option<String>,
    pub flavor: Option<String>,
    pub platform: Option<String>,
    pub filename: Option<String>,
    pub filetype: Option<String>,
}

/// Canonical, request-scoped query driving resolution.
#[derive(Debug, Clone)]
pub struct AssetQuery {
    pub platforms: Vec<String>,
    pub filetype: Option<String>,
    pub version: Option<String>,
    pub channel: Option<String>,
    pub flavor: String,
    /// Original filename, kept only for diagnostics.
    pub filename: Option<String>,
}

impl AssetQuery {
    /// Normalize raw request fields into a canonical query.
    ///
    /// Pure over its inputs plus platform detection: filetype gains its
    /// leading dot (or is derived from the filename), the platform set comes
    /// from the explicit request (sanitized) or from User-Agent detection,
    /// channel defaults to `"stable"` only when neither version nor channel
    /// is present, and flavor defaults to `"default"`.
    pub fn normalize(raw: RawQuery, user_agent: Option<&str>) -> Result<Self> {
        let filetype = match raw.filetype {
            Some(ft) if !ft.is_empty() => {
                if ft.starts_with('.') {
                    Some(ft)
                } else {
                    Some(format!(".{}", ft))
                }
            }
            _ => raw
                .filename
                .as_deref()
                .and_then(|name| name.rfind('.').map(|idx| name[idx..].to_string())),
        };

        let platforms = match raw.platform {
            Some(platform) => platform_service::sanitize(&[platform]),
            None => {
                let ua = user_agent.unwrap_or("");
                platform_service::detect_from_user_agent(ua).ok_or_else(|| {
                    AppError::PlatformDetection(
                        "No platform specified and detecting one was unsuccessful.".into(),
                    )
                })?
            }
        };

        let channel = match (&raw.version, raw.channel) {
            (None, None) => Some(DEFAULT_CHANNEL.to_string()),
            (_, channel) => channel,
        };

        Ok(Self {
            platforms,
            filetype,
            version: raw.version,
            channel,
            flavor: raw.flavor.unwrap_or_else(|| DEFAULT_FLAVOR.to_string()),
            filename: raw.filename,
        })
    }

    fn artifact_filter(&self) -> ArtifactFilter {
        // An empty platform list (unknown requested platform) matches nothing
        // rather than everything.
        ArtifactFilter {
            platforms: Some(self.platforms.clone()),
            filetype: self.filetype.clone(),
        }
    }

    /// Diagnostic message for a miss, carrying the full query context.
    pub fn not_found_message(&self) -> String {
        let mut message = format!("The {} flavor has no download available", self.flavor);

        if !self.platforms.is_empty() {
            if self.platforms.len() > 1 {
                message += &format!(" for platforms {}", self.platforms.join(","));
            } else {
                message += &format!(" for platform {}", self.platforms[0]);
            }
        }

        if let Some(ref version) = self.version {
            message += &format!(" for version {}", version);
        }
        if let Some(ref channel) = self.channel {
            message += &format!(" ({})", channel);
        }
        if let Some(ref filename) = self.filename {
            message += &format!(" with filename {}", filename);
        }
        if let Some(ref filetype) = self.filetype {
            message += &format!(" with filetype {}", filetype);
        }

        message
    }
}

/// A resolved artifact together with its owning release name, when the
/// resolution path went through release selection.
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    pub artifact: Artifact,
    pub release_name: Option<String>,
}

/// Asset resolution engine
pub struct ResolutionService {
    store: Arc<dyn ReleaseStore>,
}

impl ResolutionService {
    /// Create a new resolution service
    pub fn new(store: Arc<dyn ReleaseStore>) -> Self {
        Self { store }
    }

    /// Resolve a canonical query to at most one artifact.
    ///
    /// `Ok(None)` covers every absence condition: no matching release,
    /// matching releases without matching artifacts, or no matching artifact
    /// at all on the direct path.
    pub async fn resolve(&self, query: &AssetQuery) -> Result<Option<ResolvedAsset>> {
        let artifact_filter = query.artifact_filter();

        if query.version.is_none() && query.channel.is_none() {
            // Only reachable when normalization defaulting was bypassed:
            // match artifacts directly, newest first.
            let mut artifacts = self.store.find_artifacts(&artifact_filter, 1).await?;
            return Ok(artifacts.drain(..).next().map(|artifact| ResolvedAsset {
                artifact,
                release_name: None,
            }));
        }

        let release_filter = ReleaseFilter {
            name: query.version.clone(),
            channel: query.channel.clone(),
            flavor: Some(query.flavor.clone()),
        };

        tracing::debug!(?release_filter, ?artifact_filter, "Resolving asset");

        // Step 1: creation-time window.
        let mut releases = self
            .store
            .find_releases(&release_filter, &artifact_filter, RELEASE_LOOKBACK)
            .await?;

        // Step 2: semantic re-sort; recreation timestamps must not win.
        version::sort_releases_newest_first(&mut releases);

        // Step 3: first release that actually has a matching artifact.
        let Some(release) = releases.into_iter().find(|r| !r.artifacts.is_empty()) else {
            return Ok(None);
        };

        Ok(Self::pick_artifact(release))
    }

    /// Step 4: rank a release's matching artifacts; filetype ascending puts
    /// installers ahead of archives, then most recently published wins.
    fn pick_artifact(release: Release) -> Option<ResolvedAsset> {
        let release_name = release.name;
        let mut artifacts = release.artifacts;
        artifacts.sort_by(|a, b| {
            a.filetype
                .cmp(&b.filetype)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        artifacts.into_iter().next().map(|artifact| ResolvedAsset {
            artifact,
            release_name: Some(release_name),
        })
    }
}
