//! Minimal release management: create and list.
//!
//! Publication requires its target release to exist, so the server exposes
//! just enough surface to create one.

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::release::DEFAULT_FLAVOR;
use crate::models::Release;
use crate::store::{ArtifactFilter, ReleaseFilter};

/// Create release routes
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(list_releases).post(create_release))
}

#[derive(Debug, Deserialize)]
pub struct CreateReleaseRequest {
    pub id: Option<String>,
    pub name: String,
    pub channel: Option<String>,
    pub flavor: Option<String>,
}

async fn create_release(
    State(state): State<SharedState>,
    Json(request): Json<CreateReleaseRequest>,
) -> Result<Json<Release>> {
    if request.name.is_empty() {
        return Err(AppError::BadRequest("A release name is required.".into()));
    }

    let flavor = request.flavor.unwrap_or_else(|| DEFAULT_FLAVOR.to_string());
    let id = request
        .id
        .unwrap_or_else(|| Release::derive_id(&request.name, &flavor));

    let release = state
        .store
        .insert_release(Release {
            id,
            name: request.name,
            channel: request.channel,
            flavor,
            created_at: Utc::now(),
            artifacts: Vec::new(),
        })
        .await?;

    tracing::info!(release_id = %release.id, "Release created");
    Ok(Json(release))
}

async fn list_releases(State(state): State<SharedState>) -> Result<Json<Vec<Release>>> {
    let releases = state
        .store
        .find_releases(&ReleaseFilter::default(), &ArtifactFilter::default(), 100)
        .await?;
    Ok(Json(releases))
}
