//! Download and resolve-only handlers.
//!
//! Route variants mirror the supported query shapes: latest, exact version,
//! channel, and their flavor-qualified forms. When a filename is specified,
//! nothing but its filetype is used: the Windows updater cannot parse
//! filenames reliably, so 32- and 64-bit uploads may share a fake name.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::services::resolution_service::{AssetQuery, RawQuery};

/// Create download routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/latest", get(latest))
        .route("/latest/:platform", get(latest_platform))
        .route("/channel/:channel", get(channel))
        .route("/channel/:channel/:platform", get(channel_platform))
        .route("/flavor/:flavor/latest/:platform", get(flavor_latest))
        .route(
            "/flavor/:flavor/channel/:channel/:platform",
            get(flavor_channel),
        )
        .route(
            "/flavor/:flavor/:version/:platform",
            get(flavor_version),
        )
        .route(
            "/flavor/:flavor/:version/:platform/:filename",
            get(flavor_version_filename),
        )
        .route("/:version/:platform", get(version_platform))
        .route("/:version/:platform/:filename", get(version_platform_filename))
}

#[derive(Debug, Deserialize, Default)]
pub struct DownloadQuery {
    pub filetype: Option<String>,
}

async fn latest(
    State(state): State<SharedState>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    serve(state, RawQuery::default(), query, headers).await
}

async fn latest_platform(
    State(state): State<SharedState>,
    Path(platform): Path<String>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let raw = RawQuery {
        platform: Some(platform),
        ..Default::default()
    };
    serve(state, raw, query, headers).await
}

async fn channel(
    State(state): State<SharedState>,
    Path(channel): Path<String>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let raw = RawQuery {
        channel: Some(channel),
        ..Default::default()
    };
    serve(state, raw, query, headers).await
}

async fn channel_platform(
    State(state): State<SharedState>,
    Path((channel, platform)): Path<(String, String)>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let raw = RawQuery {
        channel: Some(channel),
        platform: Some(platform),
        ..Default::default()
    };
    serve(state, raw, query, headers).await
}

async fn flavor_latest(
    State(state): State<SharedState>,
    Path((flavor, platform)): Path<(String, String)>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let raw = RawQuery {
        flavor: Some(flavor),
        platform: Some(platform),
        ..Default::default()
    };
    serve(state, raw, query, headers).await
}

async fn flavor_channel(
    State(state): State<SharedState>,
    Path((flavor, channel, platform)): Path<(String, String, String)>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let raw = RawQuery {
        flavor: Some(flavor),
        channel: Some(channel),
        platform: Some(platform),
        ..Default::default()
    };
    serve(state, raw, query, headers).await
}

async fn flavor_version(
    State(state): State<SharedState>,
    Path((flavor, version, platform)): Path<(String, String, String)>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let raw = RawQuery {
        flavor: Some(flavor),
        version: Some(version),
        platform: Some(platform),
        ..Default::default()
    };
    serve(state, raw, query, headers).await
}

async fn flavor_version_filename(
    State(state): State<SharedState>,
    Path((flavor, version, platform, filename)): Path<(String, String, String, String)>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let raw = RawQuery {
        flavor: Some(flavor),
        version: Some(version),
        platform: Some(platform),
        filename: Some(filename),
        ..Default::default()
    };
    serve(state, raw, query, headers).await
}

async fn version_platform(
    State(state): State<SharedState>,
    Path((version, platform)): Path<(String, String)>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let raw = RawQuery {
        version: Some(version),
        platform: Some(platform),
        ..Default::default()
    };
    serve(state, raw, query, headers).await
}

async fn version_platform_filename(
    State(state): State<SharedState>,
    Path((version, platform, filename)): Path<(String, String, String)>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let raw = RawQuery {
        version: Some(version),
        platform: Some(platform),
        filename: Some(filename),
        ..Default::default()
    };
    serve(state, raw, query, headers).await
}

/// Normalize, resolve and stream the matched artifact.
async fn serve(
    state: SharedState,
    mut raw: RawQuery,
    query: DownloadQuery,
    headers: HeaderMap,
) -> Result<Response> {
    raw.filetype = query.filetype;
    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());

    let asset_query = AssetQuery::normalize(raw, user_agent)?;
    tracing::debug!(?asset_query, "Download requested");

    let resolved = state.resolution_service().resolve(&asset_query).await?;

    // A record without backing bytes is as absent as no record at all.
    let artifact = match resolved {
        Some(r) if !r.artifact.storage_key.is_empty() => r.artifact,
        _ => return Err(AppError::NotFound(asset_query.not_found_message())),
    };

    let content = state.storage.get(&artifact.storage_key).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(CONTENT_LENGTH, content.len().to_string())
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.name),
        )
        .body(Body::from(content))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

// ---------------------------------------------------------------------------
// Resolve-only (metadata, no bytes)
// ---------------------------------------------------------------------------

/// Create resolve-only routes
pub fn resolve_router() -> Router<SharedState> {
    Router::new().route("/", get(resolve_only))
}

#[derive(Debug, Deserialize, Default)]
pub struct ResolveQuery {
    pub version: Option<String>,
    pub channel: Option<String>,
    pub flavor: Option<String>,
    pub platform: Option<String>,
    pub filename: Option<String>,
    pub filetype: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    /// Matched release name, or the owning release reference when resolution
    /// bypassed release selection.
    pub version: String,
    pub asset_id: String,
}

async fn resolve_only(
    State(state): State<SharedState>,
    Query(query): Query<ResolveQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let raw = RawQuery {
        version: query.version,
        channel: query.channel,
        flavor: query.flavor,
        platform: query.platform,
        filename: query.filename,
        filetype: query.filetype,
    };
    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    let asset_query = AssetQuery::normalize(raw, user_agent)?;

    let resolved = state
        .resolution_service()
        .resolve(&asset_query)
        .await?
        .ok_or_else(|| AppError::NotFound(asset_query.not_found_message()))?;

    let version = resolved
        .release_name
        .unwrap_or_else(|| resolved.artifact.release_id.clone());

    Ok(Json(ResolveResponse {
        version,
        asset_id: resolved.artifact.id,
    }))
}
