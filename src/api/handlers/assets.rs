//! Asset publication and deletion handlers.

use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{delete, post},
    Json, Router,
};

use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::Artifact;
use crate::services::asset_service::{PublishRequest, UploadedFile};

/// Create asset routes
pub fn router(max_upload_bytes: usize) -> Router<SharedState> {
    Router::new()
        .route("/", post(create_asset))
        .route("/:id", delete(destroy_asset))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Publish an uploaded file as an artifact.
///
/// Multipart fields: `release` (target release id), `platform`, optional
/// `name` override, and exactly one `file` part. The whole upload is bounded
/// by the configured timeout so a stalled client cannot hang the call.
async fn create_asset(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<Artifact>> {
    let timeout = Duration::from_secs(state.config.upload_timeout_secs);
    let request = tokio::time::timeout(timeout, read_publish_request(multipart))
        .await
        .map_err(|_| AppError::BadRequest("Upload timed out".into()))??;

    let artifact = state.asset_service().publish(request).await?;
    Ok(Json(artifact))
}

/// Read multipart fields into a publication request.
async fn read_publish_request(mut multipart: Multipart) -> Result<PublishRequest> {
    let mut release_ref = String::new();
    let mut platform: Option<String> = None;
    let mut name: Option<String> = None;
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "release" | "version" => {
                release_ref = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid release field: {}", e)))?;
            }
            "platform" => {
                platform = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid platform field: {}", e))
                })?);
            }
            "name" => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid name field: {}", e)))?,
                );
            }
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid file upload: {}", e)))?;
                files.push(UploadedFile { filename, content });
            }
            _ => {}
        }
    }

    Ok(PublishRequest {
        release_ref,
        files,
        platform,
        name,
    })
}

/// Delete an artifact's record and bytes.
async fn destroy_asset(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Artifact>> {
    let artifact = state.asset_service().destroy(&id).await?;
    Ok(Json(artifact))
}
