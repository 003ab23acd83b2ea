//! Image Serving API 模块
//!
//! Serves uploaded images publicly for the menu clients. Traversal-safe:
//! the type segment is an allow list and the filename must be a single
//! plain path component.

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::core::ServerState;
use crate::services::ImageKind;
use crate::utils::AppError;

/// Stored images never change (uuid filenames), so clients may cache hard
const CACHE_CONTROL: &str = "public, max-age=31536000";

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/images/{kind}/{filename}", get(serve))
}

/// GET /api/images/{kind}/{filename} - 公开图片服务
async fn serve(
    State(state): State<ServerState>,
    Path((kind, filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let kind = ImageKind::parse(&kind)
        .ok_or_else(|| AppError::not_found(format!("Unknown image type: {kind}")))?;

    let path = state
        .images
        .open(kind, &filename)
        .ok_or_else(|| AppError::not_found(format!("Image {filename} not found")))?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::internal(format!("Failed to read image: {e}")))?;

    let mime = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime),
            (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
        ],
        bytes,
    )
        .into_response())
}
