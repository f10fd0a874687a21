//! Image upload / serve handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::images::StoredImage;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Uploaded images are content-addressed, so they never change
const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// POST /api/image/upload - multipart field `file`
pub async fn upload(
    State(state): State<ServerState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<StoredImage>> {
    let mut field_data: Option<Bytes> = None;
    let mut original_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
    {
        if field.name() == Some("file") {
            original_name = field.file_name().map(str::to_string);
            field_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?,
            );
            break;
        }
    }

    let data = field_data.ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;
    let original_name = original_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::NoFilename))?;

    let images = state.images.clone();
    let stored = tokio::task::spawn_blocking(move || images.save(&original_name, &data))
        .await
        .map_err(|e| AppError::internal(format!("Upload task failed: {e}")))??;

    tracing::info!(
        filename = %stored.filename,
        size = stored.size,
        uploader = %user.id,
        "Image uploaded"
    );
    Ok(Json(stored))
}

/// GET /api/image/{filename}
pub async fn serve(State(state): State<ServerState>, Path(filename): Path<String>) -> AppResult<Response> {
    let content = state
        .images
        .load(&filename)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Image {filename}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        content,
    )
        .into_response())
}
