//! Export handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::core::ServerState;
use crate::export::{self, ExportFile, ExportFormat};
use crate::utils::{AppError, AppResult};

fn parse_format(raw: &str) -> AppResult<ExportFormat> {
    ExportFormat::parse(raw).ok_or_else(|| {
        AppError::invalid_request(format!("Unsupported export format: {raw}")).with_detail("format", raw)
    })
}

fn attachment(file: ExportFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response()
}

/// GET /api/admin/exports/orders/{xlsx|pdf}
pub async fn orders(State(state): State<ServerState>, Path(format): Path<String>) -> AppResult<Response> {
    let format = parse_format(&format)?;
    let store = state.store.clone();
    let font = state.pdf_font.clone();
    let file = tokio::task::spawn_blocking(move || export::export_orders(&store, format, font))
        .await
        .map_err(|e| AppError::internal(format!("Export task failed: {e}")))??;
    Ok(attachment(file))
}

/// GET /api/admin/exports/customers/{xlsx|pdf}
pub async fn customers(State(state): State<ServerState>, Path(format): Path<String>) -> AppResult<Response> {
    let format = parse_format(&format)?;
    let store = state.store.clone();
    let font = state.pdf_font.clone();
    let file = tokio::task::spawn_blocking(move || export::export_customers(&store, format, font))
        .await
        .map_err(|e| AppError::internal(format!("Export task failed: {e}")))??;
    Ok(attachment(file))
}
