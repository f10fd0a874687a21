//! Support message handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::messages;
use crate::utils::AppResult;
use shared::models::{Message, StaffMessageCreate};

/// GET /api/admin/messages/inbox - customer messages, staged ones included
pub async fn inbox(State(state): State<ServerState>) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(messages::staff_inbox(&state.store)?))
}

/// GET /api/admin/messages/sent
pub async fn sent(State(state): State<ServerState>) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(messages::staff_sent(&state.store)?))
}

/// POST /api/admin/messages - one message per recipient email
pub async fn send(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<StaffMessageCreate>,
) -> AppResult<Json<Message>> {
    let sent = messages::send_from_staff(&state.store, req)?;
    tracing::info!(message_id = %sent.id, operator = %user.id, "Staff message sent");
    Ok(Json(sent))
}

/// PATCH /api/admin/messages/{id}/read
pub async fn mark_read(State(state): State<ServerState>, Path(id): Path<String>) -> AppResult<Json<Message>> {
    Ok(Json(messages::mark_read(&state.store, &id)?))
}
