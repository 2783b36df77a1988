use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use agora_types::api::{SendMessageRequest, SendMessageResponse};
use agora_types::models::UserId;

use crate::error::{reject, require_text};
use crate::state::AppState;

pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    require_text(&req.content)?;

    let message_id = state
        .engine
        .send_message(&req.from, &req.to, req.content)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(SendMessageResponse { message_id })))
}

/// Newest first.
pub async fn inbox(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, StatusCode> {
    let messages = state.engine.inbox(&user_id).await.map_err(reject)?;
    Ok(Json(messages))
}
