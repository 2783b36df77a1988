use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use agora_types::api::{CreateCommunityRequest, JoinRequest};
use agora_types::models::UserId;

use crate::error::{reject, require_text};
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCommunityRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    require_text(&req.name)?;

    let name = state
        .engine
        .create_community(req.name, &req.creator_id)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(json!({ "name": name }))))
}

pub async fn get_community(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let community = state.engine.community(&name).await.map_err(reject)?;
    Ok(Json(community))
}

/// Joining twice is not an error.
pub async fn join(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<StatusCode, StatusCode> {
    state.engine.join(&name, &req.user_id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn leave(
    State(state): State<AppState>,
    Path((name, user_id)): Path<(String, UserId)>,
) -> Result<StatusCode, StatusCode> {
    state.engine.leave(&name, &user_id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}
