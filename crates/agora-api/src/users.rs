use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use agora_types::api::{RegisterRequest, RegisterResponse};
use agora_types::models::UserId;

use crate::error::{reject, require_text};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    require_text(&req.username)?;

    let user_id = state.engine.register(req.username).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = state.engine.user(&user_id).await.map_err(reject)?;
    Ok(Json(user))
}
