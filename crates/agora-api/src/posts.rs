use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use agora_types::api::{
    CreateCommentRequest, CreateCommentResponse, CreatePostRequest, CreatePostResponse,
    VoteRequest,
};
use agora_types::models::{PostId, UserId, VoteKind};

use crate::error::{reject, require_text};
use crate::state::AppState;

pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    require_text(&req.title)?;

    let post_id = state
        .engine
        .create_post(&req.community, &req.author_id, req.title, req.content)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(CreatePostResponse { post_id })))
}

/// The post together with its full comment tree.
pub async fn get_thread(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> Result<impl IntoResponse, StatusCode> {
    let thread = state.engine.thread(&post_id).await.map_err(reject)?;
    Ok(Json(thread))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    require_text(&req.content)?;

    let comment_id = state
        .engine
        .create_comment(&req.parent_id, &req.author_id, req.content)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(CreateCommentResponse { comment_id })))
}

/// The vote is acknowledged once recorded; the author's karma follows later.
pub async fn vote(
    State(state): State<AppState>,
    Json(req): Json<VoteRequest>,
) -> Result<StatusCode, StatusCode> {
    state
        .engine
        .vote(&req.item_id, &req.user_id, VoteKind::from(req.upvote))
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn feed(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, StatusCode> {
    let posts = state.engine.feed(&user_id).await.map_err(reject)?;
    Ok(Json(posts))
}
