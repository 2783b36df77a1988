//! HTTP surface over the engine.

pub mod communities;
pub mod error;
pub mod messages;
pub mod posts;
pub mod state;
pub mod users;

use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::json;

pub use state::{AppState, AppStateInner};

/// Every route, with state applied. Middleware layers are left to the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", post(users::register))
        .route("/users/{user_id}", get(users::get_user))
        .route("/users/{user_id}/inbox", get(messages::inbox))
        .route("/users/{user_id}/feed", get(posts::feed))
        .route("/communities", post(communities::create))
        .route("/communities/{name}", get(communities::get_community))
        .route("/communities/{name}/members", post(communities::join))
        .route("/communities/{name}/members/{user_id}", delete(communities::leave))
        .route("/posts", post(posts::create_post))
        .route("/posts/{post_id}", get(posts::get_thread))
        .route("/comments", post(posts::create_comment))
        .route("/votes", post(posts::vote))
        .route("/messages", post(messages::send_message))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
