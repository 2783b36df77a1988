use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use agora_api::{AppStateInner, router};
use agora_engine::Engine;

fn app() -> Router {
    let (engine, _tasks) = Engine::start(Duration::from_secs(2));
    router(AppStateInner::new(engine))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = call(app, Method::POST, "/users", Some(json!({ "username": username }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["user_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health() {
    let (status, body) = call(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn registration_and_lookup() {
    let app = app();
    assert_eq!(register(&app, "alice").await, "user_1");

    let (status, _) = call(&app, Method::POST, "/users", Some(json!({ "username": "alice" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&app, Method::POST, "/users", Some(json!({ "username": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::GET, "/users/user_1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["karma"], 0);

    let (status, _) = call(&app, Method::GET, "/users/user_9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn community_membership() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let create = json!({ "name": "golang", "creator_id": alice });
    let (status, body) = call(&app, Method::POST, "/communities", Some(create.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "golang");
    let (status, _) = call(&app, Method::POST, "/communities", Some(create)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let join = json!({ "user_id": bob });
    let (status, _) = call(&app, Method::POST, "/communities/golang/members", Some(join.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::POST, "/communities/rust/members", Some(join)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call(&app, Method::GET, "/communities/golang", None).await;
    assert_eq!(body["members"], json!([bob]));
    assert_eq!(body["moderators"], json!([alice]));

    let uri = format!("/communities/golang/members/{}", bob);
    let (status, _) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = call(&app, Method::GET, "/communities/golang", None).await;
    assert_eq!(body["members"], json!([]));
}

#[tokio::test]
async fn posting_commenting_and_voting() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    call(&app, Method::POST, "/communities", Some(json!({ "name": "golang", "creator_id": alice }))).await;
    call(&app, Method::POST, "/communities/golang/members", Some(json!({ "user_id": bob }))).await;

    let post = json!({ "community": "golang", "author_id": alice, "title": "Hi", "content": "Hello" });
    let (status, body) = call(&app, Method::POST, "/posts", Some(post)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["post_id"], "post_1");

    let missing = json!({ "community": "rust", "author_id": alice, "title": "Hi", "content": "x" });
    let (status, _) = call(&app, Method::POST, "/posts", Some(missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let comment = json!({ "parent_id": "post_1", "author_id": bob, "content": "Nice" });
    let (status, body) = call(&app, Method::POST, "/comments", Some(comment)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comment_id"], "comment_1");

    let reply = json!({ "parent_id": "comment_1", "author_id": alice, "content": "Thanks" });
    let (status, _) = call(&app, Method::POST, "/comments", Some(reply)).await;
    assert_eq!(status, StatusCode::CREATED);

    let vote = json!({ "item_id": "post_1", "user_id": bob, "upvote": true });
    let (status, _) = call(&app, Method::POST, "/votes", Some(vote)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let vote = json!({ "item_id": "post_404", "user_id": bob, "upvote": true });
    let (status, _) = call(&app, Method::POST, "/votes", Some(vote)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, Method::GET, "/posts/post_1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["votes"]["upvoters"], json!([bob]));
    assert_eq!(body["comments"][0]["depth"], 0);
    assert_eq!(body["comments"][0]["comment"]["id"], "comment_1");
    assert_eq!(body["comments"][1]["depth"], 1);
    assert_eq!(body["comments"][1]["comment"]["content"], "Thanks");

    let (_, body) = call(&app, Method::GET, &format!("/users/{}", alice), None).await;
    assert_eq!(body["karma"], 1);

    let (status, body) = call(&app, Method::GET, &format!("/users/{}/feed", bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "post_1");
}

#[tokio::test]
async fn direct_messages() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let message = json!({ "from": alice, "to": bob, "content": "hey" });
    let (status, body) = call(&app, Method::POST, "/messages", Some(message)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message_id"], "dm_1");

    for user in [&alice, &bob] {
        let (status, body) = call(&app, Method::GET, &format!("/users/{}/inbox", user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["content"], "hey");
    }
}

#[tokio::test]
async fn unknown_fields_are_refused() {
    let app = app();
    let (status, _) = call(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "username": "alice", "password": "hunter2" })),
    )
    .await;
    assert!(status.is_client_error());
}
