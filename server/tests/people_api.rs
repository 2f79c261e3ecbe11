//! End-to-end tests for the people endpoint, driven in-process

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use people_service_core::core::{create_app_state, AppState, Config, Environment};
use people_service_server::create_router;

fn config_for(environment: Environment) -> Config {
    let mut config = Config::default();
    config.server.environment = environment;
    config
}

async fn connected_app(config: Config) -> (Router, AppState) {
    let state = create_app_state(config).unwrap();
    state.db.connect().await.unwrap();
    (create_router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn post_raw(app: &Router, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/people")
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

async fn post(app: &Router, envelope: Value) -> (StatusCode, Value) {
    let (status, body) = post_raw(app, envelope.to_string()).await;
    let value = if body.is_empty() { Value::Null } else { serde_json::from_slice(&body).unwrap() };
    (status, value)
}

fn bob() -> Value {
    json!({
        "account_email": "a@b.co",
        "account_status": "invitee",
        "name": {"given": "Bob", "family": "Smith"},
        "locale": "en_US"
    })
}

#[tokio::test]
async fn test_create_returns_generated_id() {
    let (app, _) = connected_app(Config::default()).await;

    let (status, body) = post(&app, json!({"action": "create", "obj": bob()})).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["_id"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert_eq!(body["data"]["account_email"], json!("a@b.co"));
    assert_eq!(body["data"]["name"], json!({"given": "Bob", "family": "Smith"}));
}

#[tokio::test]
async fn test_unknown_action_is_bare_400() {
    let (app, _) = connected_app(Config::default()).await;

    let (status, body) = post_raw(&app, json!({"action": "nuke"}).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_unparseable_bodies_are_bare_400() {
    let (app, _) = connected_app(Config::default()).await;

    for body in ["{not json", "{\"obj\": {}}", "[1, 2, 3]"] {
        let (status, bytes) = post_raw(&app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert!(bytes.is_empty());
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/people")
        .header(CONTENT_TYPE, "text/plain")
        .body(Body::from(json!({"action": "find"}).to_string()))
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_oversize_body_is_payload_too_large() {
    let mut config = Config::default();
    config.server.body_limit = 64;
    let (app, _) = connected_app(config).await;

    let big = json!({"action": "create", "obj": {"bio": "x".repeat(256)}});
    let (status, bytes) = post_raw(&app, big.to_string()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(bytes.is_empty());

    // Just under the limit is read normally
    let small = json!({"action": "create", "obj": {"bio": "x"}});
    let (status, _) = post_raw(&app, small.to_string()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_read_round_trip_and_invalid_id() {
    let (app, _) = connected_app(Config::default()).await;
    let (_, created) = post(&app, json!({"action": "create", "obj": bob()})).await;
    let id = created["data"]["_id"].as_str().unwrap().to_string();

    let (status, read) = post(&app, json!({"action": "read", "query": {"ids": [id]}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["data"], created["data"]);

    // The id may also come from obj._id
    let (status, by_obj) = post(&app, json!({"action": "read", "obj": {"_id": id}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_obj["data"], created["data"]);

    let (status, missing) = post(&app, json!({"action": "read"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(missing["error"]["message"], json!("_id is invalid"));
    assert!(missing["error"]["stack"].as_str().unwrap().contains("_id is invalid"));
}

#[tokio::test]
async fn test_production_withholds_error_bodies() {
    let (app, _) = connected_app(config_for(Environment::Production)).await;

    let (status, bytes) = post_raw(&app, json!({"action": "read", "query": {"ids": ["x"]}}).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(bytes.is_empty());

    let (status, body) = post(&app, json!({"action": "create", "obj": bob()})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["_id"].is_string());
}

#[tokio::test]
async fn test_disconnected_store_is_500() {
    let (app, state) = connected_app(config_for(Environment::Test)).await;
    state.db.disconnect().await.unwrap();

    let (status, body) = post(&app, json!({"action": "find"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], json!("not connected to database"));
}

#[tokio::test]
async fn test_update_then_read() {
    let (app, _) = connected_app(Config::default()).await;
    let (_, created) = post(&app, json!({"action": "create", "obj": bob()})).await;
    let id = created["data"]["_id"].as_str().unwrap().to_string();

    let (status, updated) = post(&app, json!({
        "action": "update",
        "query": {"conditions": {"_id": id}},
        "updates": [{"cmd": "set", "field": "account_email", "value": "bubba.smith@test.co"}]
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["account_email"], json!("bubba.smith@test.co"));

    let (_, read) = post(&app, json!({"action": "read", "query": {"ids": [id]}})).await;
    assert_eq!(read["data"]["account_email"], json!("bubba.smith@test.co"));
}

#[tokio::test]
async fn test_update_misuse_is_500() {
    let (app, _) = connected_app(Config::default()).await;
    let (_, created) = post(&app, json!({"action": "create", "obj": bob()})).await;
    let id = created["data"]["_id"].as_str().unwrap().to_string();

    let (status, body) = post(&app, json!({
        "action": "update",
        "query": {"conditions": {"_id": id}},
        "updates": [{"cmd": "unset", "field": "locale"}]
    }))
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], json!("update only supports UpdateFieldCommand.cmd==set"));

    let (status, _) = post(&app, json!({
        "action": "update",
        "query": {"conditions": {"_id": id}},
        "updates": []
    }))
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_replace_whole_record() {
    let (app, _) = connected_app(Config::default()).await;
    let (_, created) = post(&app, json!({"action": "create", "obj": bob()})).await;
    let id = created["data"]["_id"].as_str().unwrap().to_string();

    let replacement = json!({"_id": id, "account_email": "robert@test.co"});
    let (status, replaced) = post(&app, json!({"action": "replace", "obj": replacement})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["data"], replacement);

    let (status, _) = post(&app, json!({"action": "replace"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_answers_empty_object() {
    let (app, _) = connected_app(Config::default()).await;
    let (_, created) = post(&app, json!({"action": "create", "obj": bob()})).await;
    let id = created["data"]["_id"].as_str().unwrap().to_string();

    let (status, body) = post(&app, json!({"action": "delete", "query": {"ids": [id]}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, read) = post(&app, json!({"action": "read", "query": {"ids": [id]}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(read["error"]["message"], json!("_id is invalid"));

    // Deleting again is still a success
    let (status, _) = post(&app, json!({"action": "delete", "query": {"conditions": {"_id": id}}})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_find_pagination_and_conditions() {
    let (app, _) = connected_app(Config::default()).await;
    for n in 0..12 {
        let obj = json!({"account_email": format!("person{}@test.co", n), "locale": "en_US"});
        post(&app, json!({"action": "create", "obj": obj})).await;
    }

    let (status, page) = post(&app, json!({"action": "find"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"].as_array().unwrap().len(), 10);

    let (_, eleven) = post(&app, json!({"action": "find", "query": {"cursor": {"count": 11}}})).await;
    assert_eq!(eleven["data"].as_array().unwrap().len(), 11);

    let (_, ninth) = post(&app, json!({"action": "find", "query": {"cursor": {"start_offset": 9}}})).await;
    assert_eq!(ninth["data"][0], page["data"][9]);

    let (_, matched) = post(&app, json!({
        "action": "find",
        "query": {"conditions": {"account_email": "person4@test.co"}}
    }))
    .await;
    assert_eq!(matched["data"].as_array().unwrap().len(), 1);

    let (status, _) = post(&app, json!({
        "action": "find",
        "query": {"conditions": {"account_email": "person4@test.co", "locale": "en_US"}}
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_root() {
    let (app, state) = connected_app(Config::default()).await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], json!("healthy"));

    state.db.disconnect().await.unwrap();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (_, body) = send(&app, request).await;
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["connected"], json!(false));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let root: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(root["endpoints"]["people"], json!("/api/people"));
    assert_eq!(root["actions"].as_array().unwrap().len(), 6);
}
