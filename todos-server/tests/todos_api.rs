//! End-to-end tests of the /todos routes against a real database
//!
//! Run with: DB_HOST=... DB_PASSWORD=... cargo test -p todos-server -- --ignored

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::{Mutex, MutexGuard};
use tower::ServiceExt;

use todos_server::db::{create_pool, setup};
use todos_server::{build_router, DbConfig};

/// Tests share one collection and each starts by emptying it
static COLLECTION: Mutex<()> = Mutex::const_new(());

async fn fresh_app() -> (Router, MutexGuard<'static, ()>) {
    let guard = COLLECTION.lock().await;
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let config = DbConfig::from_env().expect("invalid DB_* environment");
    setup::run(&config).await.expect("setup failed");

    let pool = create_pool(&config);
    sqlx::query("DELETE FROM todos")
        .execute(&pool)
        .await
        .expect("truncate failed");

    (build_router(pool), guard)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    let body = body
        .map(|b| Body::from(b.to_string()))
        .unwrap_or_else(Body::empty);

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

async fn create(app: &Router, doc: Value) -> String {
    let (status, body) = send(app, "POST", "/todos", Some(doc)).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().expect("missing generated id").to_owned()
}

#[tokio::test]
#[ignore = "requires database"]
async fn create_then_read_returns_fields_and_id() {
    let (app, _guard) = fresh_app().await;

    let id = create(&app, json!({"title": "buy milk", "done": false, "tags": ["home"]})).await;
    let (status, todo) = send(&app, "GET", &format!("/todos/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        todo,
        json!({"id": id, "title": "buy milk", "done": false, "tags": ["home"]})
    );
}

#[tokio::test]
#[ignore = "requires database"]
async fn client_supplied_id_is_ignored() {
    let (app, _guard) = fresh_app().await;

    let id = create(&app, json!({"id": "mine", "title": "x"})).await;
    assert_ne!(id, "mine");

    let (_, todo) = send(&app, "GET", &format!("/todos/{id}"), None).await;
    assert_eq!(todo["id"], id.as_str());
}

#[tokio::test]
#[ignore = "requires database"]
async fn list_returns_every_created_document() {
    let (app, _guard) = fresh_app().await;

    let (_, empty) = send(&app, "GET", "/todos", None).await;
    assert_eq!(empty, json!([]));

    for i in 0..3 {
        create(&app, json!({"title": format!("todo {i}")})).await;
    }

    let (status, list) = send(&app, "GET", "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[tokio::test]
#[ignore = "requires database"]
async fn replace_overwrites_whole_document() {
    let (app, _guard) = fresh_app().await;

    let id = create(&app, json!({"title": "old", "done": false})).await;
    let uri = format!("/todos/{id}");

    let (status, result) = send(&app, "PUT", &uri, Some(json!({"title": "new"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["replaced"], 1);

    let (_, todo) = send(&app, "GET", &uri, None).await;
    assert_eq!(todo, json!({"id": id, "title": "new"}));

    let (_, again) = send(&app, "PUT", &uri, Some(json!({"title": "new"}))).await;
    assert_eq!(again["unchanged"], 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn patch_merges_fields() {
    let (app, _guard) = fresh_app().await;

    let id = create(&app, json!({"title": "walk dog", "done": false})).await;
    let uri = format!("/todos/{id}");

    let (status, result) = send(&app, "PATCH", &uri, Some(json!({"done": true, "due": "today"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["replaced"], 1);

    let (_, todo) = send(&app, "GET", &uri, None).await;
    assert_eq!(
        todo,
        json!({"id": id, "title": "walk dog", "done": true, "due": "today"})
    );
}

#[tokio::test]
#[ignore = "requires database"]
async fn patch_merges_nested_objects() {
    let (app, _guard) = fresh_app().await;

    let id = create(
        &app,
        json!({"title": "t", "meta": {"a": 1, "b": 2, "deep": {"x": 1}}, "tags": ["a", "b"]}),
    )
    .await;
    let uri = format!("/todos/{id}");

    let patch = json!({"meta": {"b": 3, "deep": {"y": 2}}, "tags": ["c"]});
    let (status, result) = send(&app, "PATCH", &uri, Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["replaced"], 1);

    // Arrays and scalars overwrite, objects merge at every depth
    let (_, todo) = send(&app, "GET", &uri, None).await;
    assert_eq!(
        todo,
        json!({
            "id": id,
            "title": "t",
            "meta": {"a": 1, "b": 3, "deep": {"x": 1, "y": 2}},
            "tags": ["c"]
        })
    );

    let (_, again) = send(&app, "PATCH", &uri, Some(json!({"meta": {"a": 1}}))).await;
    assert_eq!(again["unchanged"], 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn patch_replaces_non_object_with_object() {
    let (app, _guard) = fresh_app().await;

    let id = create(&app, json!({"meta": "plain"})).await;
    let uri = format!("/todos/{id}");

    send(&app, "PATCH", &uri, Some(json!({"meta": {"a": 1}}))).await;
    let (_, todo) = send(&app, "GET", &uri, None).await;
    assert_eq!(todo, json!({"id": id, "meta": {"a": 1}}));
}

#[tokio::test]
#[ignore = "requires database"]
async fn nul_escape_is_rejected_by_storage() {
    let (app, _guard) = fresh_app().await;

    // JSONB cannot hold U+0000; the driver error surfaces as a generic 500
    let (status, body) = send(&app, "POST", "/todos", Some(json!({"title": "a\u{0}b"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");

    let (_, list) = send(&app, "GET", "/todos", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
#[ignore = "requires database"]
async fn delete_removes_document() {
    let (app, _guard) = fresh_app().await;

    let keep = create(&app, json!({"title": "keep"})).await;
    let gone = create(&app, json!({"title": "gone"})).await;
    let uri = format!("/todos/{gone}");

    let (status, result) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["deleted"], 1);

    let (_, todo) = send(&app, "GET", &uri, None).await;
    assert_eq!(todo, Value::Null);

    let (_, list) = send(&app, "GET", "/todos", None).await;
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert_eq!(ids, vec![keep.as_str()]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn missing_ids_are_not_errors() {
    let (app, _guard) = fresh_app().await;

    let (status, todo) = send(&app, "GET", "/todos/nope", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todo, Value::Null);

    let skipped = json!({
        "deleted": 0, "errors": 0, "inserted": 0,
        "replaced": 0, "skipped": 1, "unchanged": 0
    });
    for method in ["PUT", "PATCH"] {
        let (status, result) = send(&app, method, "/todos/nope", Some(json!({"x": 1}))).await;
        assert_eq!(status, StatusCode::OK, "{method}");
        assert_eq!(result, skipped, "{method}");
    }

    let (status, result) = send(&app, "DELETE", "/todos/nope", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result, skipped);
}

#[tokio::test]
#[ignore = "requires database"]
async fn malformed_body_is_client_error() {
    let (app, _guard) = fresh_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/todos")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
