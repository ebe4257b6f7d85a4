//! End-to-end import pipeline tests: multipart upload → spawned job →
//! run status with counters.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use menud_ri::models::ImportRunStatus;
use serde_json::Value;
use tower::util::ServiceExt;

const BOUNDARY: &str = "menud-test-boundary";

async fn create_test_app() -> (axum::Router, sqlx::SqlitePool) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    menud_ri::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");

    let state = menud_ri::AppState::new(pool.clone());
    let app = menud_ri::build_router(state);

    (app, pool)
}

/// Build a multipart upload request for POST /restaurant/import
fn upload_request(filename: &str, content_type: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n",
        boundary = BOUNDARY,
        filename = filename,
        content_type = content_type,
        content = content,
    );
    Request::builder()
        .method("POST")
        .uri("/restaurant/import")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the status endpoint until the run reaches a terminal state
async fn await_terminal(app: &axum::Router, import_id: &str) -> Value {
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/restaurant/import/{}", import_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let status = response_json(response).await;
        let state: ImportRunStatus = serde_json::from_value(status["status"].clone()).unwrap();
        if state.is_terminal() {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("import run never reached a terminal state");
}

const SAMPLE_DOCUMENT: &str = r#"{"restaurants":[{"name":"R","menus":[{"name":"M","menu_items":[{"name":"Burger","price":12.99},{"name":"Fries","price":4.99}]}]}]}"#;

#[tokio::test]
async fn test_upload_schedules_and_completes_import() {
    let (app, pool) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(upload_request("menus.json", "application/json", SAMPLE_DOCUMENT))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let scheduled = response_json(response).await;
    assert_eq!(scheduled["message"], "Import scheduled to be processed");
    let import_id = scheduled["import_id"].as_str().unwrap().to_string();

    let status = await_terminal(&app, &import_id).await;
    assert_eq!(status["status"], "completed");
    assert_eq!(status["created_restaurants"], 1);
    assert_eq!(status["created_menus"], 1);
    assert_eq!(status["created_menu_items"], 2);
    assert_eq!(status["linked_menu_items"], 2);
    assert_eq!(status["failed_links"], 0);
    assert!(status["started_at"].is_string());
    assert!(status["finished_at"].is_string());

    let link_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_menu_items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(link_count, 2);
}

#[tokio::test]
async fn test_second_upload_is_idempotent() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(upload_request("menus.json", "application/json", SAMPLE_DOCUMENT))
        .await
        .unwrap();
    let first_id = response_json(response).await["import_id"].as_str().unwrap().to_string();
    let first = await_terminal(&app, &first_id).await;
    assert_eq!(first["status"], "completed");

    let response = app
        .clone()
        .oneshot(upload_request("menus.json", "application/json", SAMPLE_DOCUMENT))
        .await
        .unwrap();
    let second_id = response_json(response).await["import_id"].as_str().unwrap().to_string();
    let second = await_terminal(&app, &second_id).await;

    assert_eq!(second["status"], "completed");
    assert_eq!(second["created_restaurants"], 0);
    assert_eq!(second["created_menus"], 0);
    assert_eq!(second["created_menu_items"], 0);
    assert_eq!(second["linked_menu_items"], 0);
    assert_eq!(second["failed_restaurants"], 0);
    assert_eq!(second["failed_links"], 0);
}

#[tokio::test]
async fn test_partial_failure_still_completes() {
    let (app, pool) = create_test_app().await;
    let document = r#"{"restaurants":[{"name":"R","menus":[{"name":"M","menu_items":[{"name":"Burger","price":-1}]}]}]}"#;

    let response = app
        .clone()
        .oneshot(upload_request("menus.json", "application/json", document))
        .await
        .unwrap();
    let import_id = response_json(response).await["import_id"].as_str().unwrap().to_string();
    let status = await_terminal(&app, &import_id).await;

    assert_eq!(status["status"], "completed");
    assert_eq!(status["created_restaurants"], 1);
    assert_eq!(status["created_menus"], 1);
    assert_eq!(status["created_menu_items"], 1);
    assert_eq!(status["linked_menu_items"], 0);
    assert_eq!(status["failed_links"], 1);

    // The restaurant and menu were nonetheless persisted
    let restaurant_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM restaurants")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(restaurant_count, 1);
}

#[tokio::test]
async fn test_upload_validation() {
    let (app, _pool) = create_test_app().await;

    // Wrong extension
    let response = app
        .clone()
        .oneshot(upload_request("menus.txt", "application/json", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Wrong content type
    let response = app
        .clone()
        .oneshot(upload_request("menus.json", "application/pdf", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Body is not JSON
    let response = app
        .clone()
        .oneshot(upload_request("menus.json", "application/json", "not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Missing file part entirely
    let body = format!("--{boundary}--\r\n", boundary = BOUNDARY);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/restaurant/import")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // text/plain is an accepted content type
    let response = app
        .clone()
        .oneshot(upload_request("menus.json", "text/plain", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_status_for_unknown_run_is_404() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/restaurant/import/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
