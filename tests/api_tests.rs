//! API integration tests
//!
//! Drive the full router in-process against an in-memory SQLite database.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use bookshelf_server::{
    api, config::DatabaseConfig, repository::Repository, services::Services, AppState,
};
use chrono::Local;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> Router {
    let database = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        create_if_missing: true,
    };
    let repository = Repository::connect(&database).await.expect("Failed to open database");
    repository.migrate().await.expect("Failed to run migrations");

    api::create_router(AppState {
        services: Arc::new(Services::new(repository)),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Failed to send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

fn book_data() -> Value {
    json!({
        "serial_number": 123456,
        "title": "Test Book",
        "author": "Test Author"
    })
}

#[tokio::test]
async fn test_root() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Hello World"}));
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_book() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::POST, "/books/", Some(book_data())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["serial_number"], 123456);
    assert_eq!(body["title"], "Test Book");
    assert_eq!(body["author"], "Test Author");
    assert_eq!(body["is_borrowed"], false);
    assert!(body["borrowed_by"].is_null());
    assert!(body["borrowed_date"].is_null());

    let (status, body) = send(&app, Method::POST, "/books/", Some(book_data())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Book with this serial number already exists");
}

#[tokio::test]
async fn test_list_books() {
    let app = test_app().await;
    send(&app, Method::POST, "/books/", Some(book_data())).await;
    send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"serial_number": 654321, "title": "Second", "author": "Someone"})),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/books/", None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body.as_array().expect("list body is an array");
    assert_eq!(books.len(), 2);
    assert!(books.iter().all(|b| b.get("serial_number").is_some()));
    assert!(books.iter().all(|b| b.get("title").is_some()));
    assert!(books.iter().all(|b| b.get("author").is_some()));
    assert_eq!(books[0]["serial_number"], 123456);
    assert_eq!(books[1]["serial_number"], 654321);
}

#[tokio::test]
async fn test_get_book() {
    let app = test_app().await;
    send(&app, Method::POST, "/books/", Some(book_data())).await;

    let (status, body) = send(&app, Method::GET, "/books/123456", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Test Book");

    let (status, body) = send(&app, Method::GET, "/books/654321", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Book not found");
}

#[tokio::test]
async fn test_update_book_status() {
    let app = test_app().await;
    send(&app, Method::POST, "/books/", Some(book_data())).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/books/123456?is_borrowed=true&borrowed_by=987654",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_borrowed"], true);
    assert_eq!(body["borrowed_by"], 987654);
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(body["borrowed_date"], today);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/books/123456?is_borrowed=false&borrowed_by=987654",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_borrowed"], false);
    assert!(body["borrowed_by"].is_null());
    assert!(body["borrowed_date"].is_null());
}

#[tokio::test]
async fn test_update_accepts_bool_spellings() {
    let app = test_app().await;
    send(&app, Method::POST, "/books/", Some(book_data())).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/books/123456?is_borrowed=True&borrowed_by=987654",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_borrowed"], true);

    let (status, body) = send(&app, Method::PUT, "/books/123456?is_borrowed=0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_borrowed"], false);

    let (status, _) = send(&app, Method::PUT, "/books/123456?is_borrowed=maybe", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_missing_book() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::PUT, "/books/123456?is_borrowed=false", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Book not found");
}

#[tokio::test]
async fn test_remove_book() {
    let app = test_app().await;
    send(&app, Method::POST, "/books/", Some(book_data())).await;

    let (status, body) = send(&app, Method::DELETE, "/books/123456", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["serial_number"], 123456);

    let (status, body) = send(&app, Method::DELETE, "/books/123456", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Book not found");

    let (_, body) = send(&app, Method::GET, "/books/", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_create_book_with_serial_number_limit() {
    let app = test_app().await;
    for serial in [99999, 1234567] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/books/",
            Some(json!({"serial_number": serial, "title": "Test Book", "author": "Test Author"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "BadValue");
    }

    let (_, body) = send(&app, Method::GET, "/books/", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_create_book_with_missing_field() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/books/",
        Some(json!({"serial_number": 123456, "title": "Test Book"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_with_card_number_limit() {
    let app = test_app().await;
    send(&app, Method::POST, "/books/", Some(book_data())).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/books/123456?is_borrowed=true&borrowed_by=6543217",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Body instead of query string: is_borrowed is missing
    let (status, _) = send(
        &app,
        Method::PUT,
        "/books/123456",
        Some(json!({"is_borrowed": true, "borrowed_by": 6543217})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(&app, Method::GET, "/books/123456", None).await;
    assert_eq!(body["is_borrowed"], false);
}

#[tokio::test]
async fn test_borrow_without_borrower_rejected() {
    let app = test_app().await;
    send(&app, Method::POST, "/books/", Some(book_data())).await;
    let (status, _) = send(&app, Method::PUT, "/books/123456?is_borrowed=true", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_key_on_delete_and_get_is_not_found() {
    let app = test_app().await;
    send(&app, Method::POST, "/books/", Some(book_data())).await;

    for uri in ["/books/abc", "/books/99999", "/books/1000000"] {
        let (status, body) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
        assert_eq!(body["detail"], "Book not found");

        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
        assert_eq!(body["detail"], "Book not found");
    }

    let (_, body) = send(&app, Method::GET, "/books/", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_malformed_serial_on_update() {
    let app = test_app().await;
    let (status, _) = send(&app, Method::PUT, "/books/1000000?is_borrowed=false", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::PUT, "/books/abc?is_borrowed=false", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books/{serial_number}"].is_object());
}
