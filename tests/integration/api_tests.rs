//! API integration tests over the in-memory store

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use chrono::{DateTime, Utc};
use library_server::{
    api,
    models::{Book, BookInput, Loan, Member, MemberInput},
    repository::{LibraryStore, MemoryStore},
    AppConfig, AppResult, AppState,
};

fn app() -> Router {
    let state = AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()));
    api::create_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_raw(app, method, uri, body.map(|json| json.to_string())).await
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri));
    let body = match body {
        Some(text) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(text)
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("Failed to build request"))
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, value)
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_lending_workflow() {
    let app = app();

    let (status, book) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "title": "Dune", "author": "Herbert" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["id"], 1);

    let (status, member) = send(&app, Method::POST, "/members", Some(json!({ "name": "Alice" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["id"], 1);

    let (status, loan) = send(
        &app,
        Method::POST,
        "/loans",
        Some(json!({ "book_id": 1, "member_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["id"], 1);
    assert!(loan["returned_at"].is_null());
    assert!(loan["borrowed_at"].is_string());

    let (status, err) = send(
        &app,
        Method::POST,
        "/loans",
        Some(json!({ "book_id": 1, "member_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "FAILED_PRECONDITION");
    assert_eq!(err["message"], "book already checked out");

    let (status, borrowed) = send(&app, Method::GET, "/members/1/loans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(borrowed.as_array().map(Vec::len), Some(1));

    let (status, returned) = send(&app, Method::POST, "/loans/1/return", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["id"], 1);
    assert!(returned["returned_at"].is_string());

    let (status, err) = send(&app, Method::POST, "/loans/1/return", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");

    let (status, loan) = send(
        &app,
        Method::POST,
        "/loans",
        Some(json!({ "book_id": 1, "member_id": 1, "due_at": "2026-12-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["id"], 2);
    assert!(loan["due_at"].is_string());
}

#[tokio::test]
async fn test_update_book_round_trip() {
    let app = app();

    send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "title": "Dune", "author": "Herbert", "isbn": "", "published_year": 0 })),
    )
    .await;

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/books/1",
        Some(json!({ "title": "Children of Dune", "author": "Frank Herbert", "published_year": 1976 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);

    let (status, books) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        books,
        json!([{
            "id": 1,
            "title": "Children of Dune",
            "author": "Frank Herbert",
            "isbn": null,
            "published_year": 1976
        }])
    );

    let (status, err) = send(
        &app,
        Method::PUT,
        "/books/5",
        Some(json!({ "title": "Dune", "author": "Herbert" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "book not found");
}

#[tokio::test]
async fn test_invalid_arguments() {
    let app = app();

    let (status, err) = send(&app, Method::POST, "/books", Some(json!({ "title": "Dune" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_ARGUMENT");
    assert_eq!(err["message"], "title and author are required");

    let (status, err) = send(&app, Method::POST, "/members", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "name is required");

    let (status, err) = send(&app, Method::POST, "/loans", Some(json!({ "book_id": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "book_id and member_id are required");

    let (status, err) = send(
        &app,
        Method::POST,
        "/loans",
        Some(json!({ "book_id": 1, "member_id": 1, "due_at": "soon" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "due_at must be ISO format");

    let (status, _) = send(&app, Method::POST, "/loans/0/return", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/members/0/loans", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_borrow_unknown_book() {
    let app = app();
    send(&app, Method::POST, "/members", Some(json!({ "name": "Alice" }))).await;

    let (status, err) = send(
        &app,
        Method::POST,
        "/loans",
        Some(json!({ "book_id": 999999, "member_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "book not found");

    let (_, borrowed) = send(&app, Method::GET, "/members/1/loans", None).await;
    assert_eq!(borrowed, json!([]));
}

#[tokio::test]
async fn test_malformed_requests_are_invalid_argument() {
    let app = app();

    let cases = [
        (Method::PUT, "/books/abc", Some(r#"{"title":"Dune","author":"Herbert"}"#)),
        (Method::PUT, "/members/1.5", Some(r#"{"name":"Alice"}"#)),
        (Method::POST, "/loans/99999999999/return", None),
        (Method::GET, "/members/abc/loans", None),
        (Method::POST, "/loans", Some(r#"{"book_id":"one","member_id":1}"#)),
        (Method::POST, "/loans", Some(r#"{"book_id":1,"member_id""#)),
        (Method::POST, "/books", Some(r#"{"title":"Dune","author":"Herbert","published_year":"1965"}"#)),
        (Method::POST, "/members", Some("[1, 2, 3]")),
    ];

    for (method, uri, body) in cases {
        let (status, err) = send_raw(&app, method.clone(), uri, body.map(str::to_string)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(err["code"], "INVALID_ARGUMENT", "{} {}", method, uri);
        assert!(err["message"].is_string(), "{} {}", method, uri);
    }

    let (_, books) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn test_member_update_round_trip() {
    let app = app();

    for name in ["Alice", "Bob", "Carol"] {
        let (status, _) = send(&app, Method::POST, "/members", Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/members/2",
        Some(json!({ "name": "Robert", "email": "bob@example.org", "phone": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 2);

    let (status, members) = send(&app, Method::GET, "/members", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        members,
        json!([
            { "id": 1, "name": "Alice", "email": null, "phone": null },
            { "id": 2, "name": "Robert", "email": "bob@example.org", "phone": null },
            { "id": 3, "name": "Carol", "email": null, "phone": null }
        ])
    );

    let (status, err) = send(&app, Method::PUT, "/members/9", Some(json!({ "name": "Dave" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "member not found");
}

/// Store whose book listing never completes
struct StalledStore(MemoryStore);

#[async_trait]
impl LibraryStore for StalledStore {
    async fn create_book(&self, book: &BookInput) -> AppResult<Book> {
        self.0.create_book(book).await
    }

    async fn update_book(&self, id: i32, book: &BookInput) -> AppResult<Option<Book>> {
        self.0.update_book(id, book).await
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        std::future::pending().await
    }

    async fn create_member(&self, member: &MemberInput) -> AppResult<Member> {
        self.0.create_member(member).await
    }

    async fn update_member(&self, id: i32, member: &MemberInput) -> AppResult<Option<Member>> {
        self.0.update_member(id, member).await
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.0.list_members().await
    }

    async fn open_loan(
        &self,
        book_id: i32,
        member_id: i32,
        due_at: Option<DateTime<Utc>>,
    ) -> AppResult<Loan> {
        self.0.open_loan(book_id, member_id, due_at).await
    }

    async fn close_loan(&self, loan_id: i32) -> AppResult<Option<Loan>> {
        self.0.close_loan(loan_id).await
    }

    async fn list_open_loans(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        self.0.list_open_loans(member_id).await
    }

    async fn ping(&self) -> AppResult<()> {
        self.0.ping().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_timeout_has_typed_body() {
    let mut config = AppConfig::default();
    config.server.request_timeout_secs = 1;
    let app = api::create_router(AppState::new(config, Arc::new(StalledStore(MemoryStore::new()))));

    let (status, err) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(err["code"], "DEADLINE_EXCEEDED");
    assert_eq!(err["message"], "request timed out");

    let (status, _) = send(&app, Method::GET, "/members", None).await;
    assert_eq!(status, StatusCode::OK);
}
