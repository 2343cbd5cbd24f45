//! Live-server integration tests.
//!
//! Require a running server and database:
//! `cargo test --test integration -- --ignored --test-threads=1`
//! (`LIBMANAGE_TEST_URL` overrides the server address).

mod api_tests;
mod lending_tests;
mod report_tests;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

pub fn base_url() -> String {
    std::env::var("LIBMANAGE_TEST_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Short unique suffix so tests can run repeatedly against the same database
pub fn unique() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_string()
}

/// Register a fresh user and return an access token
pub async fn get_auth_token(client: &Client) -> String {
    let username = format!("user_{}", unique());
    let password = "testpass123";

    let response = client
        .post(format!("{}/register/", base_url()))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/token/", base_url()))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send token request");

    let body: Value = response.json().await.expect("Failed to parse token response");
    body["access"].as_str().expect("No access token in response").to_string()
}

pub async fn create_author(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post(format!("{}/authors/", base_url()))
        .bearer_auth(token)
        .json(&json!({ "name": name, "bio": null }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No author ID")
}

pub async fn create_book(client: &Client, token: &str, author_id: i64, title: &str, copies: i32) -> Value {
    let isbn = &unique()[..10];
    let response = client
        .post(format!("{}/books/", base_url()))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "author": author_id,
            "isbn": format!("978{}", isbn),
            "available_copies": copies
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    response.json().await.expect("Failed to parse response")
}

pub async fn get_book(client: &Client, token: &str, book_id: i64) -> Value {
    client
        .get(format!("{}/books/{}/", base_url(), book_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

pub async fn borrow(client: &Client, token: &str, book_id: i64, who: &str) -> reqwest::Response {
    client
        .post(format!("{}/borrow/", base_url()))
        .bearer_auth(token)
        .json(&json!({ "book": book_id, "borrowed_by": who }))
        .send()
        .await
        .expect("Failed to send request")
}

pub async fn return_record(client: &Client, token: &str, record_id: i64) -> reqwest::Response {
    client
        .put(format!("{}/borrow/{}/return/", base_url(), record_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
}
