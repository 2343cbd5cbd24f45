//! Identity and catalog tests

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::{base_url, borrow, create_author, create_book, get_auth_token, unique};

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_obtain_tokens() {
    let client = Client::new();
    let username = format!("reader_{}", unique());

    let response = client
        .post(format!("{}/register/", base_url()))
        .json(&json!({
            "username": username,
            "email": "reader@example.com",
            "password": "a-long-password"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"username": username, "email": "reader@example.com"}));

    // Same username again
    let response = client
        .post(format!("{}/register/", base_url()))
        .json(&json!({
            "username": username,
            "email": "other@example.com",
            "password": "a-long-password"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["username"].is_array());

    let response = client
        .post(format!("{}/token/", base_url()))
        .json(&json!({ "username": username, "password": "a-long-password" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let tokens: Value = response.json().await.expect("Failed to parse response");
    let refresh = tokens["refresh"].as_str().expect("No refresh token");

    let response = client
        .post(format!("{}/token/refresh/", base_url()))
        .json(&json!({ "refresh": refresh }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_token_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/token/", base_url()))
        .json(&json!({ "username": "nobody-here", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_author_crud() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author_id = create_author(&client, &token, "George Orwell").await;

    let response = client
        .put(format!("{}/authors/{}/", base_url(), author_id))
        .bearer_auth(&token)
        .json(&json!({ "name": "George Orwell Updated", "bio": "Updated bio for Orwell" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = client
        .get(format!("{}/authors/{}/", base_url(), author_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["name"], "George Orwell Updated");
    assert_eq!(body["bio"], "Updated bio for Orwell");

    let response = client
        .post(format!("{}/authors/", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "name": "" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .delete(format!("{}/authors/{}/", base_url(), author_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_book_with_duplicate_isbn() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let author_id = create_author(&client, &token, "Test Author").await;
    let book = create_book(&client, &token, author_id, "1984", 5).await;

    assert_eq!(book["author"], "Test Author");

    let response = client
        .post(format!("{}/books/", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "title": "New Book",
            "author": author_id,
            "isbn": book["isbn"],
            "available_copies": 10
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["isbn"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_update_book_available_copies() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let author_id = create_author(&client, &token, "Test Author").await;
    let book = create_book(&client, &token, author_id, "Animal Farm", 3).await;

    let response = client
        .put(format!("{}/books/{}/", base_url(), book["id"]))
        .bearer_auth(&token)
        .json(&json!({
            "title": book["title"],
            "author": author_id,
            "isbn": book["isbn"],
            "available_copies": 10
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 10);
}

#[tokio::test]
#[ignore]
async fn test_author_with_books_is_protected_and_book_delete_cascades() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let author_id = create_author(&client, &token, "Protected Author").await;
    let book = create_book(&client, &token, author_id, "Kept Book", 2).await;
    let book_id = book["id"].as_i64().unwrap();

    let response = client
        .delete(format!("{}/authors/{}/", base_url(), author_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = borrow(&client, &token, book_id, "carol").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let record: Value = response.json().await.expect("Failed to parse response");

    let response = client
        .delete(format!("{}/books/{}/", base_url(), book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The record went with the book
    let response = crate::return_record(&client, &token, record["id"].as_i64().unwrap()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // And now the author can go
    let response = client
        .delete(format!("{}/authors/{}/", base_url(), author_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
