//! Borrow / return lifecycle tests

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{borrow, create_author, create_book, get_auth_token, get_book, return_record};

#[tokio::test]
#[ignore]
async fn test_borrow_return_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author_id = create_author(&client, &token, "A. Orwell").await;
    let book = create_book(&client, &token, author_id, "1984", 1).await;
    let book_id = book["id"].as_i64().unwrap();

    // alice gets the only copy
    let response = borrow(&client, &token, book_id, "alice").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let record: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(record["borrowed_by"], "alice");
    assert!(record["return_date"].is_null());
    assert_eq!(get_book(&client, &token, book_id).await["available_copies"], 0);

    // bob finds the shelf empty
    let response = borrow(&client, &token, book_id, "bob").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(get_book(&client, &token, book_id).await["available_copies"], 0);

    // alice returns
    let record_id = record["id"].as_i64().unwrap();
    let response = return_record(&client, &token, record_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["record"]["status"], "returned");
    assert_eq!(get_book(&client, &token, book_id).await["available_copies"], 1);

    // A second return changes nothing
    let response = return_record(&client, &token, record_id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book already returned");
    assert_eq!(get_book(&client, &token, book_id).await["available_copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = borrow(&client, &token, i32::MAX as i64, "alice").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_of_last_copy() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author_id = create_author(&client, &token, "Race Author").await;
    let book = create_book(&client, &token, author_id, "Last Copy", 1).await;
    let book_id = book["id"].as_i64().unwrap();

    let attempts = (0..8).map(|i| {
        let client = client.clone();
        let token = token.clone();
        tokio::spawn(async move {
            borrow(&client, &token, book_id, &format!("reader-{}", i)).await.status()
        })
    });

    let mut created = 0;
    let mut conflicts = 0;
    for attempt in attempts.collect::<Vec<_>>() {
        match attempt.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(get_book(&client, &token, book_id).await["available_copies"], 0);
}

#[tokio::test]
#[ignore]
async fn test_borrow_then_return_restores_copies() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author_id = create_author(&client, &token, "Round Trip").await;
    let book = create_book(&client, &token, author_id, "Many Copies", 4).await;
    let book_id = book["id"].as_i64().unwrap();

    let mut records = Vec::new();
    for who in ["dave", "erin", "frank"] {
        let response = borrow(&client, &token, book_id, who).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let record: Value = response.json().await.expect("Failed to parse response");
        records.push(record["id"].as_i64().unwrap());
    }
    assert_eq!(get_book(&client, &token, book_id).await["available_copies"], 1);

    for record_id in records {
        let response = return_record(&client, &token, record_id).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(get_book(&client, &token, book_id).await["available_copies"], 4);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_returns_of_one_record() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author_id = create_author(&client, &token, "Return Race Author").await;
    let book = create_book(&client, &token, author_id, "Returned Once", 2).await;
    let book_id = book["id"].as_i64().unwrap();

    let response = borrow(&client, &token, book_id, "harriet").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let record: Value = response.json().await.expect("Failed to parse response");
    let record_id = record["id"].as_i64().unwrap();
    assert_eq!(get_book(&client, &token, book_id).await["available_copies"], 1);

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            let token = token.clone();
            tokio::spawn(async move { return_record(&client, &token, record_id).await.status() })
        })
        .collect();

    let mut returned = 0;
    let mut conflicts = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            StatusCode::OK => returned += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(returned, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(get_book(&client, &token, book_id).await["available_copies"], 2);
}
