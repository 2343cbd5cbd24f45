//! Report generation tests

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{base_url, borrow, create_author, create_book, get_auth_token};

/// Trigger a report and wait for its job to finish
async fn generate_report(client: &Client, token: &str) -> Value {
    let response = client
        .post(format!("{}/reports/", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Report generation started");
    let task_id = body["task_id"].as_str().expect("No task id").to_string();

    for _ in 0..100 {
        let status: Value = client
            .get(format!("{}/reports/tasks/{}/", base_url(), task_id))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");

        match status["status"].as_str() {
            Some("succeeded") => return status["report"].clone(),
            Some("failed") => panic!("report job failed: {}", status["error"]),
            _ => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
    panic!("report job {} did not finish", task_id);
}

async fn latest_report(client: &Client, token: &str) -> Value {
    let response = client
        .get(format!("{}/reports/", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse response")
}

fn count(report: &Value, key: &str) -> i64 {
    report[key].as_i64().unwrap_or_else(|| panic!("missing {} in {}", key, report))
}

#[tokio::test]
#[ignore]
async fn test_report_reflects_new_rows() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let before = generate_report(&client, &token).await;

    let first = create_author(&client, &token, "Report Author One").await;
    let second = create_author(&client, &token, "Report Author Two").await;
    let book = create_book(&client, &token, first, "Report Book A", 1).await;
    create_book(&client, &token, first, "Report Book B", 0).await;
    create_book(&client, &token, second, "Report Book C", 2).await;
    let response = borrow(&client, &token, book["id"].as_i64().unwrap(), "gina").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let after = generate_report(&client, &token).await;
    assert_eq!(count(&after, "total_authors") - count(&before, "total_authors"), 2);
    assert_eq!(count(&after, "total_books") - count(&before, "total_books"), 3);
    assert_eq!(
        count(&after, "total_borrowed_books") - count(&before, "total_borrowed_books"),
        1
    );

    // The query service serves the newest artifact
    let latest = latest_report(&client, &token).await;
    assert_eq!(latest, after);
    assert!(latest["timestamp"].is_string());
}
