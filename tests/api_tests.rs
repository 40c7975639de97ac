//! API integration tests
//!
//! These run against a live server (cargo run) with a migrated database.

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique suffix so reruns don't trip the unique constraints
fn unique() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

async fn create_book(client: &Client, copies: i32) -> (String, Value) {
    let isbn = format!("978{:010}", unique() % 10_000_000_000);
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "title": "The Count of Monte Cristo",
            "author": "Alexandre Dumas",
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book");
    (isbn, body)
}

async fn create_member(client: &Client) -> i64 {
    let response = client
        .post(format!("{}/members", BASE_URL))
        .json(&json!({
            "first_name": "Edmond",
            "last_name": "Dantes",
            "email": format!("edmond.{}@example.com", unique()),
            "phone": "555-1234"
        }))
        .send()
        .await
        .expect("Failed to create member");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse member");
    body["member_id"].as_i64().expect("No member_id")
}

async fn borrow(client: &Client, member_id: i64, isbn: &str, period_days: i64) -> reqwest::Response {
    client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "member_id": member_id,
            "isbn": isbn,
            "period_days": period_days
        }))
        .send()
        .await
        .expect("Failed to send borrow request")
}

async fn available_copies(client: &Client, isbn: &str) -> i64 {
    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, isbn))
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse book");
    body["available_copies"].as_i64().expect("No available_copies")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_create_and_get_book() {
    let client = Client::new();
    let (isbn, created) = create_book(&client, 3).await;

    assert_eq!(created["total_copies"], 3);
    assert_eq!(created["available_copies"], 3);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, isbn))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["isbn"], isbn.as_str());
}

#[tokio::test]
#[ignore]
async fn test_register_member_rejects_bad_email() {
    let client = Client::new();

    let response = client
        .post(format!("{}/members", BASE_URL))
        .json(&json!({
            "first_name": "No",
            "last_name": "Email",
            "email": "not-an-email"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_book_is_not_found() {
    let client = Client::new();
    let member_id = create_member(&client).await;

    let response = borrow(&client, member_id, "9780000000000", 14).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrow_of_last_copy() {
    let client = Client::new();
    let (isbn, _) = create_book(&client, 1).await;
    let member_a = create_member(&client).await;
    let member_b = create_member(&client).await;

    let (resp_a, resp_b) = tokio::join!(
        borrow(&client, member_a, &isbn, 14),
        borrow(&client, member_b, &isbn, 14)
    );

    let statuses = [resp_a.status().as_u16(), resp_b.status().as_u16()];
    assert!(
        statuses.contains(&201) && statuses.contains(&409),
        "expected exactly one success and one conflict, got {:?}",
        statuses
    );

    // never negative, never oversold
    assert_eq!(available_copies(&client, &isbn).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_double_return() {
    let client = Client::new();
    let (isbn, _) = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    // due date in the past so the winning return must also create the fine
    let response = borrow(&client, member_id, &isbn, -3).await;
    assert_eq!(response.status(), 201);
    let receipt: Value = response.json().await.expect("Failed to parse receipt");
    let log_id = receipt["log_id"].as_i64().expect("No log_id");

    let return_url = format!("{}/loans/{}/return", BASE_URL, log_id);
    let (resp_a, resp_b) = tokio::join!(
        client.post(&return_url).send(),
        client.post(&return_url).send()
    );
    let resp_a = resp_a.expect("Failed to send return");
    let resp_b = resp_b.expect("Failed to send return");

    let statuses = [resp_a.status().as_u16(), resp_b.status().as_u16()];
    assert!(
        statuses.contains(&200) && statuses.contains(&409),
        "expected exactly one returned and one already-returned, got {:?}",
        statuses
    );

    // availability incremented exactly once, never past total
    assert_eq!(available_copies(&client, &isbn).await, 1);

    // exactly one fine was created by the winning return
    let fines: Value = client
        .get(format!("{}/members/{}/fines", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to list fines")
        .json()
        .await
        .expect("Failed to parse fines");
    assert_eq!(fines.as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
#[ignore]
async fn test_extreme_borrow_period_is_rejected() {
    let client = Client::new();
    let (isbn, _) = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    let response = borrow(&client, member_id, &isbn, i64::MAX).await;
    assert_eq!(response.status(), 400);

    let response = borrow(&client, member_id, &isbn, i64::MIN).await;
    assert_eq!(response.status(), 400);

    // nothing was mutated by the rejected requests
    assert_eq!(available_copies(&client, &isbn).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_get_loan_by_id() {
    let client = Client::new();
    let (isbn, _) = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    let response = borrow(&client, member_id, &isbn, 14).await;
    assert_eq!(response.status(), 201);
    let receipt: Value = response.json().await.expect("Failed to parse receipt");
    let log_id = receipt["log_id"].as_i64().expect("No log_id");

    let response = client
        .get(format!("{}/loans/{}", BASE_URL, log_id))
        .send()
        .await
        .expect("Failed to fetch loan");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse loan");
    assert_eq!(body["log_id"].as_i64(), Some(log_id));
    assert!(body["return_date"].is_null());

    let response = client
        .get(format!("{}/loans/999999999", BASE_URL))
        .send()
        .await
        .expect("Failed to fetch loan");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrow_limit_is_exactly_enforced() {
    let client = Client::new();
    let (isbn, _) = create_book(&client, 10).await;
    let member_id = create_member(&client).await;

    // default limit is 5: five borrows succeed, the sixth is rejected
    for _ in 0..5 {
        let response = borrow(&client, member_id, &isbn, 14).await;
        assert_eq!(response.status(), 201);
    }

    let response = borrow(&client, member_id, &isbn, 14).await;
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("limit"));
}

#[tokio::test]
#[ignore]
async fn test_overdue_return_charges_fine_once() {
    let client = Client::new();
    let (isbn, _) = create_book(&client, 2).await;
    let member_id = create_member(&client).await;

    // negative period puts the due date 3 days in the past
    let response = borrow(&client, member_id, &isbn, -3).await;
    assert_eq!(response.status(), 201);
    let receipt: Value = response.json().await.expect("Failed to parse receipt");
    let log_id = receipt["log_id"].as_i64().expect("No log_id");

    assert_eq!(available_copies(&client, &isbn).await, 1);

    // loan reads as overdue before the return
    let loans: Value = client
        .get(format!("{}/members/{}/loans", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to list loans")
        .json()
        .await
        .expect("Failed to parse loans");
    assert_eq!(loans[0]["status"], "overdue");

    // return: 3 days late at 0.50/day
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, log_id))
        .send()
        .await
        .expect("Failed to return");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["fine_charged"], true);
    assert_eq!(body["fine"]["amount"], "1.50");
    let fine_id = body["fine"]["fine_id"].as_i64().expect("No fine_id");

    assert_eq!(available_copies(&client, &isbn).await, 2);

    // second return is rejected and increments nothing
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, log_id))
        .send()
        .await
        .expect("Failed to return");
    assert_eq!(response.status(), 409);
    assert_eq!(available_copies(&client, &isbn).await, 2);

    // the fine is listed as outstanding
    let fines: Value = client
        .get(format!("{}/members/{}/fines", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to list fines")
        .json()
        .await
        .expect("Failed to parse fines");
    assert_eq!(fines.as_array().map(|a| a.len()), Some(1));
    assert_eq!(fines[0]["fine_id"].as_i64(), Some(fine_id));

    // pay it; a second payment is a benign no-op
    let body: Value = client
        .post(format!("{}/fines/{}/pay", BASE_URL, fine_id))
        .send()
        .await
        .expect("Failed to pay fine")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["changed"], true);

    let body: Value = client
        .post(format!("{}/fines/{}/pay", BASE_URL, fine_id))
        .send()
        .await
        .expect("Failed to pay fine")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["changed"], false);

    let fines: Value = client
        .get(format!("{}/members/{}/fines", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to list fines")
        .json()
        .await
        .expect("Failed to parse fines");
    assert_eq!(fines.as_array().map(|a| a.len()), Some(0));
}

#[tokio::test]
#[ignore]
async fn test_on_time_return_creates_no_fine() {
    let client = Client::new();
    let (isbn, _) = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    let response = borrow(&client, member_id, &isbn, 14).await;
    assert_eq!(response.status(), 201);
    let receipt: Value = response.json().await.expect("Failed to parse receipt");
    let log_id = receipt["log_id"].as_i64().expect("No log_id");

    let body: Value = client
        .post(format!("{}/loans/{}/return", BASE_URL, log_id))
        .send()
        .await
        .expect("Failed to return")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body["fine_charged"], false);
    assert!(body["fine"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_pay_unknown_fine_is_not_found() {
    let client = Client::new();

    let response = client
        .post(format!("{}/fines/999999999/pay", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
