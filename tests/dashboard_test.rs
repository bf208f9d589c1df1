//! Integration tests for categories, budgets, the dashboard bundle and insights.

mod common;

use axum::http::StatusCode;
use common::{today, TestClient};
use serde_json::json;
use spendwise::services::ai_client::{NO_DATA_MESSAGE, OFFLINE_MESSAGE};
use spendwise::services::categories::{BUILTIN_CATEGORIES, FALLBACK_COLOR};

fn names(list: &serde_json::Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_categories_list_builtins_then_custom() {
    let client = TestClient::new();
    client.sign_up("ada@example.com").await;

    let (status, list) = client
        .post_json(
            "/api/categories",
            json!({ "name": "Pets", "type": "expense", "color": "#123456" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let list_names = names(&list);
    assert_eq!(list_names.len(), BUILTIN_CATEGORIES.len() + 1);
    assert_eq!(list_names.last().map(String::as_str), Some("Pets"));
    assert_eq!(list[0]["is_custom"], false);

    let (_, income) = client.get_json("/api/categories?type=income").await;
    assert!(income
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["type"] == "income"));
    assert!(!names(&income).contains(&"Pets".to_string()));
}

#[tokio::test]
async fn test_category_conflicts() {
    let client = TestClient::local();
    client.sign_up("ada@example.com").await;

    let (status, body) = client
        .post_json(
            "/api/categories",
            json!({ "name": "Food", "type": "expense", "color": "#000000" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let pets = json!({ "name": "Pets", "type": "expense", "color": "#123456" });
    let (status, _) = client.post_json("/api/categories", pets.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = client.post_json("/api/categories", pets).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_deleted_category_keeps_transactions() {
    let client = TestClient::new();
    client.sign_up("ada@example.com").await;

    let (_, list) = client
        .post_json(
            "/api/categories",
            json!({ "name": "Pets", "type": "expense", "color": "#123456" }),
        )
        .await;
    let pets_id = list
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Pets")
        .and_then(|c| c["id"].as_str())
        .unwrap()
        .to_string();
    client
        .add_transaction("expense", 40.0, "Pets", "Vet", &today())
        .await;

    let (_, dashboard) = client.get_json("/api/dashboard").await;
    assert_eq!(dashboard["breakdown"][0]["color"], "#123456");

    let (status, list) = client.delete(&format!("/api/categories/{pets_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!names(&list).contains(&"Pets".to_string()));

    let (_, transactions) = client.get_json("/api/transactions").await;
    assert_eq!(transactions[0]["category"], "Pets");

    let (_, dashboard) = client.get_json("/api/dashboard").await;
    assert_eq!(dashboard["breakdown"][0]["name"], "Pets");
    assert_eq!(dashboard["breakdown"][0]["color"], FALLBACK_COLOR);
}

#[tokio::test]
async fn test_budget_upsert_keeps_one_row() {
    let client = TestClient::new();
    client.sign_up("ada@example.com").await;
    client
        .add_transaction("expense", 80.0, "Food", "Groceries", &today())
        .await;

    let (status, _) = client
        .put_json("/api/budgets", json!({ "category_name": "Food", "amount": 100.0 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, view) = client
        .put_json("/api/budgets", json!({ "category_name": "Food", "amount": 200.0 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let budgets = view["budgets"].as_array().unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0]["amount"], 200.0);

    let progress = &view["progress"][0];
    assert_eq!(progress["category_name"], "Food");
    assert_eq!(progress["spent"], 80.0);
    assert_eq!(progress["percent"], 40.0);
    assert_eq!(progress["severity"], "ok");
}

#[tokio::test]
async fn test_budget_validation() {
    let client = TestClient::local();
    client.sign_up("ada@example.com").await;
    let (status, _) = client
        .put_json("/api/budgets", json!({ "category_name": "Food", "amount": -1.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = client
        .put_json("/api/budgets", json!({ "category_name": " ", "amount": 10.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, view) = client.get_json("/api/budgets").await;
    assert!(view["budgets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_over_budget_is_critical_and_clamped() {
    let client = TestClient::local();
    client.sign_up("ada@example.com").await;
    client
        .add_transaction("expense", 150.0, "Food", "Feast", &today())
        .await;
    client
        .put_json("/api/budgets", json!({ "category_name": "Food", "amount": 100.0 }))
        .await;

    let (_, dashboard) = client.get_json("/api/dashboard").await;
    let progress = &dashboard["budgets"][0];
    assert_eq!(progress["percent"], 100.0);
    assert_eq!(progress["severity"], "critical");
}

#[tokio::test]
async fn test_dashboard_totals() {
    let client = TestClient::new();
    client.sign_up("ada@example.com").await;
    client
        .add_transaction("income", 1000.0, "Salary", "Pay", &today())
        .await;
    client
        .add_transaction("expense", 200.0, "Food", "Groceries", &today())
        .await;
    client
        .add_transaction("expense", 300.0, "Bills", "Rent", "2000-01-15")
        .await;

    let (status, dashboard) = client.get_json("/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);

    let totals = &dashboard["totals"];
    assert_eq!(totals["total_income"], 1000.0);
    assert_eq!(totals["total_expense"], 500.0);
    assert_eq!(totals["balance"], 500.0);
    assert_eq!(totals["monthly_income"], 1000.0);
    assert_eq!(totals["monthly_expense"], 200.0);
    assert_eq!(totals["category_totals"]["Bills"], 300.0);
    assert!(totals["monthly_category_totals"].get("Bills").is_none());

    assert_eq!(dashboard["breakdown"][0]["name"], "Bills");
    assert_eq!(dashboard["monthly_breakdown"][0]["name"], "Food");
    assert_eq!(dashboard["monthly_breakdown"][0]["percentage"], 100.0);

    let series = dashboard["series"].as_array().unwrap();
    assert_eq!(series.len(), 6);
    assert_eq!(series[5]["income"], 1000.0);
    assert_eq!(series[5]["expense"], 200.0);
    assert_eq!(dashboard["transaction_count"], 3);
}

#[tokio::test]
async fn test_empty_dashboard() {
    let client = TestClient::local();
    client.sign_up("ada@example.com").await;
    let (_, dashboard) = client.get_json("/api/dashboard").await;
    assert_eq!(dashboard["totals"]["balance"], 0.0);
    assert!(dashboard["breakdown"].as_array().unwrap().is_empty());
    assert_eq!(dashboard["series"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_insights_degrade_gracefully() {
    let client = TestClient::new();
    client.sign_up("ada@example.com").await;

    let (status, body) = client.post_json("/api/insights", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["insight"], NO_DATA_MESSAGE);

    client
        .add_transaction("expense", 10.0, "Food", "Snack", &today())
        .await;
    // No API key configured, so the provider is reported offline.
    let (status, body) = client.post_json("/api/insights", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["insight"], OFFLINE_MESSAGE);
}
