use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use invest_core::adapters::{InMemoryPlanRepository, InMemoryTransactionRepository, InMemoryUserRepository};
use invest_core::domain::UserSnapshot;
use invest_core::ports::UserRepository;
use invest_core::{create_app, AppState};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

async fn setup_test_app() -> (String, InMemoryUserRepository) {
    let users = InMemoryUserRepository::new();
    let app_state = AppState::new(
        Arc::new(InMemoryTransactionRepository::new()),
        Arc::new(InMemoryPlanRepository::default()),
        Arc::new(users.clone()),
        "$",
    );
    let app = create_app(app_state);

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], 0));
    let server = axum::Server::bind(&addr).serve(app.into_make_service());
    let actual_addr = server.local_addr();

    tokio::spawn(async move {
        server.await.unwrap();
    });

    (format!("http://{}", actual_addr), users)
}

fn decimal(value: &Value) -> BigDecimal {
    value.as_str().unwrap().parse().unwrap()
}

async fn create_plan(client: &reqwest::Client, base_url: &str) -> String {
    let res = client
        .post(format!("{}/admin/plans", base_url))
        .json(&json!({
            "name": "Basic",
            "roi": "10",
            "minAmount": "100",
            "duration": "30 days",
            "features": ["Weekly statements"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let plan: Value = res.json().await.unwrap();
    plan["id"].as_str().unwrap().to_string()
}

async fn open_investment(client: &reqwest::Client, base_url: &str, user: Uuid, plan_id: &str) -> Value {
    let res = client
        .post(format!("{}/users/{}/investments", base_url, user))
        .json(&json!({ "plan_id": plan_id, "amount": "1000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn post_admin(client: &reqwest::Client, base_url: &str, id: &str, action: &str) -> reqwest::Response {
    client
        .post(format!("{}/admin/transactions/{}/{}", base_url, id, action))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (base_url, _users) = setup_test_app().await;
    let res = reqwest::get(format!("{}/health", base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_investment_accrues_after_approval() {
    let (base_url, users) = setup_test_app().await;
    let client = reqwest::Client::new();
    let user = Uuid::new_v4();
    users
        .put(
            user,
            UserSnapshot {
                deposit: BigDecimal::from(500),
                interest: BigDecimal::from(20),
            },
        )
        .await
        .unwrap();

    let plan_id = create_plan(&client, &base_url).await;
    let investment = open_investment(&client, &base_url, user, &plan_id).await;
    assert_eq!(investment["status"], "pending");
    assert_eq!(decimal(&investment["planData"]["interest"]), BigDecimal::from(100));
    let id = investment["id"].as_str().unwrap();

    let res = post_admin(&client, &base_url, id, "approve").await;
    assert_eq!(res.status(), StatusCode::OK);
    let outcome: Value = res.json().await.unwrap();
    assert_eq!(outcome["transaction"]["status"], "active");
    let activated_at: DateTime<Utc> =
        serde_json::from_value(outcome["transaction"]["activatedAt"].clone()).unwrap();

    // A second approval is refused and changes nothing.
    let res = post_admin(&client, &base_url, id, "approve").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let halfway = activated_at + Duration::days(15);
    let res = client
        .get(format!("{}/users/{}/balances", base_url, user))
        .query(&[("at", halfway.to_rfc3339())])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let balances: Value = res.json().await.unwrap();
    assert_eq!(balances["active_investments"], 1);
    assert_eq!(decimal(&balances["balances"]["capital_balance"]), BigDecimal::from(500));
    assert_eq!(decimal(&balances["balances"]["profit_balance"]), BigDecimal::from(70));
    assert_eq!(decimal(&balances["balances"]["wallet_balance"]), BigDecimal::from(570));
    assert_eq!(balances["formatted"]["wallet_balance"], "$570.00");

    // Not matured yet.
    let res = post_admin(&client, &base_url, id, "complete").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_investment_below_plan_minimum_is_rejected() {
    let (base_url, _users) = setup_test_app().await;
    let client = reqwest::Client::new();
    let plan_id = create_plan(&client, &base_url).await;

    let res = client
        .post(format!("{}/users/{}/investments", base_url, Uuid::new_v4()))
        .json(&json!({ "plan_id": plan_id, "amount": "99.99" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deposit_rejection_requires_reason() {
    let (base_url, _users) = setup_test_app().await;
    let client = reqwest::Client::new();
    let user = Uuid::new_v4();

    let res = client
        .post(format!("{}/users/{}/deposits", base_url, user))
        .json(&json!({
            "amount": "250",
            "address": "TQn9Y2khEsLJW1ChVWFMSMeRDow5KcbLSE",
            "network": "trc20",
            "coin_name": "USDT",
            "converted_amount": "250"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let deposit: Value = res.json().await.unwrap();
    assert_eq!(deposit["walletData"]["network"], "TRC20");
    let id = deposit["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/admin/transactions/{}/reject", base_url, id))
        .json(&json!({ "reason": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/admin/transactions/{}/reject", base_url, id))
        .json(&json!({ "reason": "Funds never arrived" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let outcome: Value = res.json().await.unwrap();
    assert_eq!(outcome["transaction"]["status"], "rejected");
    assert_eq!(outcome["transaction"]["rejectionReason"], "Funds never arrived");
    assert!(outcome["emitted"].is_null());
}

#[tokio::test]
async fn test_cancel_with_idempotency_key_refunds_once() {
    let (base_url, _users) = setup_test_app().await;
    let client = reqwest::Client::new();
    let user = Uuid::new_v4();
    let plan_id = create_plan(&client, &base_url).await;
    let investment = open_investment(&client, &base_url, user, &plan_id).await;
    let id = investment["id"].as_str().unwrap();

    let mut refund_ids = Vec::new();
    for _ in 0..2 {
        let res = client
            .post(format!("{}/admin/transactions/{}/cancel", base_url, id))
            .header("x-idempotency-key", "cancel-once")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let outcome: Value = res.json().await.unwrap();
        assert_eq!(outcome["transaction"]["status"], "cancelled");
        assert_eq!(outcome["emitted"]["type"], "investment_refund");
        refund_ids.push(outcome["emitted"]["id"].clone());
    }
    assert_eq!(refund_ids[0], refund_ids[1]);

    let res = client
        .get(format!("{}/users/{}/transactions", base_url, user))
        .send()
        .await
        .unwrap();
    let history: Vec<Value> = res.json().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(
        history.iter().filter(|tx| tx["type"] == "investment_refund").count(),
        1
    );

    let res = client
        .get(format!("{}/users/{}/transactions/export?format=csv", base_url, user))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/csv");
    let body = res.text().await.unwrap();
    assert_eq!(body.lines().count(), 3);
}

#[tokio::test]
async fn test_plan_update_and_delete() {
    let (base_url, _users) = setup_test_app().await;
    let client = reqwest::Client::new();
    let plan_id = create_plan(&client, &base_url).await;

    let res = client
        .put(format!("{}/admin/plans/{}", base_url, plan_id))
        .json(&json!({
            "name": "Basic Plus",
            "roi": "12",
            "minAmount": "150",
            "duration": "6 weeks"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(format!("{}/admin/plans/{}", base_url, plan_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let plans: Vec<Value> = client
        .get(format!("{}/admin/plans", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(plans.is_empty());
}
