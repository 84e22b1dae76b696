//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use cogs_core::test_utils::MockChatServer;
use http_body_util::BodyExt;
use std::path::PathBuf;
use tower::ServiceExt;

fn sample_dataset() -> Arc<Dataset> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data");
    Arc::new(Dataset::load(&dir).unwrap())
}

fn test_state(agent: AgentConfig) -> AppState {
    let mut prompts = PromptLibrary::embedded_only();
    AppState::new(sample_dataset(), agent, &mut prompts).unwrap()
}

fn setup_test_app() -> Router {
    create_router(test_state(AgentConfig::default()), ServerConfig::default())
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_agent(app: Router, body: serde_json::Value) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/agent")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

// ========== Dashboard API Tests ==========

#[tokio::test]
async fn test_health() {
    let response = get(setup_test_app(), "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["days"], 30);
}

#[tokio::test]
async fn test_options() {
    let response = get(setup_test_app(), "/api/options").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["date_start"], "2024-03-01");
    assert_eq!(json["date_end"], "2024-03-30");
    assert_eq!(json["sites"].as_array().unwrap().len(), 3);
    assert_eq!(json["product_types"][1], "generic");
}

#[tokio::test]
async fn test_kpis_respect_date_range() {
    let all = get_body_json(get(setup_test_app(), "/api/kpis").await).await;
    assert_eq!(all["days"], 30);

    let response = get(setup_test_app(), "/api/kpis?from=2024-03-01&to=2024-03-07").await;
    assert_eq!(response.status(), StatusCode::OK);
    let week = get_body_json(response).await;
    assert_eq!(week["days"], 7);
    assert!(week["cogs"].as_f64().unwrap() < all["cogs"].as_f64().unwrap());
}

#[tokio::test]
async fn test_open_ended_range() {
    let json = get_body_json(get(setup_test_app(), "/api/daily?from=2024-03-25").await).await;
    let days = json.as_array().unwrap();
    assert_eq!(days.len(), 6);
    assert_eq!(days[0]["date"], "2024-03-25");
    assert!(days[0].get("margin_dollars").is_some());
}

#[tokio::test]
async fn test_sites_sorted_by_cogs() {
    let response = get(setup_test_app(), "/api/sites").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let sites = json.as_array().unwrap();
    assert_eq!(sites.len(), 3);
    let cogs: Vec<f64> = sites.iter().map(|s| s["cogs"].as_f64().unwrap()).collect();
    assert!(cogs.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_customers_filtered_by_site() {
    let response = get(setup_test_app(), "/api/customers?sites=North%20Pharmacy").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(!json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_products_by_type() {
    let json = get_body_json(get(setup_test_app(), "/api/products?product_type=brand").await).await;
    let products = json.as_array().unwrap();
    assert!(!products.is_empty());
    assert!(products.iter().all(|p| p["is_generic"] == false));
}

#[tokio::test]
async fn test_bad_filter_input() {
    let response = get(setup_test_app(), "/api/kpis?from=March").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("'from'"));

    let response = get(setup_test_app(), "/api/sites?product_type=store").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(setup_test_app(), "/api/daily?from=2024-03-10&to=2024-03-01").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Export API Tests ==========

#[tokio::test]
async fn test_export_csv() {
    let response = get(
        setup_test_app(),
        "/api/export?sites=North%20Pharmacy&product_type=brand",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers()[axum::http::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("date,site,customer_id"));
    assert_eq!(lines.count(), 25);
}

// ========== Agent API Tests ==========

#[tokio::test]
async fn test_context() {
    let response = get(setup_test_app(), "/api/context?customers=CUST-001").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["customers"], serde_json::json!(["CUST-001"]));
    assert_eq!(json["generic_filter"], "All");
    assert_eq!(json["samples"]["daily"].as_array().unwrap().len(), 21);
    assert_eq!(json["samples"]["customers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_agent_local_default() {
    let response = post_agent(setup_test_app(), serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["mode"], "local-demo");
    assert!(json["question"].as_str().unwrap().contains("GCR"));
    assert_eq!(json["reply"]["key_insights"].as_array().unwrap().len(), 5);
    assert_eq!(json["reply"]["next_questions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_agent_with_filter() {
    let body = serde_json::json!({
        "question": "Why is brand spend high?",
        "mode": "local",
        "filter": {"customers": [], "product_type": "brand"}
    });
    let json = get_body_json(post_agent(setup_test_app(), body).await).await;
    assert_eq!(json["question"], "Why is brand spend high?");
    // Correlation note and margin note only
    assert_eq!(json["reply"]["key_insights"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_agent_unknown_mode() {
    let response = post_agent(setup_test_app(), serde_json::json!({"mode": "magic"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_agent_remote() {
    let answer = r#"{"key_insights": ["COGs tracks brand volume"], "narrative": "Short.", "next_questions": [], "chart_suggestions": []}"#;
    let mock = MockChatServer::start(format!("```json\n{}\n```", answer)).await;

    let agent = AgentConfig {
        base_url: mock.url(),
        model: "gpt-mock".to_string(),
        api_key: "sk-test".to_string(),
        ..Default::default()
    };
    let app = create_router(test_state(agent), ServerConfig::default());

    let response = post_agent(app, serde_json::json!({"mode": "openai"})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["mode"], "openai");
    assert_eq!(json["model"], "gpt-mock");
    assert_eq!(json["reply"]["key_insights"][0], "COGs tracks brand volume");

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer sk-test"));
}

#[tokio::test]
async fn test_agent_remote_raw_reply() {
    let mock = MockChatServer::start("Costs are up, mostly at North Pharmacy.").await;
    let agent = AgentConfig {
        base_url: mock.url(),
        ..Default::default()
    };
    let app = create_router(test_state(agent), ServerConfig::default());

    let json = get_body_json(post_agent(app, serde_json::json!({"mode": "openai"})).await).await;
    assert_eq!(
        json["reply"]["raw"],
        "Costs are up, mostly at North Pharmacy."
    );
}

#[tokio::test]
async fn test_agent_remote_failure() {
    let mock = MockChatServer::start_failing(500).await;
    let agent = AgentConfig {
        base_url: mock.url(),
        ..Default::default()
    };
    let app = create_router(test_state(agent), ServerConfig::default());

    let response = post_agent(app, serde_json::json!({"mode": "openai"})).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = get_body_json(response).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_minimal_dataset_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("line_items.csv"),
        "date,site,customer_id,product_id,product_name,is_generic,qty,extended_cogs,extended_revenue,GCR\n\
         2024-01-01,Main,C1,P1,Alpha,true,1,10,20,0.9\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("daily_summary.csv"),
        "date,daily_cogs,daily_rev,avg_gcr\n2024-01-01,10,20,0.9\n",
    )
    .unwrap();

    let dataset = Arc::new(Dataset::load(dir.path()).unwrap());
    let mut prompts = PromptLibrary::embedded_only();
    let state = AppState::new(dataset, AgentConfig::default(), &mut prompts).unwrap();
    let app = create_router(state, ServerConfig::default());

    let json = get_body_json(get(app, "/api/kpis").await).await;
    assert_eq!(json["days"], 1);
    assert_eq!(json["margin_pct"], 0.5);
}
