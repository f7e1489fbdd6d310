
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::Value;
use test_utils::*;

use portfolio_contact::settings::AppConfig;

#[actix_rt::test]
async fn home_describes_the_service() {
    let app = TestApp::spawn(test_config()).await;

    let response = app.client.get(&format!("{}/", app.address)).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Portfolio Contact Test");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_rt::test]
async fn health_reports_integrations() {
    let app = TestApp::spawn(AppConfig {
        rate_limit_in_memory: true,
        ..test_config()
    })
    .await;

    let response = app
        .client
        .get(&format!("{}/api/health", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["counter_store"], "memory: ok");
    assert_eq!(body["email_transport"], "not_configured");
}

#[actix_rt::test]
async fn health_uptime_counts_from_startup() {
    let app = TestApp::spawn(test_config()).await;
    let spawned_at = Utc::now();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let body: Value = app
        .client
        .get(&format!("{}/api/health", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let start_at = DateTime::parse_from_rfc3339(body["start_at"].as_str().unwrap()).unwrap();
    assert!(start_at.with_timezone(&Utc) <= spawned_at);
}
