//! Integration tests for the health, admin and static file endpoints

mod common;

use common::spawn_app;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(&format!("{}/api/healthz", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn responses_carry_cors_headers() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(&format!("{}/api/healthz", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn preflight_request_returns_200() {
    let app = spawn_app().await;

    let response = app
        .client
        .request(reqwest::Method::OPTIONS, &format!("{}/api/chirps", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    assert!(response.headers().contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn app_serves_static_files_and_counts_hits() {
    let app = spawn_app().await;

    for _ in 0..2 {
        let response = app
            .client
            .get(&format!("{}/app/", app.address))
            .send()
            .await
            .expect("Failed to execute request");

        assert!(response.status().is_success());
        assert!(response.text().await.unwrap().contains("Welcome to Chirpy"));
    }

    let metrics = app
        .client
        .get(&format!("{}/admin/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(metrics.status().is_success());
    assert!(metrics
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(metrics.text().await.unwrap().contains("visited 2 times"));
}

#[tokio::test]
async fn reset_clears_hit_count() {
    let app = spawn_app().await;

    app.client
        .get(&format!("{}/app/", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    let response = app
        .client
        .post(&format!("{}/admin/reset", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let metrics = app
        .client
        .get(&format!("{}/admin/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(metrics.text().await.unwrap().contains("visited 0 times"));
}
