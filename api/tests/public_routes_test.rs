//! Integration tests for unauthenticated endpoints

mod common;

use std::sync::Arc;

use actix_web::{http::header, test, web};
use async_trait::async_trait;
use common::TestContext;
use warden_api::app::create_app;
use warden_api::routes::{AppState, BackendCheck};

/// Backend stub with a fixed answer
struct FixedBackend {
    name: &'static str,
    up: bool,
}

#[async_trait]
impl BackendCheck for FixedBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn check(&self) -> bool {
        self.up
    }
}

#[actix_web::test]
async fn test_jwks_lists_signing_key() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/.well-known/jwks.json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key(header::CACHE_CONTROL));

    let body: serde_json::Value = test::read_body_json(resp).await;
    let keys = body["keys"].as_array().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["kty"], "RSA");
    assert_eq!(keys[0]["use"], "enc");
    assert_eq!(keys[0]["alg"], "RSA-OAEP-256");
    // Only public material is published
    assert!(keys[0].get("d").is_none());
}

#[actix_web::test]
async fn test_health_check() {
    let ctx = TestContext::new().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_health_reports_each_backend() {
    let ctx = TestContext::new().await;
    let state = AppState::new(ctx.service.clone())
        .with_backend_check(Arc::new(FixedBackend { name: "database", up: true }))
        .with_backend_check(Arc::new(FixedBackend { name: "redis", up: true }));
    let app = test::init_service(create_app(web::Data::new(state))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["checks"]["database"], "up");
    assert_eq!(body["checks"]["redis"], "up");
}

#[actix_web::test]
async fn test_health_unavailable_when_backend_down() {
    let ctx = TestContext::new().await;
    let state = AppState::new(ctx.service.clone())
        .with_backend_check(Arc::new(FixedBackend { name: "database", up: true }))
        .with_backend_check(Arc::new(FixedBackend { name: "redis", up: false }));
    let app = test::init_service(create_app(web::Data::new(state))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 503);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["redis"], "down");
    assert_eq!(body["checks"]["database"], "up");
}

#[actix_web::test]
async fn test_unknown_route() {
    let ctx = TestContext::new().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
}
