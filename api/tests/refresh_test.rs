//! Integration tests for the refresh endpoint

mod common;

use actix_web::test;
use common::{bearer, TestContext};
use warden_api::app::create_app;
use warden_core::services::TokenServiceConfig;

#[actix_web::test]
async fn test_refresh_success() {
    let ctx = TestContext::new().await;
    let tokens = ctx.login().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": tokens.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["expires_in"].as_i64().unwrap() > 800);
    // Without rotation the response carries no new refresh token
    assert!(body.get("refresh_token").is_none());

    // The new access token is accepted
    let access_token = body["access_token"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/session")
        .insert_header(bearer(access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_refresh_with_rotation() {
    let ctx = TestContext::with_config(TokenServiceConfig {
        rotate_refresh_on_use: true,
        ..TokenServiceConfig::default()
    })
    .await;
    let tokens = ctx.login().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": tokens.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["refresh_token"].is_string());

    // The presented token was consumed
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": tokens.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_refresh_with_invalid_token() {
    let ctx = TestContext::new().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": "a.b.c.d.e" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_web::test]
async fn test_refresh_with_empty_token() {
    let ctx = TestContext::new().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_refresh_with_access_token() {
    let ctx = TestContext::new().await;
    let tokens = ctx.login().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": tokens.access_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
}
