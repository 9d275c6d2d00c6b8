//! Integration tests for the logout endpoint

mod common;

use actix_web::test;
use common::{bearer, TestContext};
use warden_api::app::create_app;

#[actix_web::test]
async fn test_logout_revokes_both_tokens() {
    let ctx = TestContext::new().await;
    let tokens = ctx.login().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header(bearer(&tokens.access_token))
        .set_json(serde_json::json!({ "refresh_token": tokens.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Logged out successfully");
    assert_eq!(body["access_token_revoked"], true);

    // The access token is blacklisted
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/session")
        .insert_header(bearer(&tokens.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // The refresh token is revoked
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": tokens.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_logout_without_access_token() {
    let ctx = TestContext::new().await;
    let tokens = ctx.login().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .set_json(serde_json::json!({ "refresh_token": tokens.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["access_token_revoked"], false);

    // The access token stays usable until it expires
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/session")
        .insert_header(bearer(&tokens.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_logout_with_unusable_access_token() {
    let ctx = TestContext::new().await;
    let tokens = ctx.login().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header(bearer("garbage"))
        .set_json(serde_json::json!({ "refresh_token": tokens.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["access_token_revoked"], false);
}

#[actix_web::test]
async fn test_logout_with_foreign_refresh_token() {
    let ctx = TestContext::new().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .set_json(serde_json::json!({ "refresh_token": "not-a-token" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_logout_missing_body() {
    let ctx = TestContext::new().await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .set_json(serde_json::json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}
