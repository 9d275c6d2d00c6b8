//! Liveness and backend health

use actix_web::{http::StatusCode, web, HttpResponse};
use async_trait::async_trait;

use warden_infra::{DatabasePool, RedisClient};

use super::AppState;

/// A backend the service cannot work without
#[async_trait]
pub trait BackendCheck: Send + Sync {
    /// Name reported in the health body
    fn name(&self) -> &'static str;

    /// True when the backend answers
    async fn check(&self) -> bool;
}

#[async_trait]
impl BackendCheck for DatabasePool {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> bool {
        matches!(self.health_check().await, Ok(true))
    }
}

#[async_trait]
impl BackendCheck for RedisClient {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check(&self) -> bool {
        matches!(self.health_check().await, Ok(true))
    }
}

/// Health check endpoint handler
///
/// Returns 503 if any registered backend is down. With the in-memory
/// backend there is nothing to check and the service is always healthy.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let mut checks = serde_json::Map::new();
    let mut healthy = true;

    for check in &state.backend_checks {
        let up = check.check().await;
        if !up {
            log::error!("Health check failed for {}", check.name());
            healthy = false;
        }
        checks.insert(
            check.name().to_string(),
            serde_json::json!(if up { "up" } else { "down" }),
        );
    }

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    HttpResponse::build(status).json(serde_json::json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "service": "warden",
        "version": env!("CARGO_PKG_VERSION"),
        "checks": checks,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
