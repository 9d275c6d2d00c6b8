//! Route handlers and the state they share

use std::sync::Arc;

use warden_core::services::token::TokenService;

pub mod auth;
pub mod health;
pub mod jwks;

pub use health::BackendCheck;

/// Application state shared by every handler
pub struct AppState {
    pub token_service: Arc<TokenService>,
    /// Backends consulted by `/health`
    pub backend_checks: Vec<Arc<dyn BackendCheck>>,
}

impl AppState {
    pub fn new(token_service: Arc<TokenService>) -> Self {
        Self {
            token_service,
            backend_checks: Vec::new(),
        }
    }

    /// Register a backend for the health endpoint
    pub fn with_backend_check(mut self, check: Arc<dyn BackendCheck>) -> Self {
        self.backend_checks.push(check);
        self
    }
}
