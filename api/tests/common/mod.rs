//! Shared setup for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use warden_api::routes::AppState;
use warden_core::{
    InMemoryKeyStore, InMemoryRevocationStore, InMemorySubjectDirectory, KeySealer, Subject,
    SystemClock, TokenPair, TokenService, TokenServiceConfig,
};

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub service: Arc<TokenService>,
    pub subjects: InMemorySubjectDirectory,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(TokenServiceConfig::default()).await
    }

    pub async fn with_config(config: TokenServiceConfig) -> Self {
        let subjects = InMemorySubjectDirectory::new();
        subjects
            .upsert(
                Subject::new("alice")
                    .with_email("alice@example.com")
                    .with_roles(["reader"]),
            )
            .await;

        let service = Arc::new(TokenService::new(
            Arc::new(InMemoryKeyStore::new()),
            Arc::new(InMemoryRevocationStore::new()),
            Arc::new(subjects.clone()),
            KeySealer::new(&[3u8; 32]).unwrap(),
            Arc::new(SystemClock),
            config,
        ));

        Self {
            state: web::Data::new(AppState::new(service.clone())),
            service,
            subjects,
        }
    }

    /// Tokens for the seeded subject
    pub async fn login(&self) -> TokenPair {
        self.service.authorize("alice").await.unwrap()
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
