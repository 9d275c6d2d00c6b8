//! In-memory subject directory

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::Subject;
use crate::errors::DomainError;

use super::r#trait::SubjectResolver;

/// Subject resolver over a process-local map
#[derive(Clone, Default)]
pub struct InMemorySubjectDirectory {
    subjects: Arc<RwLock<HashMap<String, Subject>>>,
}

impl InMemorySubjectDirectory {
    /// Create a new empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a subject
    pub async fn upsert(&self, subject: Subject) {
        let mut subjects = self.subjects.write().await;
        subjects.insert(subject.id.clone(), subject);
    }

    /// Remove a subject, returning it if present
    pub async fn remove(&self, id: &str) -> Option<Subject> {
        let mut subjects = self.subjects.write().await;
        subjects.remove(id)
    }
}

#[async_trait]
impl SubjectResolver for InMemorySubjectDirectory {
    async fn find_subject(&self, id: &str) -> Result<Option<Subject>, DomainError> {
        let subjects = self.subjects.read().await;
        Ok(subjects.get(id).cloned())
    }
}
