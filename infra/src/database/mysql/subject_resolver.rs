//! MySQL implementation of the SubjectResolver trait.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

use warden_core::domain::entities::Subject;
use warden_core::errors::DomainError;
use warden_core::repositories::SubjectResolver;

use crate::InfrastructureError;

/// Resolves subjects from the `subjects` table
///
/// Inactive rows resolve to `None`, the same as a missing account.
#[derive(Clone)]
pub struct MySqlSubjectResolver {
    pool: MySqlPool,
}

impl MySqlSubjectResolver {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubjectResolver for MySqlSubjectResolver {
    async fn find_subject(&self, id: &str) -> Result<Option<Subject>, DomainError> {
        let query = r#"
            SELECT id, email, roles
            FROM subjects
            WHERE id = ? AND is_active = TRUE
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let column = |name: &str, e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to get {}: {}", name, e),
        };

        let id: String = row.try_get("id").map_err(|e| column("id", e))?;
        let email: Option<String> = row.try_get("email").map_err(|e| column("email", e))?;
        let roles: Option<String> = row.try_get("roles").map_err(|e| column("roles", e))?;

        Ok(Some(Subject {
            id,
            email,
            roles: parse_roles(roles.as_deref())?,
        }))
    }
}

/// Roles are stored as a JSON array of strings; NULL or blank means none
pub(crate) fn parse_roles(raw: Option<&str>) -> Result<Vec<String>, InfrastructureError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(json) => Ok(serde_json::from_str(json)?),
    }
}
