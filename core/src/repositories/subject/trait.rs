//! Identity resolver trait

use async_trait::async_trait;

use crate::domain::entities::Subject;
use crate::errors::DomainError;

/// Looks up live accounts by identifier
///
/// The token engine calls this to confirm a token's `sub` still maps to a
/// real account and to pick up attribute changes on refresh.
#[async_trait]
pub trait SubjectResolver: Send + Sync {
    /// Find a subject by identifier
    ///
    /// # Returns
    /// * `Ok(Some(Subject))` - The account exists
    /// * `Ok(None)` - No such account, or it was removed
    /// * `Err(DomainError)` - Lookup failed
    async fn find_subject(&self, id: &str) -> Result<Option<Subject>, DomainError>;
}
