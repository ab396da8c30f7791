use crate::application_port::AuthError;
use crate::domain_model::*;

/// Read-only view of the account collaborator. Account creation and updates
/// happen outside this subsystem.
#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, AuthError>;
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<AccountRecord>, AuthError>;
}
