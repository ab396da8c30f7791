use crate::application_port::AuthError;
use crate::domain_model::*;
use chrono::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("refresh token not found")]
    NotFound,
    #[error("refresh token expired")]
    Expired,
    #[error("refresh token revoked")]
    Revoked,
    #[error("store error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for AuthError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            // The refresh path deliberately collapses all terminal states into
            // one rejection so callers cannot probe why a token stopped working.
            SessionStoreError::NotFound
            | SessionStoreError::Expired
            | SessionStoreError::Revoked => AuthError::Unauthorized,
            SessionStoreError::Storage(e) => AuthError::Storage(e),
        }
    }
}

/// Single source of truth for sessions. Owns the refresh token records'
/// lifecycle; TTL policy belongs to the caller.
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Mint and persist a fresh opaque token for `user_id`.
    async fn issue(
        &self,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<RefreshTokenRecord, SessionStoreError>;
    /// Resolve the owner of an active token. Expiry and revocation are
    /// evaluated here, at lookup time.
    async fn lookup_owner(&self, token: &str) -> Result<UserId, SessionStoreError>;
    /// Idempotent; the first revocation timestamp sticks. Unknown tokens are
    /// ignored (best-effort logout).
    async fn revoke(&self, token: &str) -> Result<(), SessionStoreError>;
    /// Drop every record, terminating all outstanding sessions.
    async fn reset_all(&self) -> Result<(), SessionStoreError>;
}
