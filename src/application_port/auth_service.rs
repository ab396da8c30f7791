use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operating mode of the process. Destructive administrative operations are
/// only honored on `Dev`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Dev,
    Prod,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingCredential,
    #[error("authorization header is not a bearer credential")]
    MalformedCredential,
    #[error("token malformed")]
    MalformedToken,
    #[error("token signature invalid")]
    SignatureInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("token subject is not a user id")]
    MalformedSubject,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("session is no longer valid")]
    Unauthorized,
    #[error("operation not permitted on this platform")]
    Forbidden,
    #[error("store error: {0}")]
    Storage(String),
    #[error("hashing error: {0}")]
    Hashing(String),
    #[error("signing error: {0}")]
    Signing(String),
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user_id: UserId,
    pub tokens: AuthTokens,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// A freshly minted access token, returned by the refresh exchange.
#[derive(Debug, Clone, Serialize)]
pub struct AccessGrant {
    pub access_token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies the short-lived, self-contained access token. The token
/// is a capability, not a lookup key: nothing about it is persisted server-side.
#[async_trait::async_trait]
pub trait AccessTokenCodec: Send + Sync {
    async fn issue(&self, user: UserId) -> Result<(AccessToken, DateTime<Utc>), AuthError>;
    async fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    /// Exchange the refresh token carried in the Authorization header for a new
    /// access token. The refresh token itself is not rotated or consumed.
    async fn refresh(&self, authorization: Option<&str>) -> Result<AccessGrant, AuthError>;
    /// Best-effort logout: succeeds even when the token is unknown or already
    /// revoked, so the response shape never leaks token validity.
    async fn revoke(&self, authorization: Option<&str>) -> Result<(), AuthError>;
    /// The single gate every protected route calls before touching resources.
    async fn authorize(&self, authorization: Option<&str>) -> Result<UserId, AuthError>;
    /// Administrative bulk session termination, refused outside the dev platform.
    async fn reset_sessions(&self) -> Result<(), AuthError>;
}
