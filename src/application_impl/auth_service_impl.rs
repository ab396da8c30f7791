use crate::application_impl::bearer_token;
use crate::application_port::*;
use crate::domain_model::UserId;
use crate::domain_port::{RefreshTokenStore, UserRepo};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        // An unparseable digest is treated the same as a mismatch: the caller
        // only learns that authentication failed.
        let Ok(parsed) = PasswordHash::new(password_hash) else {
            return Ok(false);
        };

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hashing(format!("verify error: {e}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub issuer: String,
    pub access_ttl: Duration,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String, // user id as string
    exp: i64,
    iat: i64,
    iss: String,
    jti: String, // keeps two tokens minted in the same second distinct
}

pub struct JwtHs256Codec {
    cfg: TokenConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: TokenConfig) -> Self {
        JwtHs256Codec { cfg }
    }

    fn validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = true;
        // No clock-skew allowance: expiry is strict wall-clock comparison.
        v.leeway = 0;
        v.set_issuer(&[self.cfg.issuer.clone()]);
        v
    }
}

#[async_trait::async_trait]
impl AccessTokenCodec for JwtHs256Codec {
    async fn issue(&self, user: UserId) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let iat_dt = Utc::now();
        let exp_dt = iat_dt + self.cfg.access_ttl;
        let claims = AccessClaims {
            sub: user.to_string(),
            exp: exp_dt.timestamp(),
            iat: iat_dt.timestamp(),
            iss: self.cfg.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|e| AuthError::Signing(e.to_string()))?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(&self.cfg.signing_key),
            &self.validation(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
            _ => AuthError::MalformedToken,
        })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::MalformedSubject)
    }
}

/// Session policy: how long a refresh token lives and which operating mode
/// the process runs in. The access TTL lives with the codec.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub refresh_ttl: Duration,
    pub platform: Platform,
}

pub struct RealAuthService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_codec: Arc<dyn AccessTokenCodec>,
    refresh_store: Arc<dyn RefreshTokenStore>,
    policy: AuthPolicy,
}

impl RealAuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn AccessTokenCodec>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
            token_codec,
            refresh_store,
            policy,
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { email, password } = request;

        let account = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let ok = self
            .credential_hasher
            .verify_password(&password, &account.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let (access_token, access_exp) = self.token_codec.issue(account.user_id).await?;

        // Login always mints a fresh refresh token; existing ones stay valid
        // until their own expiry or an explicit revoke.
        let refresh = self
            .refresh_store
            .issue(account.user_id, self.policy.refresh_ttl)
            .await?;

        Ok(LoginResult {
            user_id: account.user_id,
            tokens: AuthTokens {
                access_token,
                refresh_token: RefreshToken(refresh.token),
                access_token_expires_at: access_exp,
                refresh_token_expires_at: refresh.expires_at,
            },
        })
    }

    async fn refresh(&self, authorization: Option<&str>) -> Result<AccessGrant, AuthError> {
        let token = bearer_token(authorization)?;

        let user_id = self.refresh_store.lookup_owner(token).await?;

        // A token whose owning account is gone is just another dead session;
        // the caller learns no more than it would for a revoked token.
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(AuthError::Unauthorized);
        }

        let (access_token, expires_at) = self.token_codec.issue(user_id).await?;
        Ok(AccessGrant {
            access_token,
            expires_at,
        })
    }

    async fn revoke(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let token = bearer_token(authorization)?;

        // The store is already silent about unknown tokens; only storage
        // faults propagate.
        self.refresh_store.revoke(token).await?;
        Ok(())
    }

    async fn authorize(&self, authorization: Option<&str>) -> Result<UserId, AuthError> {
        let token = bearer_token(authorization)?;
        self.token_codec.verify(token).await
    }

    async fn reset_sessions(&self) -> Result<(), AuthError> {
        if self.policy.platform != Platform::Dev {
            return Err(AuthError::Forbidden);
        }
        self.refresh_store.reset_all().await?;
        info!("all refresh sessions cleared");
        Ok(())
    }
}
