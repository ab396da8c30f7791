use crate::domain_model::UserId;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};

/// Persisted refresh token. Immutable after creation except for `revoked_at`,
/// which is set exactly once and never cleared.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of a refresh token. `Expired` and `Revoked` are terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SessionState {
    Active,
    Expired,
    Revoked,
}

impl RefreshTokenRecord {
    /// Mint a fresh record: 32 OS-random bytes hex-encoded, meaningless
    /// without a server-side lookup.
    pub fn mint(user_id: UserId, ttl: Duration) -> Self {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        let now = Utc::now();
        RefreshTokenRecord {
            token: hex::encode(secret),
            user_id,
            created_at: now,
            expires_at: now + ttl,
            revoked_at: None,
        }
    }

    /// Evaluate the lifecycle lazily against a wall-clock instant. Expiry is
    /// checked before revocation so a token that is both reports `Expired`.
    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if now >= self.expires_at {
            SessionState::Expired
        } else if self.revoked_at.is_some() {
            SessionState::Revoked
        } else {
            SessionState::Active
        }
    }
}
