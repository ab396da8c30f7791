use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Duration, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

pub struct MySqlRefreshTokenStore {
    pool: MySqlPool,
}

impl MySqlRefreshTokenStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRefreshTokenStore { pool }
    }

    #[inline]
    fn uid_from_bytes(id: &[u8]) -> Result<UserId, SessionStoreError> {
        Ok(UserId(
            Uuid::from_slice(id).map_err(|e| SessionStoreError::Storage(e.to_string()))?,
        ))
    }

    fn row_to_record(token: &str, row: MySqlRow) -> Result<RefreshTokenRecord, SessionStoreError> {
        let user_id_bytes: Vec<u8> = row
            .try_get("user_id")
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?;
        let expires_at: DateTime<Utc> = row
            .try_get("expires_at")
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?;
        let revoked_at: Option<DateTime<Utc>> = row
            .try_get("revoked_at")
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?;

        Ok(RefreshTokenRecord {
            token: token.to_string(),
            user_id: Self::uid_from_bytes(&user_id_bytes)?,
            created_at,
            expires_at,
            revoked_at,
        })
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MySqlRefreshTokenStore {
    async fn issue(
        &self,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<RefreshTokenRecord, SessionStoreError> {
        let record = RefreshTokenRecord::mint(user_id, ttl);

        sqlx::query(
            r#"
INSERT INTO refresh_token (token, user_id, created_at, expires_at, revoked_at)
VALUES (?, ?, ?, ?, NULL)
"#,
        )
        .bind(&record.token)
        .bind(record.user_id.0.as_bytes() as &[u8])
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionStoreError::Storage(e.to_string()))?;

        Ok(record)
    }

    async fn lookup_owner(&self, token: &str) -> Result<UserId, SessionStoreError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, created_at, expires_at, revoked_at
FROM refresh_token
WHERE token = ?
"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionStoreError::Storage(e.to_string()))?;

        let row = row_opt.ok_or(SessionStoreError::NotFound)?;
        let record = Self::row_to_record(token, row)?;

        match record.state_at(Utc::now()) {
            SessionState::Active => Ok(record.user_id),
            SessionState::Expired => Err(SessionStoreError::Expired),
            SessionState::Revoked => Err(SessionStoreError::Revoked),
        }
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionStoreError> {
        // The IS NULL guard makes the update atomic at row level: the first
        // revocation timestamp sticks, and a lookup racing this statement sees
        // the token either active or revoked, never in between.
        sqlx::query(
            r#"
UPDATE refresh_token
SET revoked_at = ?
WHERE token = ? AND revoked_at IS NULL
"#,
        )
        .bind(Utc::now())
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionStoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn reset_all(&self) -> Result<(), SessionStoreError> {
        sqlx::query(r#"DELETE FROM refresh_token"#)
            .execute(&self.pool)
            .await
            .map_err(|e| SessionStoreError::Storage(e.to_string()))?;

        Ok(())
    }
}
