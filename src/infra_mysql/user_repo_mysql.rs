use crate::application_port::AuthError;
use crate::domain_model::*;
use crate::domain_port::UserRepo;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<AccountRecord, AuthError> {
        let user_id_bytes: Vec<u8> = row
            .try_get("user_id")
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        let user_id = UserId(
            Uuid::from_slice(&user_id_bytes).map_err(|e| AuthError::Storage(e.to_string()))?,
        );

        let email: String = row
            .try_get("email")
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(AccountRecord {
            user_id,
            email,
            password_hash,
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, email, password_hash, created_at
FROM user_account
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<AccountRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, email, password_hash, created_at
FROM user_account
WHERE user_id = ?
"#,
        )
        .bind(user_id.0.as_bytes() as &[u8])
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }
}
