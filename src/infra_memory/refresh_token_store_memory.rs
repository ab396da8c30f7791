use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{Duration, Utc};
use dashmap::DashMap;

/// DashMap-backed store for tests and the dev backend. Per-key locking gives
/// the same revoke-vs-lookup consistency the relational backend gets from
/// row-level atomicity.
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenStore {
    records: DashMap<String, RefreshTokenRecord>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn issue(
        &self,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<RefreshTokenRecord, SessionStoreError> {
        let record = RefreshTokenRecord::mint(user_id, ttl);
        self.records.insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn lookup_owner(&self, token: &str) -> Result<UserId, SessionStoreError> {
        let record = self
            .records
            .get(token)
            .ok_or(SessionStoreError::NotFound)?;
        match record.state_at(Utc::now()) {
            SessionState::Active => Ok(record.user_id),
            SessionState::Expired => Err(SessionStoreError::Expired),
            SessionState::Revoked => Err(SessionStoreError::Revoked),
        }
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionStoreError> {
        if let Some(mut record) = self.records.get_mut(token) {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn reset_all(&self) -> Result<(), SessionStoreError> {
        self.records.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId(uuid::Uuid::new_v4())
    }

    #[tokio::test]
    async fn issue_then_lookup() {
        let store = MemoryRefreshTokenStore::new();
        let owner = user();
        let record = store.issue(owner, Duration::days(60)).await.unwrap();
        assert_eq!(record.token.len(), 64);
        assert_eq!(store.lookup_owner(&record.token).await.unwrap(), owner);
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let store = MemoryRefreshTokenStore::new();
        let err = store.lookup_owner("deadbeef").await.unwrap_err();
        assert!(matches!(err, SessionStoreError::NotFound));
    }

    #[tokio::test]
    async fn lookup_after_ttl_is_expired() {
        let store = MemoryRefreshTokenStore::new();
        let record = store.issue(user(), Duration::seconds(-1)).await.unwrap();
        let err = store.lookup_owner(&record.token).await.unwrap_err();
        assert!(matches!(err, SessionStoreError::Expired));
    }

    #[tokio::test]
    async fn revoke_is_terminal_and_idempotent() {
        let store = MemoryRefreshTokenStore::new();
        let record = store.issue(user(), Duration::days(60)).await.unwrap();

        store.revoke(&record.token).await.unwrap();
        let err = store.lookup_owner(&record.token).await.unwrap_err();
        assert!(matches!(err, SessionStoreError::Revoked));

        // Second revoke still succeeds and keeps the original timestamp.
        store.revoke(&record.token).await.unwrap();
        let first = store.records.get(&record.token).unwrap().revoked_at;
        store.revoke(&record.token).await.unwrap();
        assert_eq!(store.records.get(&record.token).unwrap().revoked_at, first);
    }

    #[tokio::test]
    async fn revoking_unknown_token_is_silent() {
        let store = MemoryRefreshTokenStore::new();
        store.revoke("deadbeef").await.unwrap();
    }

    #[tokio::test]
    async fn reset_terminates_every_session() {
        let store = MemoryRefreshTokenStore::new();
        let a = store.issue(user(), Duration::days(60)).await.unwrap();
        let b = store.issue(user(), Duration::days(60)).await.unwrap();
        store.reset_all().await.unwrap();
        assert!(store.lookup_owner(&a.token).await.is_err());
        assert!(store.lookup_owner(&b.token).await.is_err());
    }

    #[tokio::test]
    async fn tokens_are_unique_per_issue() {
        let store = MemoryRefreshTokenStore::new();
        let owner = user();
        let a = store.issue(owner, Duration::days(60)).await.unwrap();
        let b = store.issue(owner, Duration::days(60)).await.unwrap();
        assert_ne!(a.token, b.token);
    }
}
