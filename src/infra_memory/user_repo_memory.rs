use crate::application_port::AuthError;
use crate::domain_model::*;
use crate::domain_port::UserRepo;
use dashmap::DashMap;

/// In-memory account view for tests and the dev backend. Accounts are seeded
/// through `insert`; the `UserRepo` port itself stays read-only.
#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    accounts: DashMap<UserId, AccountRecord>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: AccountRecord) {
        self.accounts.insert(account.user_id, account);
    }

    pub fn remove(&self, user_id: UserId) {
        self.accounts.remove(&user_id);
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, AuthError> {
        Ok(self
            .accounts
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<AccountRecord>, AuthError> {
        Ok(self.accounts.get(&user_id).map(|entry| entry.value().clone()))
    }
}
