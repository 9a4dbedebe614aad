use async_trait::async_trait;
use dashmap::DashMap;

use super::{Account, IdentityLookup, IdentityStoreError, normalize_identifier};

/// Identity store held entirely in process memory, keyed by normalized email.
///
/// Used by tests and by the server's dev-accounts mode.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    accounts: DashMap<String, Account>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account. The email is normalized on the way in
    /// so later lookups see the same key the verifier produces.
    pub fn insert(&self, mut account: Account) {
        account.email = normalize_identifier(&account.email);
        self.accounts.insert(account.email.clone(), account);
    }

    pub fn with_account(self, account: Account) -> Self {
        self.insert(account);
        self
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl IdentityLookup for InMemoryIdentityStore {
    async fn find_by_normalized_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, IdentityStoreError> {
        Ok(self
            .accounts
            .get(identifier)
            .map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AccountId, Role};

    fn account(email: &str) -> Account {
        Account {
            id: AccountId::new("u1"),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::new("vendor"),
        }
    }

    #[tokio::test]
    async fn insert_normalizes_email_key() {
        let store = InMemoryIdentityStore::new()
            .with_account(account("Mixed@Case.com"));

        let found = store
            .find_by_normalized_identifier("mixed@case.com")
            .await
            .unwrap()
            .expect("account should be found");
        assert_eq!(found.email, "mixed@case.com");
    }

    #[tokio::test]
    async fn lookup_is_exact_match() {
        let store =
            InMemoryIdentityStore::new().with_account(account("a@b.com"));

        // The store does not normalize lookups itself.
        let missing = store
            .find_by_normalized_identifier("A@B.com")
            .await
            .unwrap();
        assert!(missing.is_none());
        assert_eq!(store.len(), 1);
    }
}
