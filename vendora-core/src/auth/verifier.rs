use std::sync::Arc;

use tracing::warn;

use super::{AuthCrypto, AuthError};
use crate::identity::{AccountId, IdentityLookup, Role, normalize_identifier};

/// Proof that a secret matched a stored account. Only the verifier mints it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    account_id: AccountId,
    role: Role,
}

impl VerifiedIdentity {
    pub(crate) fn new(account_id: AccountId, role: Role) -> Self {
        Self { account_id, role }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}

/// Checks an `(identifier, secret)` pair against the identity store.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    lookup: Arc<dyn IdentityLookup>,
    crypto: Arc<AuthCrypto>,
}

impl CredentialVerifier {
    pub fn new(
        lookup: Arc<dyn IdentityLookup>,
        crypto: Arc<AuthCrypto>,
    ) -> Self {
        Self { lookup, crypto }
    }

    /// Resolve the identifier case-insensitively and compare the secret.
    ///
    /// Unknown accounts and wrong secrets both yield
    /// [`AuthError::InvalidCredentials`], and both pay for one Argon2
    /// verification. Store failures yield [`AuthError::LookupUnavailable`].
    pub async fn verify(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<VerifiedIdentity, AuthError> {
        let normalized = normalize_identifier(identifier);

        let Some(account) = self
            .lookup
            .find_by_normalized_identifier(&normalized)
            .await?
        else {
            self.crypto.burn_verification(secret);
            return Err(AuthError::InvalidCredentials);
        };

        match self.crypto.verify_password(secret, &account.password_hash) {
            Ok(true) => Ok(VerifiedIdentity::new(account.id, account.role)),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(err) => {
                warn!(
                    account_id = %account.id,
                    error = %err,
                    "stored password hash could not be parsed"
                );
                self.crypto.burn_verification(secret);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::identity::{
        Account, IdentityStoreError, InMemoryIdentityStore,
    };

    const PASSWORD: &str = "CorrectHorseBattery1!";

    fn verifier_with(
        store: InMemoryIdentityStore,
        crypto: Arc<AuthCrypto>,
    ) -> CredentialVerifier {
        CredentialVerifier::new(Arc::new(store), crypto)
    }

    fn seeded() -> CredentialVerifier {
        let crypto =
            Arc::new(AuthCrypto::insecure_fast("test-pepper").unwrap());
        let store = InMemoryIdentityStore::new().with_account(Account {
            id: AccountId::new("u1"),
            email: "a@b.com".into(),
            password_hash: crypto.hash_password(PASSWORD).unwrap(),
            role: Role::new("vendor"),
        });
        verifier_with(store, crypto)
    }

    #[derive(Debug)]
    struct UnreachableStore;

    #[async_trait]
    impl IdentityLookup for UnreachableStore {
        async fn find_by_normalized_identifier(
            &self,
            _identifier: &str,
        ) -> Result<Option<Account>, IdentityStoreError> {
            Err(IdentityStoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn any_casing_resolves_the_same_account() {
        let verifier = seeded();
        for casing in ["a@b.com", "A@B.com", "A@b.COM"] {
            let identity = verifier.verify(casing, PASSWORD).await.unwrap();
            assert_eq!(identity.account_id().as_str(), "u1");
            assert_eq!(identity.role().as_str(), "vendor");
        }
    }

    #[tokio::test]
    async fn wrong_secret_and_unknown_account_are_indistinguishable() {
        let verifier = seeded();

        let wrong = verifier.verify("a@b.com", "wrong").await.unwrap_err();
        let missing =
            verifier.verify("nouser@b.com", "anything").await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(missing, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn empty_secret_fails_by_comparison() {
        let verifier = seeded();
        let err = verifier.verify("a@b.com", "").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unparseable_stored_hash_is_invalid_credentials() {
        let crypto =
            Arc::new(AuthCrypto::insecure_fast("test-pepper").unwrap());
        let store = InMemoryIdentityStore::new().with_account(Account {
            id: AccountId::new("u2"),
            email: "broken@b.com".into(),
            password_hash: "plaintext-oops".into(),
            role: Role::new("vendor"),
        });
        let verifier = verifier_with(store, crypto);

        let err = verifier
            .verify("broken@b.com", "plaintext-oops")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn store_failure_is_lookup_unavailable() {
        let crypto =
            Arc::new(AuthCrypto::insecure_fast("test-pepper").unwrap());
        let verifier =
            CredentialVerifier::new(Arc::new(UnreachableStore), crypto);

        let err = verifier.verify("a@b.com", PASSWORD).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::LookupUnavailable(IdentityStoreError::Unavailable(_))
        ));
    }
}
