use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{Account, AccountId, IdentityLookup, IdentityStoreError, Role};

/// PostgreSQL-backed implementation of the [`IdentityLookup`] port.
#[derive(Clone, Debug)]
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

type AccountRow = (String, String, String, String);

#[async_trait]
impl IdentityLookup for PostgresIdentityStore {
    async fn find_by_normalized_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, IdentityStoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, email, password_hash, role
            FROM accounts
            WHERE email = $1
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            IdentityStoreError::Unavailable(format!(
                "Failed to look up account: {}",
                e
            ))
        })?;

        let Some((id, email, password_hash, role)) = row else {
            debug!("no account row for identifier");
            return Ok(None);
        };

        if password_hash.is_empty() {
            return Err(IdentityStoreError::Corrupt(format!(
                "account {id} has an empty password hash"
            )));
        }

        Ok(Some(Account {
            id: AccountId::new(id),
            email,
            password_hash,
            role: Role::new(role),
        }))
    }
}
