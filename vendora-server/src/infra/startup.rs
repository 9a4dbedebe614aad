use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, bail};
use chrono::Utc;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use vendora_core::auth::{AuthCrypto, SigningKeyRing};
use vendora_core::clock::SystemClock;
use vendora_core::identity::{
    Account, AccountId, IdentityLookup, InMemoryIdentityStore,
    PostgresIdentityStore, Role,
};

use super::{app_state::AppState, config::Config};

/// Seed account as written in a dev accounts file.
#[derive(Debug, Deserialize)]
struct DevAccount {
    id: String,
    email: String,
    password_hash: String,
    #[serde(default = "default_role")]
    role: String,
}

fn default_role() -> String {
    "vendor".to_string()
}

/// Load a JSON array of accounts into an in-memory store.
pub fn load_dev_accounts(path: &Path) -> anyhow::Result<InMemoryIdentityStore> {
    let raw = fs::read_to_string(path)
        .with_context(|| {
            format!("failed to read dev accounts {}", path.display())
        })?;
    let accounts: Vec<DevAccount> = serde_json::from_str(&raw)
        .with_context(|| {
            format!("failed to parse dev accounts {}", path.display())
        })?;

    let store = InMemoryIdentityStore::new();
    for account in accounts {
        store.insert(Account {
            id: AccountId::new(account.id),
            email: account.email,
            password_hash: account.password_hash,
            role: Role::new(account.role),
        });
    }
    Ok(store)
}

pub async fn connect_database(url: &str) -> anyhow::Result<sqlx::PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")
}

/// Pick the identity store: PostgreSQL when configured, otherwise the dev
/// accounts file.
pub async fn build_identity_store(
    config: &Config,
) -> anyhow::Result<Arc<dyn IdentityLookup>> {
    if let Some(database) = &config.database {
        let pool = connect_database(&database.url).await?;
        info!("identity store: postgres");
        return Ok(Arc::new(PostgresIdentityStore::new(pool)));
    }

    if let Some(path) = &config.dev_accounts {
        let store = load_dev_accounts(path)?;
        info!(
            path = %path.display(),
            accounts = store.len(),
            "identity store: dev accounts file"
        );
        return Ok(Arc::new(store));
    }

    bail!(
        "no identity store configured; set DATABASE_URL or VENDORA_DEV_ACCOUNTS"
    )
}

/// Build application state. Any failure here is fatal: the process must not
/// start serving without a usable signing key.
pub fn build_state(
    config: &Config,
    identities: Arc<dyn IdentityLookup>,
) -> anyhow::Result<AppState> {
    let crypto = AuthCrypto::new(&config.auth.password_pepper)
        .context("failed to initialise password hashing")?;
    let keys = SigningKeyRing::from_secret(&config.auth.signing_key)
        .context("signing key is unusable")?;
    let ttl = chrono::Duration::from_std(config.auth.token_ttl)
        .context("token TTL is out of range")?;
    Utc::now()
        .checked_add_signed(ttl)
        .context("token TTL pushes expiry past the representable range")?;

    Ok(AppState::assemble(
        identities,
        Arc::new(crypto),
        keys,
        Arc::new(SystemClock),
        ttl,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::{AuthConfig, ConfigMetadata, ServerConfig};
    use std::io::Write;

    #[tokio::test]
    async fn dev_accounts_file_is_normalized_on_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "u1", "email": "Vendor@Example.com",
                  "password_hash": "$argon2id$stub"}},
                {{"id": "u2", "email": "admin@example.com",
                  "password_hash": "$argon2id$stub", "role": "admin"}}
            ]"#
        )
        .unwrap();

        let store = load_dev_accounts(file.path()).unwrap();
        assert_eq!(store.len(), 2);

        let vendor = store
            .find_by_normalized_identifier("vendor@example.com")
            .await
            .unwrap()
            .expect("vendor account");
        assert_eq!(vendor.role.as_str(), "vendor");

        let admin = store
            .find_by_normalized_identifier("admin@example.com")
            .await
            .unwrap()
            .expect("admin account");
        assert_eq!(admin.role.as_str(), "admin");
    }

    fn config_with_ttl(token_ttl: std::time::Duration) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            database: None,
            auth: AuthConfig {
                password_pepper: "pepper-pepper-pepper".into(),
                signing_key: "signing-key-signing-key-signing-key".into(),
                token_ttl,
            },
            dev_accounts: None,
            metadata: ConfigMetadata::default(),
        }
    }

    #[test]
    fn unrepresentable_ttl_fails_at_startup() {
        let million_years =
            std::time::Duration::from_secs(1_000_000 * 365 * 24 * 60 * 60);
        let config = config_with_ttl(million_years);

        let err = build_state(&config, Arc::new(InMemoryIdentityStore::new()))
            .unwrap_err();
        assert!(err.to_string().contains("token TTL"));
    }

    #[test]
    fn state_builds_with_default_ttl() {
        let config = config_with_ttl(std::time::Duration::from_secs(3600));
        assert!(
            build_state(&config, Arc::new(InMemoryIdentityStore::new()))
                .is_ok()
        );
    }

    #[test]
    fn malformed_dev_accounts_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_dev_accounts(file.path()).is_err());
    }
}
