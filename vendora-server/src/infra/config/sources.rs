use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    pub database: Option<FileDatabaseConfig>,
    #[serde(default)]
    pub auth: FileAuthConfig,
    pub dev_accounts: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    pub url: String,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_key_file: Option<PathBuf>,
    /// Human-readable duration, e.g. `"1h"` or `"90m"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<String>,
    pub database_url: Option<String>,
    pub password_pepper: Option<String>,
    pub signing_key: Option<String>,
    pub signing_key_file: Option<PathBuf>,
    pub token_ttl: Option<String>,
    pub dev_accounts: Option<PathBuf>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: var("VENDORA_CONFIG").map(PathBuf::from),
            server_host: var("SERVER_HOST"),
            server_port: var("SERVER_PORT"),
            database_url: var("DATABASE_URL"),
            password_pepper: var("AUTH_PASSWORD_PEPPER"),
            signing_key: var("AUTH_SIGNING_KEY").or_else(|| var("JWT_SECRET")),
            signing_key_file: var("AUTH_SIGNING_KEY_FILE").map(PathBuf::from),
            token_ttl: var("AUTH_TOKEN_TTL"),
            dev_accounts: var("VENDORA_DEV_ACCOUNTS").map(PathBuf::from),
        }
    }
}

/// Unset and blank variables are treated the same.
fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
