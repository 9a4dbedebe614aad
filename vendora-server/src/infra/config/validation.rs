use std::time::Duration;

use thiserror::Error;

use super::models::{AuthConfig, Config};

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("{field} is too weak: {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("AUTH_TOKEN_TTL must be at least one second")]
    TokenTtlTooShort,
    #[error("AUTH_TOKEN_TTL must not exceed {max:?}")]
    TokenTtlTooLong { max: Duration },
}

const MIN_PEPPER_LENGTH: usize = 16;
const LONG_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_TOKEN_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    enforce_auth(&config.auth, &mut warnings)?;

    if config.database.is_some() && config.dev_accounts.is_some() {
        warnings.push_with_hint(
            "both DATABASE_URL and a dev accounts file are configured; \
             the database wins",
            "Unset VENDORA_DEV_ACCOUNTS outside local development",
        );
    }

    Ok(warnings)
}

fn enforce_auth(
    auth: &AuthConfig,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    check_pepper(&auth.password_pepper)?;

    if auth.token_ttl < Duration::from_secs(1) {
        return Err(ConfigGuardRailError::TokenTtlTooShort);
    }

    if auth.token_ttl > MAX_TOKEN_TTL {
        return Err(ConfigGuardRailError::TokenTtlTooLong {
            max: MAX_TOKEN_TTL,
        });
    }

    if auth.token_ttl > LONG_TOKEN_TTL {
        warnings.push_with_hint(
            format!(
                "session tokens live for {}; \
                 stateless tokens cannot be revoked early",
                humantime::format_duration(auth.token_ttl)
            ),
            "Keep AUTH_TOKEN_TTL at a day or less",
        );
    }

    Ok(())
}

pub fn check_pepper(pepper: &str) -> Result<(), ConfigGuardRailError> {
    if pepper.len() < MIN_PEPPER_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            reason: format!("must be at least {MIN_PEPPER_LENGTH} characters"),
        });
    }
    Ok(())
}
