use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use super::{
    models::{AuthConfig, Config, ConfigMetadata, DatabaseConfig, ServerConfig},
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["vendora.toml", "config/vendora.toml"];

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, then the TOML file, then the process environment.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;
        let mut load = self.load_from_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Resolve only the password pepper, for commands that hash passwords
    /// and never sign tokens.
    pub fn load_pepper(&self) -> Result<String, ConfigLoadError> {
        self.load_env_file()?;
        self.pepper_from_env(EnvConfig::gather())
    }

    pub fn pepper_from_env(
        &self,
        env: EnvConfig,
    ) -> Result<String, ConfigLoadError> {
        let (file_config, _) = self.load_file_config(&env)?;
        let file_auth = file_config.unwrap_or_default().auth;
        let pepper =
            resolve_pepper(env.password_pepper, file_auth.password_pepper)?;
        validation::check_pepper(&pepper)?;
        Ok(pepper)
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };
        match loaded {
            Ok(loaded) => Ok(loaded),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Resolve configuration against an explicit set of environment values.
    /// Does not touch `.env` or the process environment.
    pub fn load_from_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) =
            self.compose_config(file_config, env, config_path)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig { path });
                }
                path
            }
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if file_config.is_none() {
            warnings.push_with_hint(
                "No vendora.toml detected; \
                 falling back to environment variables",
                "Set VENDORA_CONFIG or create vendora.toml to pin settings",
            );
        }

        let FileConfig {
            server: file_server,
            database: file_database,
            auth: file_auth,
            dev_accounts: file_dev_accounts,
        } = file_config.unwrap_or_default();

        let port = match env.server_port.as_deref() {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                ConfigLoadError::InvalidPort {
                    value: raw.to_string(),
                }
            })?,
            None => file_server.port.unwrap_or(DEFAULT_PORT),
        };

        let server = ServerConfig {
            host: env
                .server_host
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        };

        let database = env
            .database_url
            .or(file_database.map(|db| db.url))
            .map(|url| DatabaseConfig { url });

        let password_pepper =
            resolve_pepper(env.password_pepper, file_auth.password_pepper)?;

        let signing_key = match env.signing_key.or(file_auth.signing_key) {
            Some(key) => key,
            None => match env.signing_key_file.or(file_auth.signing_key_file) {
                Some(path) => read_secret_file(&path)?,
                None => {
                    return Err(ConfigLoadError::MissingSecret {
                        field: "AUTH_SIGNING_KEY",
                    });
                }
            },
        };

        let token_ttl = match env.token_ttl.or(file_auth.token_ttl) {
            Some(raw) => parse_ttl(&raw)?,
            None => DEFAULT_TOKEN_TTL,
        };

        let config = Config {
            server,
            database,
            auth: AuthConfig {
                password_pepper,
                signing_key,
                token_ttl,
            },
            dev_accounts: env.dev_accounts.or(file_dev_accounts),
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded: false,
            },
        };

        warnings.extend(validation::apply_guard_rails(&config)?);

        Ok((config, warnings))
    }
}

fn resolve_pepper(
    env: Option<String>,
    file: Option<String>,
) -> Result<String, ConfigLoadError> {
    env.or(file).ok_or(ConfigLoadError::MissingSecret {
        field: "AUTH_PASSWORD_PEPPER",
    })
}

/// Accepts humantime strings (`"1h"`, `"90m"`) or a bare number of seconds.
fn parse_ttl(raw: &str) -> Result<Duration, ConfigLoadError> {
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(raw).map_err(|source| {
        ConfigLoadError::InvalidTtl {
            value: raw.to_string(),
            source,
        }
    })
}

/// Read a file containing a single secret, trimming surrounding whitespace.
fn read_secret_file(path: &Path) -> Result<String, ConfigLoadError> {
    fs::read_to_string(path)
        .map(|contents| contents.trim().to_string())
        .map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{field} is required")]
    MissingSecret { field: &'static str },
    #[error("invalid SERVER_PORT '{value}'")]
    InvalidPort { value: String },
    #[error("invalid AUTH_TOKEN_TTL '{value}'")]
    InvalidTtl {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
