//! Runtime configuration: `.env`, then an optional `vendora.toml`, then the
//! process environment. Later sources win.

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    AuthConfig, Config, ConfigMetadata, DatabaseConfig, ServerConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
