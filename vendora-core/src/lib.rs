//! # Vendora Core
//!
//! The security-critical slice of the Vendora vendor directory: turning a
//! login `(email, password)` pair into a signed, time-bounded session token.
//!
//! ## Overview
//!
//! - [`identity`]: account records and the [`identity::IdentityLookup`] port,
//!   with in-memory and PostgreSQL adapters
//! - [`auth`]: password verification, token issuance, token verification and
//!   the [`auth::LoginService`] that ties them together
//! - [`clock`]: injectable time source for deterministic expiry handling
//!
//! ## Feature Flags
//!
//! - `database` (default): PostgreSQL identity store and migrations via SQLx
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chrono::Duration;
//! use vendora_core::auth::{
//!     AuthCrypto, CredentialVerifier, LoginService, SessionTokenIssuer,
//!     SigningKeyRing,
//! };
//! use vendora_core::clock::SystemClock;
//! use vendora_core::identity::InMemoryIdentityStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let crypto = Arc::new(AuthCrypto::new("server-pepper")?);
//! let keys =
//!     SigningKeyRing::from_secret("a-signing-key-of-at-least-32-bytes!!")?;
//! let store = Arc::new(InMemoryIdentityStore::new());
//! let verifier = CredentialVerifier::new(store, crypto);
//! let clock = Arc::new(SystemClock);
//! let issuer = SessionTokenIssuer::new(keys, clock, Duration::hours(1));
//!
//! let login = LoginService::new(verifier, issuer);
//! let token = login.login("Vendor@Example.com", "password").await?;
//! println!("{}", token.as_str());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod clock;
pub mod identity;

pub use auth::{
    AuthError, LoginService, SessionClaims, SessionToken, TokenError,
};
pub use identity::{Account, AccountId, IdentityLookup, Role};

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
