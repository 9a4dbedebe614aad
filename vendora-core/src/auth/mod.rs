//! Credential verification and session-token issuance.
//!
//! A login runs in two steps: [`CredentialVerifier`] turns an
//! `(identifier, secret)` pair into a [`VerifiedIdentity`], and
//! [`SessionTokenIssuer`] turns that identity into a signed, time-bounded
//! [`SessionToken`]. [`LoginService`] wires the two together;
//! [`SessionTokenVerifier`] is the mirror used by request authorization.

mod crypto;
mod keys;
mod login;
mod token;
mod verifier;

use thiserror::Error;

use crate::identity::IdentityStoreError;

pub use crypto::{AuthCrypto, AuthCryptoError};
pub use keys::{SigningKey, SigningKeyRing};
pub use login::LoginService;
pub use token::{
    SessionClaims, SessionToken, SessionTokenIssuer, SessionTokenVerifier,
    TokenError,
};
pub use verifier::{CredentialVerifier, VerifiedIdentity};

/// Errors surfaced by the login flow.
///
/// "No such account" and "wrong password" are deliberately the same
/// variant so callers cannot tell which one happened.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Identity lookup unavailable: {0}")]
    LookupUnavailable(#[source] IdentityStoreError),
    #[error("Token signing unavailable: {0}")]
    SigningUnavailable(String),
}

impl From<IdentityStoreError> for AuthError {
    fn from(err: IdentityStoreError) -> Self {
        AuthError::LookupUnavailable(err)
    }
}
