use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{
    Algorithm, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{AuthError, SigningKeyRing, VerifiedIdentity};
use crate::clock::Clock;
use crate::identity::{AccountId, Role};

/// The complete claim set carried by a session token. Nothing else is
/// encoded; unknown claims are rejected on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    pub sub: AccountId,
    pub role: Role,
    /// Issued at, UNIX seconds.
    pub iat: i64,
    /// Expiry, UNIX seconds.
    pub exp: i64,
}

/// A signed bearer token plus the timestamps it encodes.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn into_string(self) -> String {
        self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Lifetime in whole seconds.
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Session expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Mints session tokens for verified identities.
#[derive(Debug, Clone)]
pub struct SessionTokenIssuer {
    keys: SigningKeyRing,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionTokenIssuer {
    pub const DEFAULT_TTL_SECS: i64 = 3600;

    pub fn new(
        keys: SigningKeyRing,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self { keys, clock, ttl }
    }

    /// Sign `{sub, role, iat, exp}` with the current key.
    ///
    /// The result depends only on the identity, the clock, and the key ring.
    /// No server-side session record is written.
    pub fn issue(
        &self,
        identity: &VerifiedIdentity,
    ) -> Result<SessionToken, AuthError> {
        let issued_at = self.clock.now().trunc_subsecs(0);
        let expires_at =
            issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
                AuthError::SigningUnavailable(format!(
                    "token lifetime of {}s overflows the expiry timestamp",
                    self.ttl.num_seconds()
                ))
            })?;

        let claims = SessionClaims {
            sub: identity.account_id().clone(),
            role: identity.role().clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let key = self.keys.current();
        let token =
            encode(&Header::new(Algorithm::HS256), &claims, key.encoding())
                .map_err(|e| AuthError::SigningUnavailable(e.to_string()))?;

        Ok(SessionToken {
            token,
            issued_at,
            expires_at,
        })
    }
}

/// Checks signature and expiry of presented session tokens.
#[derive(Debug, Clone)]
pub struct SessionTokenVerifier {
    keys: SigningKeyRing,
    clock: Arc<dyn Clock>,
}

impl SessionTokenVerifier {
    pub fn new(keys: SigningKeyRing, clock: Arc<dyn Clock>) -> Self {
        Self { keys, clock }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }

    /// Verify the signature against each key in the ring (newest first),
    /// then reject the token once `now >= exp`.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let validation = Self::validation();

        let mut last_error = None;
        for key in self.keys.verification_keys() {
            match decode::<SessionClaims>(token, key.decoding(), &validation) {
                Ok(data) => return self.check_expiry(data.claims),
                Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => {
                    last_error = Some(e);
                    continue;
                }
                Err(e) => return Err(TokenError::Invalid(e.to_string())),
            }
        }

        Err(TokenError::Invalid(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no verification key".to_string()),
        ))
    }

    fn check_expiry(
        &self,
        claims: SessionClaims,
    ) -> Result<SessionClaims, TokenError> {
        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
