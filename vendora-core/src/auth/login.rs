use tracing::{Instrument, debug, error, info, info_span};

use super::{
    AuthError, CredentialVerifier, SessionToken, SessionTokenIssuer,
};
use crate::identity::normalize_identifier;

/// Login entry point: verify credentials, then mint a session token.
///
/// Each call is independent. Lockout and rate limiting belong to whatever
/// sits in front of this service.
#[derive(Debug, Clone)]
pub struct LoginService {
    verifier: CredentialVerifier,
    issuer: SessionTokenIssuer,
}

impl LoginService {
    pub fn new(
        verifier: CredentialVerifier,
        issuer: SessionTokenIssuer,
    ) -> Self {
        Self { verifier, issuer }
    }

    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<SessionToken, AuthError> {
        let span = info_span!(
            "login",
            identifier = %normalize_identifier(identifier)
        );

        async move {
            let verified = self.verifier.verify(identifier, secret).await;
            let identity = match verified {
                Ok(identity) => identity,
                Err(err @ AuthError::InvalidCredentials) => {
                    debug!("credentials rejected");
                    return Err(err);
                }
                Err(err) => {
                    error!(error = %err, "login could not complete");
                    return Err(err);
                }
            };

            let token = self.issuer.issue(&identity).inspect_err(|err| {
                error!(error = %err, "failed to sign session token");
            })?;

            info!(
                account_id = %identity.account_id(),
                role = %identity.role(),
                expires_at = %token.expires_at(),
                "session issued"
            );
            Ok(token)
        }
        .instrument(span)
        .await
    }
}
