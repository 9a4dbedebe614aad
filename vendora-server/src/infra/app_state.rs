use std::{fmt, sync::Arc};

use vendora_core::auth::{
    AuthCrypto, CredentialVerifier, LoginService, SessionTokenIssuer,
    SessionTokenVerifier, SigningKeyRing,
};
use vendora_core::clock::Clock;
use vendora_core::identity::IdentityLookup;

#[derive(Clone)]
pub struct AppState {
    login: Arc<LoginService>,
    sessions: Arc<SessionTokenVerifier>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(login: LoginService, sessions: SessionTokenVerifier) -> Self {
        Self {
            login: Arc::new(login),
            sessions: Arc::new(sessions),
        }
    }

    /// Wire the login flow from its collaborators. The key ring and clock are
    /// shared by issuance and verification.
    pub fn assemble(
        identities: Arc<dyn IdentityLookup>,
        crypto: Arc<AuthCrypto>,
        keys: SigningKeyRing,
        clock: Arc<dyn Clock>,
        token_ttl: chrono::Duration,
    ) -> Self {
        let verifier = CredentialVerifier::new(identities, crypto);
        let issuer = SessionTokenIssuer::new(
            keys.clone(),
            Arc::clone(&clock),
            token_ttl,
        );
        let sessions = SessionTokenVerifier::new(keys, clock);
        Self::new(LoginService::new(verifier, issuer), sessions)
    }

    pub fn login_service(&self) -> &LoginService {
        &self.login
    }

    pub fn session_verifier(&self) -> &SessionTokenVerifier {
        &self.sessions
    }
}
