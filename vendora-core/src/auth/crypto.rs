use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
};
use password_hash::Error as PasswordHashError;
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;
use zeroize::Zeroizing;

/// Password hashing for account secrets.
///
/// Argon2id with a random per-hash salt plus a server-side pepper appended to
/// the password before hashing. The helper also keeps a throwaway hash made
/// with the same parameters so that a login for an unknown account can burn
/// the same amount of work as a wrong-password login.
pub struct AuthCrypto {
    argon2: Argon2<'static>,
    password_pepper: Zeroizing<Vec<u8>>,
    dummy_hash: String,
}

impl std::fmt::Debug for AuthCrypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCrypto")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum AuthCryptoError {
    #[error("password pepper must not be empty")]
    EmptyPasswordPepper,
    #[error("invalid Argon2 parameters: {0}")]
    InvalidArgon2Params(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

impl From<PasswordHashError> for AuthCryptoError {
    fn from(err: PasswordHashError) -> Self {
        AuthCryptoError::PasswordHash(err.to_string())
    }
}

impl AuthCrypto {
    /// Roughly 64 MiB and 3 passes; a sane server default.
    const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
    const DEFAULT_ITERATIONS: u32 = 3;
    const DEFAULT_PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;
    const DUMMY_SECRET: &'static str = "vendora-dummy-secret";

    /// Build a helper with default Argon2id parameters.
    pub fn new(
        password_pepper: impl AsRef<[u8]>,
    ) -> Result<Self, AuthCryptoError> {
        Self::with_params(
            password_pepper,
            ParamsBuilder::new()
                .m_cost(Self::DEFAULT_MEMORY_KIB)
                .t_cost(Self::DEFAULT_ITERATIONS)
                .p_cost(Self::DEFAULT_PARALLELISM)
                .output_len(32)
                .build()
                .map_err(|err| {
                    AuthCryptoError::InvalidArgon2Params(err.to_string())
                })?,
        )
    }

    /// Build a helper with caller-specified Argon2 parameters (tests and
    /// constrained environments).
    pub fn with_params(
        password_pepper: impl AsRef<[u8]>,
        params: Params,
    ) -> Result<Self, AuthCryptoError> {
        let pepper = password_pepper.as_ref();
        if pepper.is_empty() {
            return Err(AuthCryptoError::EmptyPasswordPepper);
        }

        let argon2 =
            Argon2::new(Algorithm::Argon2id, Version::default(), params);

        let mut crypto = Self {
            argon2,
            password_pepper: Zeroizing::new(pepper.to_vec()),
            dummy_hash: String::new(),
        };
        crypto.dummy_hash = crypto.hash_password(Self::DUMMY_SECRET)?;
        Ok(crypto)
    }

    /// Minimal-cost parameters. Only for tests.
    pub fn insecure_fast(
        password_pepper: impl AsRef<[u8]>,
    ) -> Result<Self, AuthCryptoError> {
        let params = ParamsBuilder::new()
            .m_cost(Params::MIN_M_COST.max(8))
            .t_cost(1)
            .p_cost(1)
            .output_len(32)
            .build()
            .map_err(|err| {
                AuthCryptoError::InvalidArgon2Params(err.to_string())
            })?;
        Self::with_params(password_pepper, params)
    }

    fn peppered(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(
            password.len() + self.password_pepper.len(),
        ));
        material.extend_from_slice(password.as_bytes());
        material.extend_from_slice(&self.password_pepper);
        material
    }

    /// Hash a password with a fresh random salt and the shared pepper. The
    /// resulting PHC string is what the identity store keeps.
    pub fn hash_password(
        &self,
        password: &str,
    ) -> Result<String, AuthCryptoError> {
        let material = self.peppered(password);

        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| AuthCryptoError::PasswordHash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(AuthCryptoError::from)?;
        let hash = self.argon2.hash_password(&material, &salt)?.to_string();
        Ok(hash)
    }

    /// Verify a password against a stored PHC hash. The digest comparison
    /// inside `password-hash` is constant time.
    ///
    /// Returns `Err` only when the stored hash cannot be parsed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthCryptoError> {
        let parsed = PasswordHash::new(password_hash)?;
        let material = self.peppered(password);
        Ok(self.argon2.verify_password(&material, &parsed).is_ok())
    }

    /// Run one verification against the internal throwaway hash and discard
    /// the outcome.
    pub fn burn_verification(&self, password: &str) {
        let _ = self.verify_password(password, &self.dummy_hash);
    }
}
