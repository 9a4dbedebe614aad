use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};
use parking_lot::RwLock;
use zeroize::Zeroizing;

use super::AuthError;

/// HMAC key material for signing session tokens.
pub struct SigningKey {
    secret: Zeroizing<Vec<u8>>,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// HS256 keys shorter than the digest size weaken the MAC.
    pub const MIN_LENGTH: usize = 32;

    /// Validate and wrap raw key material.
    ///
    /// Fails with [`AuthError::SigningUnavailable`] for empty or short keys;
    /// callers treat that as fatal at startup.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, AuthError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AuthError::SigningUnavailable(
                "signing key is empty".to_string(),
            ));
        }
        if secret.len() < Self::MIN_LENGTH {
            return Err(AuthError::SigningUnavailable(format!(
                "signing key must be at least {} bytes, got {}",
                Self::MIN_LENGTH,
                secret.len()
            )));
        }

        Ok(Self {
            secret: Zeroizing::new(secret.to_vec()),
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }

    fn same_material(&self, other: &SigningKey) -> bool {
        self.secret.as_slice() == other.secret.as_slice()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.secret.len())
            .finish_non_exhaustive()
    }
}

/// The set of signing keys in use.
///
/// The first key signs new tokens; every key is accepted when verifying, so
/// tokens minted before a rotation keep working until they expire or their
/// key falls off the end of the ring.
#[derive(Debug, Clone)]
pub struct SigningKeyRing {
    keys: Arc<RwLock<Vec<Arc<SigningKey>>>>,
}

impl SigningKeyRing {
    /// Upper bound on retained keys, the current one included.
    pub const MAX_KEYS: usize = 5;

    pub fn new(current: SigningKey) -> Self {
        Self {
            keys: Arc::new(RwLock::new(vec![Arc::new(current)])),
        }
    }

    /// Convenience for `SigningKeyRing::new(SigningKey::from_secret(..)?)`.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, AuthError> {
        SigningKey::from_secret(secret).map(Self::new)
    }

    /// Key used for new signatures.
    pub fn current(&self) -> Arc<SigningKey> {
        let keys = self.keys.read();
        Arc::clone(&keys[0])
    }

    /// Every key accepted for verification, newest first.
    pub fn verification_keys(&self) -> Vec<Arc<SigningKey>> {
        self.keys.read().clone()
    }

    /// Make `new_key` current. Older keys stay for verification, capped at
    /// [`Self::MAX_KEYS`]. Rotating to the key that is already current is a
    /// no-op.
    pub fn rotate(&self, new_key: SigningKey) {
        let mut keys = self.keys.write();
        if keys[0].same_material(&new_key) {
            return;
        }
        keys.insert(0, Arc::new(new_key));
        keys.truncate(Self::MAX_KEYS);
    }

    /// Drop old keys, keeping the newest `keep` (never fewer than one).
    pub fn retain_newest(&self, keep: usize) {
        let mut keys = self.keys.write();
        keys.truncate(keep.max(1));
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(fill: u8) -> SigningKey {
        SigningKey::from_secret([fill; 32]).unwrap()
    }

    #[test]
    fn rejects_empty_and_short_keys() {
        assert!(matches!(
            SigningKey::from_secret(b""),
            Err(AuthError::SigningUnavailable(_))
        ));
        assert!(matches!(
            SigningKey::from_secret(b"too-short"),
            Err(AuthError::SigningUnavailable(_))
        ));
    }

    #[test]
    fn rotation_puts_new_key_first() {
        let ring = SigningKeyRing::new(key(1));
        ring.rotate(key(2));

        assert_eq!(ring.len(), 2);
        assert!(ring.current().same_material(&key(2)));
        assert!(ring.verification_keys()[1].same_material(&key(1)));
    }

    #[test]
    fn rotation_is_bounded() {
        let ring = SigningKeyRing::new(key(0));
        for fill in 1..=10 {
            ring.rotate(key(fill));
        }
        assert_eq!(ring.len(), SigningKeyRing::MAX_KEYS);

        ring.retain_newest(2);
        assert_eq!(ring.len(), 2);

        ring.retain_newest(0);
        assert_eq!(ring.len(), 1);
        assert!(ring.current().same_material(&key(10)));
    }

    #[test]
    fn rotating_to_current_key_is_noop() {
        let ring = SigningKeyRing::new(key(7));
        ring.rotate(key(7));
        assert_eq!(ring.len(), 1);
    }
}
