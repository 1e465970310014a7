//! Salted PBKDF2-HMAC-SHA512 hashing for verification-only secrets.

use common::wire::DIGEST_LEN;
use common::{CredentialDigest, CredentialError};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use tracing::trace;
use zeroize::Zeroizing;

use super::random::RandomGenerator;

/// PBKDF2 iteration count. Changing it invalidates every stored digest.
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// Byte length of a freshly generated salt.
pub const SALT_LEN: usize = 64;

/// One-way hasher for passwords and other credentials.
#[derive(Clone, Debug, Default)]
pub struct CredentialHasher {
    rng: RandomGenerator,
}

impl CredentialHasher {
    pub fn new(rng: RandomGenerator) -> Self {
        Self { rng }
    }

    /// Hash `secret` under a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::EmptySecret`] for an empty secret and
    /// [`CredentialError::Entropy`] if no salt could be generated.
    pub fn hash(&self, secret: &str) -> Result<CredentialDigest, CredentialError> {
        self.hash_with_salt(secret, &[])
    }

    /// Hash `secret` under an explicit salt. Deterministic for a given pair.
    ///
    /// An empty salt counts as omitted and is replaced by a fresh random one,
    /// since a digest with no salt can never verify.
    pub fn hash_with_salt(
        &self,
        secret: &str,
        salt: &[u8],
    ) -> Result<CredentialDigest, CredentialError> {
        if secret.is_empty() {
            return Err(CredentialError::EmptySecret);
        }
        let salt = if salt.is_empty() {
            self.rng.random_bytes(SALT_LEN)?
        } else {
            salt.to_vec()
        };
        let hash = derive(secret.as_bytes(), &salt, PBKDF2_ITERATIONS);
        Ok(CredentialDigest {
            hash: hash.to_vec(),
            salt,
        })
    }

    /// Check `candidate` against a stored digest in constant time.
    ///
    /// Returns `false` rather than an error when the candidate, hash or salt is
    /// empty, so an unverifiable lookup is indistinguishable from a mismatch.
    pub fn verify(&self, candidate: &str, digest: &CredentialDigest) -> bool {
        if candidate.is_empty() || digest.hash.is_empty() || digest.salt.is_empty() {
            return false;
        }
        let computed = derive(candidate.as_bytes(), &digest.salt, PBKDF2_ITERATIONS);
        let ok: bool = computed.as_slice().ct_eq(&digest.hash).into();
        trace!(ok, "credential verified");
        ok
    }

    /// Verify against the two hex columns a storage layer keeps.
    ///
    /// Any absent or undecodable input verifies as `false`.
    pub fn verify_stored(
        &self,
        candidate: Option<&str>,
        hash_hex: Option<&str>,
        salt_hex: Option<&str>,
    ) -> bool {
        let (Some(candidate), Some(hash_hex), Some(salt_hex)) = (candidate, hash_hex, salt_hex)
        else {
            return false;
        };
        match CredentialDigest::from_hex(hash_hex, salt_hex) {
            Ok(digest) => self.verify(candidate, &digest),
            Err(_) => false,
        }
    }
}

fn derive(secret: &[u8], salt: &[u8], rounds: u32) -> Zeroizing<[u8; DIGEST_LEN]> {
    let mut out = Zeroizing::new([0u8; DIGEST_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha512>(secret, salt, rounds, out.as_mut_slice());
    out
}
