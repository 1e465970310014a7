//! Secure random bytes, tokens, and passwords.

use std::sync::Arc;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use common::GenerationError;

/// Default number of random bytes behind a token (64 hex characters).
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Default generated password length.
pub const DEFAULT_PASSWORD_LEN: usize = 16;

/// Characters a generated password is drawn from.
pub const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

/// Source of cryptographically secure random bytes.
#[cfg_attr(test, mockall::automock)]
pub trait EntropySource: Send + Sync {
    /// Fill `dest` entirely, or fail without partial output being used.
    fn fill(&self, dest: &mut [u8]) -> Result<(), GenerationError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), GenerationError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| GenerationError(e.to_string()))
    }
}

/// Stateless generator of random bytes, tokens and passwords.
///
/// Cheap to clone; every clone draws from the same [`EntropySource`].
#[derive(Clone)]
pub struct RandomGenerator {
    source: Arc<dyn EntropySource>,
}

impl RandomGenerator {
    /// Generator backed by the operating system CSPRNG.
    pub fn new() -> Self {
        Self::with_source(Arc::new(OsEntropy))
    }

    pub fn with_source(source: Arc<dyn EntropySource>) -> Self {
        Self { source }
    }

    /// Return `n` uniformly random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the entropy source fails.
    pub fn random_bytes(&self, n: usize) -> Result<Vec<u8>, GenerationError> {
        let mut buf = vec![0u8; n];
        self.source.fill(&mut buf)?;
        Ok(buf)
    }

    /// Fill a fixed-size array, e.g. a nonce.
    pub fn random_array<const N: usize>(&self) -> Result<[u8; N], GenerationError> {
        let mut buf = [0u8; N];
        self.source.fill(&mut buf)?;
        Ok(buf)
    }

    /// A [`DEFAULT_TOKEN_BYTES`]-byte token as lowercase hex.
    pub fn random_token(&self) -> Result<String, GenerationError> {
        self.random_token_of(DEFAULT_TOKEN_BYTES)
    }

    /// A token of `bytes` random bytes as lowercase hex (`2 * bytes` characters).
    pub fn random_token_of(&self, bytes: usize) -> Result<String, GenerationError> {
        self.random_bytes(bytes).map(hex::encode)
    }

    /// A [`DEFAULT_PASSWORD_LEN`]-character password.
    pub fn random_password(&self) -> Result<String, GenerationError> {
        self.random_password_of(DEFAULT_PASSWORD_LEN)
    }

    /// A `length`-character password drawn from [`PASSWORD_CHARSET`].
    ///
    /// Each character is `PASSWORD_CHARSET[byte % PASSWORD_CHARSET.len()]` for one
    /// random byte. 256 is not a multiple of the charset length, so the first
    /// `256 % len` characters are very slightly more likely than the rest.
    pub fn random_password_of(&self, length: usize) -> Result<String, GenerationError> {
        let bytes = self.random_bytes(length)?;
        Ok(bytes
            .iter()
            .map(|b| char::from(PASSWORD_CHARSET[usize::from(*b) % PASSWORD_CHARSET.len()]))
            .collect())
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RandomGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomGenerator").finish_non_exhaustive()
    }
}
