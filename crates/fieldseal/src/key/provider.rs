//! [`SymmetricKey`] and the [`KeyProvider`] seam the cipher depends on.

use std::fmt;
use std::sync::Arc;

use common::ConfigurationError;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::KeySource;
use crate::config::Config;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// Cloned into operation call stacks when needed. The memory is overwritten
/// with zeroes on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a key from its 64-character hex form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidKey`] on a wrong length or a
    /// non-hex character. The message never echoes the input.
    pub fn from_hex(hex: &str) -> Result<Self, ConfigurationError> {
        if hex.len() != KEY_LEN * 2 {
            return Err(ConfigurationError::InvalidKey(format!(
                "expected {} hex characters, got {}",
                KEY_LEN * 2,
                hex.len()
            )));
        }
        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(hex, &mut bytes)
            .map_err(|_| ConfigurationError::InvalidKey("not valid hex".into()))?;
        Ok(Self(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Supplies the process-wide encryption key.
///
/// Injected into [`crate::crypto::FieldCipher`] at construction so tests can
/// substitute a fixed key.
#[cfg_attr(test, mockall::automock)]
pub trait KeyProvider: Send + Sync {
    /// Return a copy of the active key. Deterministic for the life of the provider.
    fn symmetric_key(&self) -> SymmetricKey;

    /// Returns `true` if the key is the public development fallback.
    fn is_insecure(&self) -> bool;
}

/// Key provider holding one immutable key for the life of the process.
#[derive(Clone, Debug)]
pub struct StaticKeyProvider {
    key: Arc<SymmetricKey>,
    insecure: bool,
}

impl StaticKeyProvider {
    /// Take ownership of the key behind `source`.
    ///
    /// Emits a warning when the source is [`KeySource::InsecureDefault`] so that
    /// operators can spot the misconfiguration in the logs.
    pub fn new(source: KeySource) -> Self {
        let insecure = source.is_insecure();
        if insecure {
            warn!(
                insecure_key = true,
                "ENCRYPTION_KEY not set; encrypting with the public development key"
            );
        }
        Self {
            key: Arc::new(source.into_key()),
            insecure,
        }
    }

    /// Resolve the key source from `cfg` and build a provider from it.
    ///
    /// # Errors
    ///
    /// See [`KeySource::resolve`].
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigurationError> {
        KeySource::resolve(cfg).map(Self::new)
    }

    /// Provider for a caller-supplied key, e.g. a fixed key in tests.
    pub fn with_key(key: SymmetricKey) -> Self {
        Self::new(KeySource::Configured(key))
    }
}

impl KeyProvider for StaticKeyProvider {
    fn symmetric_key(&self) -> SymmetricKey {
        SymmetricKey::clone(&self.key)
    }

    fn is_insecure(&self) -> bool {
        self.insecure
    }
}
