//! Resolution and ownership of the field encryption key.
//!
//! # Lifecycle
//!
//! 1. At startup, [`KeySource::resolve`] inspects the loaded [`Config`] once and
//!    decides between a configured key and the insecure development default.
//! 2. [`StaticKeyProvider`] takes ownership of the resulting key and keeps it
//!    behind an `Arc` for the rest of the process. There is no way to replace it.
//! 3. The cipher borrows a short-lived copy via [`KeyProvider::symmetric_key`]
//!    for each operation; the copy is zeroed on drop.
//!
//! # Security invariants
//!
//! - Key bytes are **never** logged, serialised, or included in error messages.
//! - The key is never derived from data being protected.

pub mod provider;

pub use provider::{KeyProvider, StaticKeyProvider, SymmetricKey, KEY_LEN};

#[cfg(test)]
pub use provider::MockKeyProvider;

use common::ConfigurationError;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::Config;

/// Passphrase hashed into the fallback key when no key is configured.
///
/// Anything encrypted under this key is readable by anyone with the source.
const INSECURE_DEFAULT_PASSPHRASE: &[u8] = b"fieldseal-insecure-development-key";

/// Where the active key came from, decided once at startup.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// `ENCRYPTION_KEY` was present and valid.
    Configured(SymmetricKey),
    /// No key was configured outside production; a fixed, public key is used.
    InsecureDefault,
}

impl KeySource {
    /// Decide the key source from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidKey`] if a key is configured but is
    /// not 64 hex characters, and [`ConfigurationError::MissingKey`] if no key is
    /// configured while running in production.
    pub fn resolve(cfg: &Config) -> Result<Self, ConfigurationError> {
        match cfg.encryption_key.as_deref().map(str::trim) {
            Some(hex) if !hex.is_empty() => {
                let key = SymmetricKey::from_hex(hex)?;
                debug!("using configured encryption key");
                Ok(KeySource::Configured(key))
            }
            _ if cfg.is_production() => Err(ConfigurationError::MissingKey),
            _ => Ok(KeySource::InsecureDefault),
        }
    }

    pub fn is_insecure(&self) -> bool {
        matches!(self, KeySource::InsecureDefault)
    }

    /// Consume the source and produce the key it stands for.
    pub fn into_key(self) -> SymmetricKey {
        match self {
            KeySource::Configured(key) => key,
            KeySource::InsecureDefault => insecure_default_key(),
        }
    }
}

fn insecure_default_key() -> SymmetricKey {
    let digest = Sha256::digest(INSECURE_DEFAULT_PASSPHRASE);
    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&digest);
    SymmetricKey::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(key: Option<&str>, app_env: &str) -> Config {
        Config {
            encryption_key: key.map(str::to_owned),
            app_env: app_env.into(),
            ..Config::default()
        }
    }

    #[test]
    fn configured_key_is_used() {
        let hex = "42".repeat(KEY_LEN);
        let source = KeySource::resolve(&cfg(Some(&hex), "production")).unwrap();
        assert!(!source.is_insecure());
        assert_eq!(source.into_key().as_bytes(), &[0x42u8; KEY_LEN]);
    }

    #[test]
    fn missing_key_falls_back_outside_production() {
        let source = KeySource::resolve(&cfg(None, "development")).unwrap();
        assert!(source.is_insecure());
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let source = KeySource::resolve(&cfg(Some("   "), "test")).unwrap();
        assert!(source.is_insecure());
        assert!(matches!(
            KeySource::resolve(&cfg(Some(""), "production")),
            Err(ConfigurationError::MissingKey)
        ));
    }

    #[test]
    fn missing_key_fails_in_production() {
        assert!(matches!(
            KeySource::resolve(&cfg(None, "production")),
            Err(ConfigurationError::MissingKey)
        ));
    }

    #[test]
    fn invalid_key_is_never_defaulted() {
        assert!(matches!(
            KeySource::resolve(&cfg(Some("deadbeef"), "development")),
            Err(ConfigurationError::InvalidKey(_))
        ));
    }

    #[test]
    fn insecure_default_is_stable() {
        let a = KeySource::InsecureDefault.into_key();
        let b = KeySource::InsecureDefault.into_key();
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), &[0u8; KEY_LEN]);
    }
}
