//! The bundle of services handed to persistence and authentication code.

use std::sync::Arc;

use anyhow::{Context, Result};
use common::ConfigurationError;
use tracing::info;

use crate::config::Config;
use crate::crypto::{CredentialHasher, FieldCipher, RandomGenerator};
use crate::key::{KeyProvider, StaticKeyProvider};

/// Cipher, hasher and generator sharing one key provider and one random source.
///
/// All fields are cheaply cloneable so the bundle can be cloned into every
/// repository or request handler that needs it.
#[derive(Clone, Debug)]
pub struct DataProtection {
    pub cipher: FieldCipher,
    pub hasher: CredentialHasher,
    pub random: RandomGenerator,
}

impl DataProtection {
    /// Assemble the services around an existing key provider.
    pub fn new(keys: Arc<dyn KeyProvider>, random: RandomGenerator) -> Self {
        Self {
            cipher: FieldCipher::new(keys, random.clone()),
            hasher: CredentialHasher::new(random.clone()),
            random,
        }
    }

    /// Resolve the key from `cfg` and assemble the services around it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the key is invalid, or missing in production.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigurationError> {
        let keys = StaticKeyProvider::from_config(cfg)?;
        info!(
            app_env = %cfg.app_env,
            insecure_key = keys.is_insecure(),
            "data protection initialised"
        );
        Ok(Self::new(Arc::new(keys), RandomGenerator::new()))
    }

    /// Load [`Config`] from the environment and build the services from it.
    pub fn from_env() -> Result<Self> {
        let cfg = Config::from_env()?;
        Self::from_config(&cfg).context("failed to resolve encryption key")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_wires_everything() {
        let cfg = Config {
            encryption_key: Some("1f".repeat(32)),
            ..Config::default()
        };
        let protection = DataProtection::from_config(&cfg).unwrap();

        let stored = protection.cipher.encrypt_field(Some("PII")).unwrap();
        let back = protection.cipher.decrypt_field(stored.as_deref()).unwrap();
        assert_eq!(back.as_deref(), Some("PII"));

        let digest = protection.hasher.hash("pw").unwrap();
        assert!(protection.hasher.verify("pw", &digest));

        assert_eq!(protection.random.random_token().unwrap().len(), 64);
    }

    #[test]
    fn from_config_rejects_missing_production_key() {
        let cfg = Config {
            app_env: "production".into(),
            ..Config::default()
        };
        assert!(matches!(
            DataProtection::from_config(&cfg),
            Err(ConfigurationError::MissingKey)
        ));
    }

    #[test]
    fn same_key_decrypts_across_instances() {
        let cfg = Config::from_vars([("ENCRYPTION_KEY", "ab".repeat(32))]).unwrap();
        let a = DataProtection::from_config(&cfg).unwrap();
        let b = DataProtection::from_config(&cfg).unwrap();
        let stored = a.cipher.encrypt_field(Some("shared")).unwrap();
        assert_eq!(
            b.cipher.decrypt_field(stored.as_deref()).unwrap().as_deref(),
            Some("shared")
        );
    }

    #[test]
    fn insecure_default_still_round_trips() {
        let protection = DataProtection::from_config(&Config::default()).unwrap();
        let stored = protection.cipher.encrypt_field(Some("dev")).unwrap();
        assert_eq!(
            protection
                .cipher
                .decrypt_field(stored.as_deref())
                .unwrap()
                .as_deref(),
            Some("dev")
        );
    }
}
