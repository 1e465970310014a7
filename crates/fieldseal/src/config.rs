//! Configuration loading and validation.
//!
//! All values are read from environment variables at startup. Key material is
//! only carried here as the raw hex string; [`crate::key::KeySource`] turns it
//! into a [`crate::key::SymmetricKey`] exactly once.

use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated fieldseal configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Hex-encoded 32-byte field encryption key. Optional outside production.
    #[serde(default)]
    pub encryption_key: Option<String>,

    /// Deployment environment name. `production` forbids the insecure default key.
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_app_env() -> String {
    "development".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be deserialised or a value is invalid.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    /// Load and validate configuration from an explicit variable map.
    ///
    /// Keys use the same names as the environment (`ENCRYPTION_KEY`, `APP_ENV`, ...).
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(config::Environment::default().source(Some(map)))
    }

    fn load(source: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(source)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Returns `true` when running in the production environment.
    pub fn is_production(&self) -> bool {
        self.app_env.trim().eq_ignore_ascii_case("production")
    }

    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.app_env, "APP_ENV")?;
        ensure_non_empty(&self.log_level, "LOG_LEVEL")?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encryption_key: None,
            app_env: default_app_env(),
            log_level: default_log_level(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("app_env", &self.app_env)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_app_env(), "development");
        assert_eq!(default_log_level(), "info");
        let cfg = Config::default();
        assert!(cfg.encryption_key.is_none());
        assert!(!cfg.is_production());
    }

    #[test]
    fn from_vars_reads_all_fields() {
        let cfg = Config::from_vars([
            ("ENCRYPTION_KEY", "00".repeat(32)),
            ("APP_ENV", "production".to_string()),
            ("LOG_LEVEL", "debug".to_string()),
        ])
        .unwrap();
        assert_eq!(cfg.encryption_key.as_deref(), Some("00".repeat(32).as_str()));
        assert!(cfg.is_production());
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn from_vars_applies_defaults() {
        let cfg = Config::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert!(cfg.encryption_key.is_none());
        assert_eq!(cfg.app_env, "development");
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn production_match_is_case_insensitive() {
        let cfg = Config {
            app_env: "Production".into(),
            ..Config::default()
        };
        assert!(cfg.is_production());
    }

    #[test]
    fn validate_rejects_empty_log_level() {
        let cfg = Config {
            log_level: "  ".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let cfg = Config {
            encryption_key: Some("ab".repeat(32)),
            ..Config::default()
        };
        let dbg = format!("{cfg:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("abab"));
    }
}
