//! `fieldseal` — at-rest protection for sensitive field values.
//!
//! Startup sequence for a host:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Optionally install structured logging with [`telemetry::init`], or scope
//!    [`telemetry::subscriber`] inside an existing one.
//! 3. Resolve the [`key::KeySource`] once and build a [`key::StaticKeyProvider`].
//! 4. Hand the resulting [`DataProtection`] bundle to persistence code, which
//!    calls [`FieldCipher::encrypt_field`] / [`FieldCipher::decrypt_field`] around
//!    column reads and writes, and [`CredentialHasher`] for stored credentials.

pub mod config;
pub mod crypto;
pub mod key;
pub mod protection;
pub mod telemetry;

pub use common::{
    ConfigurationError, CredentialDigest, CredentialError, EncryptedRecord, EncryptionError,
    GenerationError, ProtectionError,
};
pub use config::Config;
pub use crypto::{CredentialHasher, FieldCipher, RandomGenerator};
pub use protection::DataProtection;
