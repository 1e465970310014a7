//! Shared error taxonomy and storage formats used across `fieldseal` crates.

pub mod error;
pub mod wire;

pub use error::{
    ConfigurationError, CredentialError, EncryptionError, GenerationError, ProtectionError,
};
pub use wire::{CredentialDigest, EncryptedRecord};
