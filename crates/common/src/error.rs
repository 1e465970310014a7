//! Error taxonomy shared by every fieldseal component.

use thiserror::Error;

/// Key material is missing or unusable.
///
/// Always fatal: a process that cannot resolve its symmetric key must not
/// start serving encrypt or decrypt calls.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No key was configured and the environment forbids the insecure default.
    #[error("ENCRYPTION_KEY is required in production")]
    MissingKey,

    /// A key was configured but is not 64 hex characters.
    #[error("invalid ENCRYPTION_KEY: {0}")]
    InvalidKey(String),

    /// The configuration source itself could not be read.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// The secure random source is exhausted or unavailable.
#[derive(Debug, Error)]
#[error("secure random source unavailable: {0}")]
pub struct GenerationError(pub String);

/// Failures while hashing a credential.
///
/// Verification never fails this way; it only returns `false`.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// An empty secret would produce a digest that never verifies.
    #[error("credential must not be empty")]
    EmptySecret,

    /// A salt could not be generated.
    #[error(transparent)]
    Entropy(#[from] GenerationError),
}

/// Failures of the authenticated cipher.
///
/// Callers should treat every variant as "this data cannot be used"; none of
/// them succeed on a blind retry.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// The stored value does not match the `nonce:tag:ciphertext` format.
    #[error("malformed encrypted record: {0}")]
    MalformedRecord(String),

    /// Tag verification failed: wrong key or tampered record.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The record authenticated but its plaintext is not valid UTF-8.
    #[error("decrypted value is not valid UTF-8")]
    InvalidPlaintext,

    /// The AEAD primitive rejected the operation.
    #[error("aead operation failed")]
    Primitive,

    /// A nonce could not be generated.
    #[error(transparent)]
    Entropy(#[from] GenerationError),
}

/// Umbrella error for hosts that handle every component through one type.
#[derive(Debug, Error)]
pub enum ProtectionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl ProtectionError {
    /// Returns `true` if the process should stop rather than report the
    /// failure to the caller.
    pub fn is_fatal(&self) -> bool {
        match self {
            ProtectionError::Configuration(_) => true,
            ProtectionError::Generation(_) => true,
            ProtectionError::Encryption(EncryptionError::Entropy(_)) => true,
            ProtectionError::Encryption(_) => false,
            ProtectionError::Credential(CredentialError::Entropy(_)) => true,
            ProtectionError::Credential(CredentialError::EmptySecret) => false,
        }
    }
}
