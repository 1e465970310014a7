//! AES-256-GCM encryption and decryption of individual field values.
//!
//! **Nonce handling:** every call to [`FieldCipher::encrypt`] draws a fresh
//! 16-byte nonce from the [`RandomGenerator`]. GCM nonce reuse under one key
//! breaks both confidentiality and authentication; nonces are never derived
//! from the plaintext or a counter.

use std::sync::Arc;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use common::wire::{NONCE_LEN, TAG_LEN};
use common::{EncryptedRecord, EncryptionError};
use tracing::{debug, trace};

use super::random::RandomGenerator;
use crate::key::{KeyProvider, SymmetricKey};

/// AES-256-GCM with a 128-bit nonce and the standard 128-bit tag.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// No associated data is bound into the tag.
const ASSOCIATED_DATA: &[u8] = b"";

/// Authenticated field cipher bound to one key provider.
#[derive(Clone)]
pub struct FieldCipher {
    keys: Arc<dyn KeyProvider>,
    rng: RandomGenerator,
}

impl FieldCipher {
    pub fn new(keys: Arc<dyn KeyProvider>, rng: RandomGenerator) -> Self {
        Self { keys, rng }
    }

    /// Encrypt raw bytes into an [`EncryptedRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::Entropy`] if no nonce could be generated and
    /// [`EncryptionError::Primitive`] on an internal AEAD error.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedRecord, EncryptionError> {
        let cipher = build_cipher(&self.keys.symmetric_key())?;
        let nonce: [u8; NONCE_LEN] = self.rng.random_array()?;

        let mut ciphertext = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(
                GenericArray::from_slice(&nonce),
                ASSOCIATED_DATA,
                &mut ciphertext,
            )
            .map_err(|_| EncryptionError::Primitive)?;

        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(&tag);

        trace!(len = plaintext.len(), "field encrypted");
        Ok(EncryptedRecord {
            nonce,
            tag: tag_bytes,
            ciphertext,
        })
    }

    /// Decrypt an [`EncryptedRecord`] back to plaintext bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::AuthenticationFailed`] if the tag does not
    /// verify (wrong key or tampered data). No plaintext is returned in that case.
    pub fn decrypt(&self, record: &EncryptedRecord) -> Result<Vec<u8>, EncryptionError> {
        let cipher = build_cipher(&self.keys.symmetric_key())?;

        let mut buffer = record.ciphertext.clone();
        cipher
            .decrypt_in_place_detached(
                GenericArray::from_slice(&record.nonce),
                ASSOCIATED_DATA,
                &mut buffer,
                GenericArray::from_slice(&record.tag),
            )
            .map_err(|_| {
                debug!("field authentication failed");
                EncryptionError::AuthenticationFailed
            })?;

        Ok(buffer)
    }

    /// Encrypt a field value before persistence.
    ///
    /// `None` passes through as `None`. `Some("")` is a value and is encrypted.
    pub fn encrypt_field(&self, value: Option<&str>) -> Result<Option<String>, EncryptionError> {
        value
            .map(|v| self.encrypt(v.as_bytes()).map(|rec| rec.to_string()))
            .transpose()
    }

    /// Decrypt a stored field value.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::MalformedRecord`] if `stored` is not in the
    /// `nonce:tag:ciphertext` format, [`EncryptionError::AuthenticationFailed`] if
    /// it does not authenticate, and [`EncryptionError::InvalidPlaintext`] if the
    /// authenticated bytes are not UTF-8.
    pub fn decrypt_field(&self, stored: Option<&str>) -> Result<Option<String>, EncryptionError> {
        let Some(stored) = stored else {
            return Ok(None);
        };
        let record: EncryptedRecord = stored.parse()?;
        let plaintext = self.decrypt(&record)?;
        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|_| EncryptionError::InvalidPlaintext)
    }

    /// Returns `true` if `value` is shaped like a stored record.
    ///
    /// Only checks the format; the tag is not verified.
    pub fn is_encrypted(value: &str) -> bool {
        value.parse::<EncryptedRecord>().is_ok()
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher")
            .field("insecure_key", &self.keys.is_insecure())
            .finish_non_exhaustive()
    }
}

fn build_cipher(key: &SymmetricKey) -> Result<Aes256Gcm16, EncryptionError> {
    Aes256Gcm16::new_from_slice(key.as_bytes()).map_err(|_| EncryptionError::Primitive)
}
