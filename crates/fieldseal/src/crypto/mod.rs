//! Field encryption, credential hashing, and secure randomness.
//!
//! This module is free of configuration and I/O. Key material arrives through
//! [`crate::key::KeyProvider`]; randomness through [`random::EntropySource`].
//!
//! # Ciphertext format
//!
//! ```text
//! <hex(nonce, 16 bytes)>:<hex(tag, 16 bytes)>:<hex(ciphertext)>
//! ```
//!
//! See [`common::wire::EncryptedRecord`] for the parsing rules.

pub mod cipher;
pub mod hasher;
pub mod random;

pub use cipher::FieldCipher;
pub use hasher::CredentialHasher;
pub use random::{EntropySource, OsEntropy, RandomGenerator};
