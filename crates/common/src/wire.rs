//! Storage formats handed to persistence collaborators.
//!
//! Both types here are what ends up in a database column, so their text
//! encodings must stay stable across releases.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EncryptionError;

// ---------------------------------------------------------------------------
// Encrypted record
// ---------------------------------------------------------------------------

/// Byte length of the GCM nonce stored with every record.
pub const NONCE_LEN: usize = 16;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Separator between the three hex segments. Not a hex digit.
pub const SEGMENT_SEPARATOR: char = ':';

/// An encrypted field value.
///
/// The string representation is `<hex(nonce)>:<hex(tag)>:<hex(ciphertext)>`,
/// lowercase, with nonce and tag always 32 characters each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRecord {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw authentication tag bytes.
    pub tag: [u8; TAG_LEN],
    /// Raw ciphertext bytes, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

impl fmt::Display for EncryptedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            hex::encode(self.nonce),
            hex::encode(self.tag),
            hex::encode(&self.ciphertext),
            sep = SEGMENT_SEPARATOR,
        )
    }
}

impl FromStr for EncryptedRecord {
    type Err = EncryptionError;

    /// Parse a stored value with strict fixed-width validation.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::MalformedRecord`] if the value does not have
    /// exactly three segments, if nonce or tag are not exactly 32 characters,
    /// or if any segment contains anything but lowercase hex digit pairs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(SEGMENT_SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(EncryptionError::MalformedRecord(format!(
                "expected 3 segments, got {}",
                parts.len()
            )));
        }

        let mut nonce = [0u8; NONCE_LEN];
        decode_fixed(parts[0], "nonce", &mut nonce)?;
        let mut tag = [0u8; TAG_LEN];
        decode_fixed(parts[1], "tag", &mut tag)?;
        let ciphertext = decode_lower_hex(parts[2], "ciphertext")?;

        Ok(Self {
            nonce,
            tag,
            ciphertext,
        })
    }
}

fn decode_fixed(segment: &str, name: &str, out: &mut [u8]) -> Result<(), EncryptionError> {
    if segment.len() != out.len() * 2 {
        return Err(EncryptionError::MalformedRecord(format!(
            "{name} must be {} hex characters, got {}",
            out.len() * 2,
            segment.len()
        )));
    }
    let bytes = decode_lower_hex(segment, name)?;
    out.copy_from_slice(&bytes);
    Ok(())
}

fn decode_lower_hex(segment: &str, name: &str) -> Result<Vec<u8>, EncryptionError> {
    // hex::decode accepts uppercase too; the stored format never contains it.
    if !segment
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return Err(EncryptionError::MalformedRecord(format!(
            "{name} contains non-hex characters"
        )));
    }
    hex::decode(segment)
        .map_err(|e| EncryptionError::MalformedRecord(format!("{name}: {e}")))
}

impl Serialize for EncryptedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EncryptedRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Credential digest
// ---------------------------------------------------------------------------

/// Byte length of a credential hash (PBKDF2-HMAC-SHA512 output).
pub const DIGEST_LEN: usize = 64;

/// A salted credential hash. Both halves are needed to verify a candidate.
///
/// Storage keeps `hash` and `salt` as two independent hex values; see
/// [`CredentialDigest::hash_hex`] and [`CredentialDigest::salt_hex`].
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialDigest {
    #[serde(with = "hex_bytes")]
    pub hash: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub salt: Vec<u8>,
}

impl CredentialDigest {
    /// Rebuild a digest from its two stored hex columns.
    pub fn from_hex(hash: &str, salt: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self {
            hash: hex::decode(hash)?,
            salt: hex::decode(salt)?,
        })
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(&self.hash)
    }

    pub fn salt_hex(&self) -> String {
        hex::encode(&self.salt)
    }
}

impl fmt::Debug for CredentialDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Lengths only; digests are offline-crackable if leaked.
        f.debug_struct("CredentialDigest")
            .field("hash_len", &self.hash.len())
            .field("salt_len", &self.salt.len())
            .finish()
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptedRecord {
        EncryptedRecord {
            nonce: [0x01; NONCE_LEN],
            tag: [0xab; TAG_LEN],
            ciphertext: vec![0xde, 0xad, 0xbe, 0xef],
        }
    }

    #[test]
    fn display_layout() {
        let s = sample().to_string();
        assert_eq!(
            s,
            "01010101010101010101010101010101:abababababababababababababababab:deadbeef"
        );
    }

    #[test]
    fn parse_round_trip() {
        let rec = sample();
        let parsed: EncryptedRecord = rec.to_string().parse().unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn parse_accepts_empty_ciphertext() {
        let s = format!("{}:{}:", "00".repeat(NONCE_LEN), "11".repeat(TAG_LEN));
        let parsed: EncryptedRecord = s.parse().unwrap();
        assert!(parsed.ciphertext.is_empty());
    }

    #[test]
    fn parse_rejects_wrong_segment_count() {
        let s = sample().to_string();
        assert!(matches!(
            "abc".parse::<EncryptedRecord>(),
            Err(EncryptionError::MalformedRecord(_))
        ));
        assert!(format!("{s}:00").parse::<EncryptedRecord>().is_err());
        let two = s.rsplit_once(':').unwrap().0;
        assert!(two.parse::<EncryptedRecord>().is_err());
    }

    #[test]
    fn parse_rejects_short_nonce() {
        let s = format!("{}:{}:00", "00".repeat(12), "11".repeat(TAG_LEN));
        assert!(s.parse::<EncryptedRecord>().is_err());
    }

    #[test]
    fn parse_rejects_long_tag() {
        let s = format!("{}:{}:00", "00".repeat(NONCE_LEN), "11".repeat(TAG_LEN + 1));
        assert!(s.parse::<EncryptedRecord>().is_err());
    }

    #[test]
    fn parse_rejects_uppercase_and_non_hex() {
        let upper = sample().to_string().to_uppercase();
        assert!(upper.parse::<EncryptedRecord>().is_err());
        let s = format!("{}:{}:zz", "00".repeat(NONCE_LEN), "11".repeat(TAG_LEN));
        assert!(s.parse::<EncryptedRecord>().is_err());
        let s = format!("{}:{}:+0", "00".repeat(NONCE_LEN), "11".repeat(TAG_LEN));
        assert!(s.parse::<EncryptedRecord>().is_err());
    }

    #[test]
    fn parse_rejects_odd_ciphertext() {
        let s = format!("{}:{}:abc", "00".repeat(NONCE_LEN), "11".repeat(TAG_LEN));
        assert!(s.parse::<EncryptedRecord>().is_err());
    }

    #[test]
    fn record_serde_is_wire_string() {
        let rec = sample();
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, format!("\"{rec}\""));
        let decoded: EncryptedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, rec);
        assert!(serde_json::from_str::<EncryptedRecord>("\"nope\"").is_err());
    }

    #[test]
    fn digest_hex_columns() {
        let digest = CredentialDigest {
            hash: vec![0x0f; DIGEST_LEN],
            salt: vec![0xa0, 0x01],
        };
        assert_eq!(digest.hash_hex().len(), DIGEST_LEN * 2);
        assert_eq!(digest.salt_hex(), "a001");
        let back = CredentialDigest::from_hex(&digest.hash_hex(), &digest.salt_hex()).unwrap();
        assert_eq!(back.hash, digest.hash);
        assert_eq!(back.salt, digest.salt);
        assert!(CredentialDigest::from_hex("xyz", "00").is_err());
    }

    #[test]
    fn digest_serde_and_debug() {
        let digest = CredentialDigest {
            hash: vec![0x01, 0x02],
            salt: vec![0x03],
        };
        let json = serde_json::to_value(&digest).unwrap();
        assert_eq!(json["hash"], "0102");
        assert_eq!(json["salt"], "03");
        let dbg = format!("{digest:?}");
        assert!(dbg.contains("hash_len: 2"));
        assert!(!dbg.contains("0102"));
    }
}
