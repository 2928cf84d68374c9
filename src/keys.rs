//! WireGuard key encoding and offline key derivation.

use base64::prelude::*;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::ConfigError;

/// Length in bytes of every WireGuard key
pub const KEY_LEN: usize = 32;

/// Decode a base64 key, naming `what` in the error (e.g. "Private key")
pub fn decode_key(what: &str, s: &str) -> Result<[u8; KEY_LEN], ConfigError> {
    let bytes = BASE64_STANDARD
        .decode(s.trim())
        .map_err(|e| ConfigError::InvalidKey(format!("{}: invalid base64: {}", what, e)))?;

    <[u8; KEY_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
        ConfigError::InvalidKey(format!(
            "{} must be {} bytes, got {}",
            what,
            KEY_LEN,
            bytes.len()
        ))
    })
}

/// Encode a key to base64
pub fn encode_key(key: &[u8; KEY_LEN]) -> String {
    BASE64_STANDARD.encode(key)
}

/// Check that tool output is a well-formed key and return it trimmed
pub fn validate_key<'a>(what: &str, s: &'a str) -> Result<&'a str, ConfigError> {
    let trimmed = s.trim();
    decode_key(what, trimmed)?;
    Ok(trimmed)
}

/// Generate a new private key without the external tool
pub fn generate_private_key() -> StaticSecret {
    StaticSecret::random_from_rng(rand::rngs::OsRng)
}

/// Derive public key from private key
pub fn derive_public_key(private_key: &StaticSecret) -> PublicKey {
    PublicKey::from(private_key)
}

/// Base64 public key for a base64 private key
pub fn public_key_for(private_key: &str) -> Result<String, ConfigError> {
    let secret = StaticSecret::from(decode_key("Private key", private_key)?);
    Ok(encode_key(derive_public_key(&secret).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_KEY: &str = "yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=";

    #[test]
    fn test_decode_key() {
        let key = decode_key("Private key", SAMPLE_KEY).unwrap();
        assert_eq!(encode_key(&key), SAMPLE_KEY);
    }

    #[test]
    fn test_decode_key_wrong_length() {
        let err = decode_key("Public key", "AAAA").unwrap_err();
        assert!(err.to_string().contains("must be 32 bytes, got 3"));
    }

    #[test]
    fn test_decode_key_bad_base64() {
        assert!(decode_key("Public key", "not base64!").is_err());
    }

    #[test]
    fn test_validate_key_trims() {
        let line = format!("{}\r\n", SAMPLE_KEY);
        assert_eq!(validate_key("Private key", &line).unwrap(), SAMPLE_KEY);
    }

    #[test]
    fn test_offline_keypair() {
        let secret = generate_private_key();
        let encoded = encode_key(&secret.to_bytes());
        let public = public_key_for(&encoded).unwrap();
        assert_eq!(public, encode_key(derive_public_key(&secret).as_bytes()));
        assert_ne!(public, encoded);
    }
}
