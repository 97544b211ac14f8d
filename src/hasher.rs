//! Pluggable content hashing
//!
//! A [`Hasher`] turns a byte stream into a fixed-length token and
//! recognizes whether a filename segment is syntactically such a
//! token. [`Blake3Hasher`] is the default implementation: a BLAKE3
//! digest, hex encoded and truncated to the configured length.

use std::io::Read;

use crate::error::{Error, Result};

/// Hex length of a full BLAKE3 digest; the maximum token length.
pub const MAX_HASH_LENGTH: usize = 64;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Content-hashing strategy used by the hash filesystem.
pub trait Hasher: Send + Sync {
    /// Consume the stream and return a token of this hasher's fixed
    /// length. The caller owns closing the stream.
    fn hash(&self, reader: &mut dyn Read) -> Result<String>;

    /// Returns whether `token` is syntactically a valid token for this
    /// hasher: right length, right alphabet. Does not verify it
    /// matches any content.
    fn is_hash(&self, token: &str) -> bool;
}

/// [`Hasher`] producing truncated hex-encoded BLAKE3 digests.
pub struct Blake3Hasher {
    length: usize,
}

impl Blake3Hasher {
    /// Create a hasher producing tokens of `length` hex characters.
    ///
    /// Lengths outside `1..=`[`MAX_HASH_LENGTH`] are rejected here
    /// rather than silently producing empty or short tokens.
    pub fn new(length: usize) -> Result<Self> {
        if length == 0 || length > MAX_HASH_LENGTH {
            return Err(Error::HashLength {
                len: length,
                max: MAX_HASH_LENGTH,
            });
        }
        Ok(Blake3Hasher { length })
    }

    /// Configured token length in hex characters.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Hasher for Blake3Hasher {
    fn hash(&self, reader: &mut dyn Read) -> Result<String> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        let mut token = hex::encode(hasher.finalize().as_bytes());
        token.truncate(self.length);
        Ok(token)
    }

    fn is_hash(&self, token: &str) -> bool {
        token.len() == self.length
            && token
                .chars()
                .all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_and_valid() {
        let hasher = Blake3Hasher::new(8).unwrap();

        let a = hasher.hash(&mut "body { color: blue; }".as_bytes()).unwrap();
        let b = hasher.hash(&mut "body { color: blue; }".as_bytes()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert!(hasher.is_hash(&a));
    }

    #[test]
    fn test_different_content_different_token() {
        let hasher = Blake3Hasher::new(12).unwrap();
        let a = hasher.hash(&mut "one".as_bytes()).unwrap();
        let b = hasher.hash(&mut "two".as_bytes()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_hash_rejects_wrong_shape() {
        let hasher = Blake3Hasher::new(6).unwrap();
        assert!(hasher.is_hash("0a1b2c"));
        assert!(!hasher.is_hash("0a1b2"));
        assert!(!hasher.is_hash("0a1b2cd"));
        assert!(!hasher.is_hash("0A1B2C"));
        assert!(!hasher.is_hash("0a1b2g"));
        assert!(!hasher.is_hash(""));
    }

    #[test]
    fn test_length_validated_at_construction() {
        assert!(matches!(
            Blake3Hasher::new(0),
            Err(Error::HashLength { len: 0, .. })
        ));
        assert!(matches!(
            Blake3Hasher::new(MAX_HASH_LENGTH + 1),
            Err(Error::HashLength { .. })
        ));
        assert!(Blake3Hasher::new(MAX_HASH_LENGTH).is_ok());
    }

    #[test]
    fn test_full_length_token() {
        let hasher = Blake3Hasher::new(MAX_HASH_LENGTH).unwrap();
        let token = hasher.hash(&mut "content".as_bytes()).unwrap();
        assert_eq!(token.len(), MAX_HASH_LENGTH);
        assert!(hasher.is_hash(&token));
    }
}
