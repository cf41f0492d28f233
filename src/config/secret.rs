//! Seed handling using the secrecy crate
//!
//! The seed is the only secret the sanitizer holds. It is kept in a
//! `Secret<SeedValue>` so that it is zeroed on drop, redacted from `Debug`
//! output, and only readable through an explicit `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use cvr_sanitizer::config::seed_secret;
//! use secrecy::ExposeSecret;
//!
//! let seed = seed_secret("0123456789abcdef0123".to_string());
//! assert_eq!(seed.expose_secret().len(), 20);
//! assert!(!format!("{seed:?}").contains("0123456789abcdef"));
//! ```

use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{CloneableSecret, DebugSecret, Secret};
use zeroize::Zeroize;

/// Placeholder seed shown in documentation, rejected when supplied
pub const PLACEHOLDER_SEED: &str = "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";

/// Seed text, zeroed when dropped
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SeedValue(String);

impl CloneableSecret for SeedValue {}
impl DebugSecret for SeedValue {}

impl From<String> for SeedValue {
    fn from(s: String) -> Self {
        SeedValue(s)
    }
}

impl SeedValue {
    /// Seed bytes as fed to key derivation
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the seed is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this is the documentation placeholder
    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER_SEED
    }
}

impl AsRef<str> for SeedValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Type alias for a protected seed
pub type SeedSecret = Secret<SeedValue>;

/// Wraps seed text in a [`SeedSecret`]
#[inline]
pub fn seed_secret(value: String) -> SeedSecret {
    Secret::new(SeedValue::from(value))
}

/// Generates a seed of `byte_len` random bytes from the OS RNG, hex encoded
pub fn generate_seed(byte_len: usize) -> SeedSecret {
    let mut bytes = vec![0u8; byte_len];
    OsRng.fill_bytes(&mut bytes);
    let encoded = hex::encode(&bytes);
    bytes.zeroize();
    seed_secret(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_seed_secret_creation() {
        let seed = seed_secret("a-sixteen-byte-seed".to_string());
        assert_eq!(seed.expose_secret().as_ref(), "a-sixteen-byte-seed");
        assert_eq!(seed.expose_secret().as_bytes(), b"a-sixteen-byte-seed");
    }

    #[test]
    fn test_seed_debug_redacted() {
        let seed = seed_secret("sensitive-seed-value".to_string());
        let debug_output = format!("{seed:?}");

        assert!(!debug_output.contains("sensitive-seed-value"));
        assert!(debug_output.contains("REDACTED") || debug_output.contains("Secret"));
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(seed_secret(PLACEHOLDER_SEED.to_string())
            .expose_secret()
            .is_placeholder());
        assert!(!seed_secret("X".repeat(31)).expose_secret().is_placeholder());
    }

    #[test]
    fn test_generate_seed() {
        let first = generate_seed(16);
        let second = generate_seed(16);

        assert_eq!(first.expose_secret().len(), 32);
        assert!(first
            .expose_secret()
            .as_ref()
            .bytes()
            .all(|b| b.is_ascii_hexdigit()));
        assert_ne!(first.expose_secret().as_ref(), second.expose_secret().as_ref());
    }
}
