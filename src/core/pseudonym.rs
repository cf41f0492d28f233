//! Keyed deterministic pseudonym generation
//!
//! The seed is hashed with SHA-256 into an AES-256 key. Each identifier triple is
//! laid out as a single 16-byte block and encrypted on its own with no IV and no
//! chaining, so one triple always yields one pseudonym for a given seed. The first
//! 8 ciphertext bytes, hex encoded, form the pseudonym.

use crate::domain::{IdentifierTriple, Pseudonym, Result, SanitizerError};
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes256;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroize;

/// Minimum number of seed bytes accepted
pub const MIN_SEED_LEN: usize = 16;

/// Pseudonym generator holding the derived cipher state
///
/// Built once per run and shared by reference with every orchestrator stage.
///
/// # Examples
///
/// ```
/// use cvr_sanitizer::core::pseudonym::PseudonymGenerator;
/// use cvr_sanitizer::domain::IdentifierTriple;
///
/// let generator = PseudonymGenerator::new(&[0x11; 32]).unwrap();
/// let pseudonym = generator.generate(IdentifierTriple::new(0, 0, 0));
/// assert_eq!(pseudonym.as_str(), "0x4eba0cf44ba2422d");
/// ```
pub struct PseudonymGenerator {
    cipher: Aes256,
}

impl PseudonymGenerator {
    /// Derives the cipher key from `seed`
    ///
    /// # Errors
    ///
    /// Returns [`SanitizerError::InsecureSeed`] when the seed is shorter than
    /// [`MIN_SEED_LEN`] bytes.
    pub fn new(seed: &[u8]) -> Result<Self> {
        if seed.len() < MIN_SEED_LEN {
            return Err(SanitizerError::InsecureSeed(format!(
                "seed must be at least {MIN_SEED_LEN} bytes, got {}",
                seed.len()
            )));
        }

        let mut key = Sha256::digest(seed);
        let cipher = Aes256::new(&key);
        key.as_mut_slice().zeroize();

        Ok(Self { cipher })
    }

    /// Maps an identifier triple to its pseudonym
    pub fn generate(&self, ids: IdentifierTriple) -> Pseudonym {
        let mut block = GenericArray::from(ids.to_block());
        self.cipher.encrypt_block(&mut block);

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&block[..8]);
        Pseudonym::from_ciphertext(&prefix)
    }
}

// Key material stays out of Debug output
impl fmt::Debug for PseudonymGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PseudonymGenerator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const TEST_SEED: [u8; 32] = [0x11; 32];

    #[test_case(0, 0, 0, "0x4eba0cf44ba2422d" ; "all zero")]
    #[test_case(1, 1, 1, "0x058bae87a6233f8f" ; "all one")]
    #[test_case(18, 18, 18, "0xd7c685a77d4ec7e6" ; "eighteen")]
    #[test_case(31337, 31337, 31337, "0x2d5850707ece145b" ; "five digits")]
    #[test_case(999_999, 999_999, 999_999, "0xd9b4d8ae29223ad8" ; "largest six digits")]
    #[test_case(1_000_000, 1_000_000, 1_000_000, "0xe4256bdd44e207f7" ; "seven digits")]
    #[test_case(1_000_001, 1_000_001, 1_000_001, "0x5df6f7ca97b6b049" ; "seven digits plus one")]
    #[test_case(10_000_001, 10_000_001, 10_000_001, "0xabe42695781bb159" ; "eight digits")]
    #[test_case(1111, 2222, 33333, "0xe9a341ef3f306166" ; "distinct components")]
    fn test_known_vectors(tabulator: u32, batch: u32, record: u32, expected: &str) {
        let generator = PseudonymGenerator::new(&TEST_SEED).unwrap();
        let pseudonym = generator.generate(IdentifierTriple::new(tabulator, batch, record));
        assert_eq!(pseudonym.as_str(), expected);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let generator = PseudonymGenerator::new(b"0123456789abcdef0123456789abcdef").unwrap();
        let ids = IdentifierTriple::new(7, 8, 9);
        assert_eq!(generator.generate(ids), generator.generate(ids));

        let again = PseudonymGenerator::new(b"0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(generator.generate(ids), again.generate(ids));
    }

    #[test]
    fn test_different_seeds_differ() {
        let first = PseudonymGenerator::new(&[0x11; 32]).unwrap();
        let second = PseudonymGenerator::new(&[0x12; 32]).unwrap();
        let ids = IdentifierTriple::new(1, 1, 1);
        assert_ne!(first.generate(ids), second.generate(ids));
    }

    #[test]
    fn test_short_seed_rejected() {
        let err = PseudonymGenerator::new(&[0x11; 15]).unwrap_err();
        assert!(matches!(err, SanitizerError::InsecureSeed(_)));
        assert!(PseudonymGenerator::new(&[0x11; 16]).is_ok());
    }

    #[test]
    fn test_pseudonym_format() {
        let generator = PseudonymGenerator::new(&TEST_SEED).unwrap();
        let pseudonym = generator.generate(IdentifierTriple::new(u32::MAX, u32::MAX, u32::MAX));
        assert!(Pseudonym::new(pseudonym.as_str()).is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        let generator = PseudonymGenerator::new(&TEST_SEED).unwrap();
        assert_eq!(format!("{generator:?}"), "PseudonymGenerator { .. }");
    }
}
