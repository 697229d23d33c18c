//! Salted, iterated password hashing (PBKDF2-HMAC-SHA256).
//!
//! The iteration count, algorithm tag, and scheme version are stored with
//! each user so verification stays correct if the defaults change later.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Tunable cost factor against brute-force guessing.
pub const DEFAULT_ITERATIONS: u32 = 150_000;

/// Bumped when the derivation scheme changes.
pub const HASH_VERSION: i32 = 1;

/// Algorithm tag persisted alongside each digest.
pub const ALGORITHM: &str = "pbkdf2-sha256";

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Cryptographically random salt, base64-encoded for storage.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

/// Derive a 256-bit key from password and salt; hex-encoded for storage and
/// comparison. Deterministic in all inputs.
pub fn hash_password(password: &str, salt: &str, iterations: u32) -> String {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    hex::encode(key)
}

/// Recompute with the stored salt and iteration count, compare constant-time.
pub fn verify_password(password: &str, salt: &str, iterations: u32, expected_hex: &str) -> bool {
    let Ok(expected) = hex::decode(expected_hex) else {
        return false;
    };
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key.as_slice().ct_eq(expected.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keep test iteration counts small; correctness does not depend on cost.
    const N: u32 = 1_000;

    #[test]
    fn round_trip_verifies() {
        let salt = generate_salt();
        let digest = hash_password("correct horse", &salt, N);
        assert!(verify_password("correct horse", &salt, N, &digest));
    }

    #[test]
    fn single_character_mutation_fails() {
        let salt = generate_salt();
        let digest = hash_password("password1", &salt, N);
        assert!(!verify_password("password2", &salt, N, &digest));
        assert!(!verify_password("Password1", &salt, N, &digest));
        assert!(!verify_password("password", &salt, N, &digest));
    }

    #[test]
    fn digest_is_hex_of_256_bits() {
        let digest = hash_password("p", "s", N);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(hash_password("p", "s", N), hash_password("p", "s", N));
    }

    #[test]
    fn salt_and_iterations_change_the_digest() {
        let d = hash_password("p", "s1", N);
        assert_ne!(d, hash_password("p", "s2", N));
        assert_ne!(d, hash_password("p", "s1", N + 1));
    }

    #[test]
    fn salts_are_unique_and_base64() {
        let a = generate_salt();
        let b = generate_salt();
        assert_ne!(a, b);
        assert_eq!(BASE64.decode(&a).unwrap().len(), SALT_LEN);
    }

    #[test]
    fn malformed_stored_digest_never_verifies() {
        assert!(!verify_password("p", "s", N, "not-hex"));
        assert!(!verify_password("p", "s", N, ""));
    }
}
