//! Password hashing
//!
//! Argon2id with a per-hash random salt. Cost parameters come from
//! configuration. Hashing is CPU-expensive on purpose; callers run it in
//! `tokio::task::spawn_blocking` and never under a store or registry lock.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::AppError;

fn hasher(memory_kib: u32, iterations: u32) -> Result<Argon2<'static>, AppError> {
    let params = Params::new(memory_kib, iterations, 1, None)
        .map_err(|e| AppError::Config(format!("invalid argon2 parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext password into a PHC-format credential hash.
pub fn hash_password(
    password: &str,
    memory_kib: u32,
    iterations: u32,
) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(memory_kib, iterations)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored credential hash.
///
/// An unparseable stored hash verifies as false rather than erroring;
/// the caller sees the same rejection as a wrong password.
pub fn verify_password(password: &str, credential_hash: &str) -> bool {
    let parsed = match PasswordHash::new(credential_hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal cost so tests stay fast
    const TEST_MEMORY_KIB: u32 = 1024;
    const TEST_ITERATIONS: u32 = 1;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("secret1", TEST_MEMORY_KIB, TEST_ITERATIONS).unwrap();
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("secret1", TEST_MEMORY_KIB, TEST_ITERATIONS).unwrap();
        let b = hash_password("secret1", TEST_MEMORY_KIB, TEST_ITERATIONS).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_stored_hash_verifies_false() {
        assert!(!verify_password("secret1", "not-a-phc-hash"));
    }
}
