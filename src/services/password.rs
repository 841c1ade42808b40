//! Password hashing with argon2id.

use argon2::Argon2;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(PasswordHashError),
    #[error("stored password hash is invalid: {0}")]
    StoredHashInvalid(PasswordHashError),
    #[error("password verification failed: {0}")]
    Verify(PasswordHashError),
}

/// Well-formed hash with the default argon2 parameters that matches no password.
/// Verified against when there is no real account so rejections cost the same.
pub const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$28RK4keyIeU6ryFfMmGrKA$qhlJ0gSpE1WLN6VQp3c2E0JDuJQkYmhZAfaF3Jhk4S0";

/// Hash a plaintext password into a PHC string with a random salt.
///
/// # Errors
///
/// Returns an error if argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;
    Ok(hash.to_string())
}

/// Check `candidate` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; errors are reserved for malformed hashes.
///
/// # Errors
///
/// Returns an error if the stored hash cannot be parsed or verification fails
/// for a reason other than a wrong password.
pub fn verify_password(stored_hash: &str, candidate: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(PasswordError::StoredHashInvalid)?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(detail) => Err(PasswordError::Verify(detail)),
    }
}

/// Run a full verification against [`DUMMY_HASH`] and discard the result.
pub fn verify_dummy(candidate: &str) {
    let _ = verify_password(DUMMY_HASH, candidate);
}

#[cfg(test)]
#[path = "password_test.rs"]
mod tests;
