use crate::error::AppError;
use bcrypt::{hash, verify};

/// bcrypt cost factor. Every hash gets a fresh random salt; bcrypt embeds it
/// in the output string.
const HASH_COST: u32 = 10;

/// Hashes a plaintext password. Called at every write site that sets a
/// password (signup, sub-user creation); updates that carry no new password
/// never re-hash.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(hash(password, HASH_COST)?)
}

/// Verifies a plaintext password against a stored bcrypt hash.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    Ok(verify(password, hashed_password)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password).unwrap();

        assert_ne!(hashed, password);
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let password = "repeatable_password";
        let first = hash_password(password).unwrap();
        let second = hash_password(password).unwrap();
        // A fresh salt per call means the hashes never collide.
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match verify_password("test_password123", "invalidhashformat") {
            Err(AppError::InternalServerError(msg)) => {
                assert!(msg.contains("password hashing failed"));
            }
            Ok(false) => {
                // bcrypt may also report a malformed hash as a plain mismatch.
            }
            Ok(true) => panic!("verification must not succeed for a malformed hash"),
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }
}
