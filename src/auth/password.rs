/// Password Hashing and Verification
///
/// bcrypt at a fixed cost. The resulting string is wrapped in
/// `PasswordHash`, which is the only form a credential accepts.

use bcrypt::{hash, verify};

use crate::domain::PasswordHash;
use crate::error::{AppError, ValidationError};

const PASSWORD_HASH_COST: u32 = 10;
// bcrypt only looks at the first 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a plaintext password
///
/// # Errors
/// Returns error if:
/// - Password is empty or longer than bcrypt can use
/// - bcrypt hashing fails
pub fn hash_password(password: &str) -> Result<PasswordHash, AppError> {
    validate_password(password)?;

    let hashed = hash(password, PASSWORD_HASH_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    PasswordHash::parse(hashed).map_err(AppError::from)
}

/// Check a plaintext password against a stored hash
///
/// # Errors
/// Returns error if the stored hash cannot be read by bcrypt
pub fn verify_password(password: &str, hash: &PasswordHash) -> Result<bool, AppError> {
    verify(password, hash.as_str())
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_BYTES,
        ));
    }

    Ok(())
}
