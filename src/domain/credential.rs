use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::ValidationError;
use crate::validators::{is_bcrypt_hash, is_valid_username};

/// A bcrypt hash string that passed the format check
///
/// The only way to obtain one is `parse`, so a credential can never hold
/// anything but a well-formed hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn parse(hash: impl Into<String>) -> Result<Self, ValidationError> {
        let hash = hash.into();
        if !is_bcrypt_hash(&hash) {
            return Err(ValidationError::InvalidFormat("password hash".to_string()));
        }
        Ok(Self(hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Sign-up input, checked before it reaches a repository
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: String,
    pub password_hash: PasswordHash,
}

impl NewCredential {
    pub fn new(username: &str, password_hash: PasswordHash) -> Result<Self, ValidationError> {
        Ok(Self {
            username: is_valid_username(username)?,
            password_hash,
        })
    }
}

/// Stored user account
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: i64,
    pub username: String,
    password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(
        id: i64,
        username: String,
        password_hash: PasswordHash,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            created_at,
        }
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn update_password(&mut self, password_hash: PasswordHash) {
        self.password_hash = password_hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hash() -> String {
        format!("$2b$10${}", "N9qo8uLOickgx2ZMRZoMye".to_string() + &"a".repeat(31))
    }

    #[test]
    fn test_parse_accepts_bcrypt_hash() {
        let hash = PasswordHash::parse(sample_hash()).unwrap();
        assert_eq!(hash.as_str(), sample_hash());
    }

    #[test]
    fn test_parse_rejects_plaintext() {
        assert_eq!(
            PasswordHash::parse("test_password"),
            Err(ValidationError::InvalidFormat("password hash".to_string()))
        );
    }

    #[test]
    fn test_debug_hides_hash() {
        let hash = PasswordHash::parse(sample_hash()).unwrap();
        assert_eq!(format!("{:?}", hash), "PasswordHash(..)");
    }

    #[test]
    fn test_new_credential_validates_username() {
        let hash = PasswordHash::parse(sample_hash()).unwrap();

        assert!(NewCredential::new("alice", hash.clone()).is_ok());
        assert!(NewCredential::new("", hash.clone()).is_err());
        assert!(NewCredential::new("a_very_long_username", hash).is_err());
    }

    #[test]
    fn test_update_password() {
        let hash = PasswordHash::parse(sample_hash()).unwrap();
        let mut credential = Credential::new(1, "alice".to_string(), hash, Utc::now());

        let replacement = PasswordHash::parse(format!("$2b$12${}", "b".repeat(53))).unwrap();
        credential.update_password(replacement.clone());

        assert_eq!(credential.password_hash(), &replacement);
    }
}
