/// Input validators for account and catalog fields
///
/// Length limits follow the storage columns (`VARCHAR(16)`).

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

pub const MAX_USERNAME_LENGTH: usize = 16;
pub const MAX_PRODUCT_NAME_LENGTH: usize = 16;
pub const MIN_PRICE_FILTER: i64 = 100;

lazy_static! {
    // $<algorithm>$<cost>$<22-char salt + 31-char digest>
    static ref BCRYPT_HASH_REGEX: Regex =
        Regex::new(r"^\$2[aby]\$[0-9]{2}\$[./A-Za-z0-9]{53}$").unwrap();
}

/// Validates a username
/// - trims surrounding whitespace
/// - at most 16 characters
/// - no control characters
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    is_valid_short_text("username", username, MAX_USERNAME_LENGTH)
}

/// Validates a product name with the same rules as usernames
pub fn is_valid_product_name(name: &str) -> Result<String, ValidationError> {
    is_valid_short_text("name", name, MAX_PRODUCT_NAME_LENGTH)
}

pub fn is_valid_price(price: i32) -> Result<i32, ValidationError> {
    if price < 0 {
        return Err(ValidationError::OutOfRange("price".to_string(), 0));
    }
    Ok(price)
}

/// `max_price` in catalog searches must be at least 100
pub fn is_valid_price_filter(max_price: i32) -> Result<i32, ValidationError> {
    if i64::from(max_price) < MIN_PRICE_FILTER {
        return Err(ValidationError::OutOfRange(
            "max_price".to_string(),
            MIN_PRICE_FILTER,
        ));
    }
    Ok(max_price)
}

/// True if `hash` has the `$2x$NN$<53 chars>` bcrypt shape
pub fn is_bcrypt_hash(hash: &str) -> bool {
    BCRYPT_HASH_REGEX.is_match(hash)
}

fn is_valid_short_text(field: &str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }

    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong(field.to_string(), max));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidFormat(field.to_string()));
    }

    Ok(trimmed.to_string())
}
