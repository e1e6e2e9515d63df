/// Authentication module
///
/// Token codec, token issuance and validation, and password hashing.

mod claims;
mod jwt;
mod password;
mod tokens;

pub use claims::current_timestamp;
pub use claims::is_valid;
pub use claims::TokenPayload;
pub use claims::ISSUER;
pub use jwt::decode_token;
pub use jwt::encode_token;
pub use password::hash_password;
pub use password::verify_password;
pub use tokens::TokenIssuer;
pub use tokens::TokenKind;
pub use tokens::TokenPair;
