/// Domain entities
///
/// Plain data types with their invariants checked at construction.

mod credential;
mod product;

pub use credential::Credential;
pub use credential::NewCredential;
pub use credential::PasswordHash;
pub use product::NewProduct;
pub use product::Product;
pub use product::ProductFilter;
pub use product::ProductPatch;
