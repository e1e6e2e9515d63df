/// Persistence interfaces
///
/// Services talk to these traits only. `postgres` backs them with sqlx,
/// `memory` with in-process maps for tests and local runs.

use async_trait::async_trait;

use crate::domain::{Credential, NewCredential, NewProduct, Product, ProductFilter, ProductPatch};
use crate::error::AppError;

mod memory;
mod postgres;

pub use memory::InMemoryProductRepository;
pub use memory::InMemoryUserRepository;
pub use postgres::PgProductRepository;
pub use postgres::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with a unique-constraint error if the username is taken
    async fn insert(&self, credential: NewCredential) -> Result<Credential, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, AppError>;
    async fn list(&self) -> Result<Vec<Credential>, AppError>;
    async fn update_password(&self, credential: &Credential) -> Result<(), AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError>;
    async fn get(&self, id: i64) -> Result<Option<Product>, AppError>;
    async fn insert(&self, product: NewProduct) -> Result<Product, AppError>;
    /// `None` if no product has `id`
    async fn update(&self, id: i64, patch: &ProductPatch) -> Result<Option<Product>, AppError>;
    /// `false` if no product has `id`
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
