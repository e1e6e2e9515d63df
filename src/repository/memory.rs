use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::{Credential, NewCredential, NewProduct, Product, ProductFilter, ProductPatch};
use crate::error::{AppError, DatabaseError};
use crate::repository::{ProductRepository, UserRepository};

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Table<Credential>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, credential: NewCredential) -> Result<Credential, AppError> {
        let mut users = self.users.write().await;

        if users.rows.values().any(|u| u.username == credential.username) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Username already registered".to_string(),
            )));
        }

        let id = users.allocate_id();
        let stored = Credential::new(id, credential.username, credential.password_hash, Utc::now());
        users.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AppError> {
        let users = self.users.read().await;
        Ok(users.rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, AppError> {
        Ok(self.users.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Credential>, AppError> {
        Ok(self.users.read().await.rows.values().cloned().collect())
    }

    async fn update_password(&self, credential: &Credential) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        match users.rows.get_mut(&credential.id) {
            Some(stored) => {
                stored.update_password(credential.password_hash().clone());
                Ok(())
            }
            None => Err(AppError::Database(DatabaseError::NotFound(
                "User not found".to_string(),
            ))),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.users.write().await.rows.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Table<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let products = self.products.read().await;
        Ok(products
            .rows
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, AppError> {
        Ok(self.products.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, AppError> {
        let mut products = self.products.write().await;
        let id = products.allocate_id();
        let stored = Product {
            id,
            name: product.name,
            price: product.price,
            image_name: None,
            created_at: Utc::now(),
        };
        products.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, patch: &ProductPatch) -> Result<Option<Product>, AppError> {
        let mut products = self.products.write().await;
        Ok(products.rows.get_mut(&id).map(|product| {
            patch.apply(product);
            product.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.products.write().await.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PasswordHash;

    fn new_credential(username: &str) -> NewCredential {
        let hash = PasswordHash::parse(format!("$2b$10${}", "x".repeat(53))).unwrap();
        NewCredential::new(username, hash).unwrap()
    }

    #[tokio::test]
    async fn test_user_insert_and_lookup() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.insert(new_credential("alice")).await.unwrap();
        let bob = repo.insert(new_credential("bob")).await.unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(repo.find_by_username("bob").await.unwrap().unwrap().id, 2);
        assert_eq!(repo.find_by_id(1).await.unwrap().unwrap().username, "alice");
        assert!(repo.find_by_username("carol").await.unwrap().is_none());
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.insert(new_credential("alice")).await.unwrap();

        let result = repo.insert(new_credential("alice")).await;
        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_)))
        ));
    }

    #[tokio::test]
    async fn test_user_delete() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.insert(new_credential("alice")).await.unwrap();

        repo.delete(alice.id).await.unwrap();
        assert!(repo.find_by_id(alice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_password_update_after_delete_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.insert(new_credential("alice")).await.unwrap();
        repo.delete(alice.id).await.unwrap();

        assert!(matches!(
            repo.update_password(&alice).await,
            Err(AppError::Database(DatabaseError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_product_crud() {
        let repo = InMemoryProductRepository::new();
        let phone = repo.insert(NewProduct::new("i-Phone", 1000).unwrap()).await.unwrap();
        repo.insert(NewProduct::new("i-Mac", 2000).unwrap()).await.unwrap();

        let cheap = ProductFilter::new(Some(1500), None).unwrap();
        assert_eq!(repo.list(&cheap).await.unwrap().len(), 1);

        let patch = ProductPatch::new(None, Some(900)).unwrap();
        let updated = repo.update(phone.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.price, 900);
        assert!(repo.update(99, &patch).await.unwrap().is_none());

        assert!(repo.delete(phone.id).await.unwrap());
        assert!(!repo.delete(phone.id).await.unwrap());
        assert!(repo.get(phone.id).await.unwrap().is_none());
    }
}
