use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    Credential, NewCredential, NewProduct, PasswordHash, Product, ProductFilter, ProductPatch,
};
use crate::error::{AppError, DatabaseError};
use crate::repository::{ProductRepository, UserRepository};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for Credential {
    type Error = AppError;

    // Stored hashes go through the same format check as new ones
    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let hash = PasswordHash::parse(row.password).map_err(|_| {
            tracing::error!(user_id = row.id, "Stored password hash has invalid format");
            AppError::Internal("Corrupt credential".to_string())
        })?;
        Ok(Credential::new(row.id, row.username, hash, row.created_at))
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: i32,
    image_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price,
            image_name: row.image_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, credential: NewCredential) -> Result<Credential, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO service_users (username, password, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, username, password, created_at
            "#,
        )
        .bind(&credential.username)
        .bind(credential.password_hash.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AppError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, created_at FROM service_users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(Credential::try_from)
        .transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, AppError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, created_at FROM service_users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Credential::try_from)
        .transpose()
    }

    async fn list(&self) -> Result<Vec<Credential>, AppError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, created_at FROM service_users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Credential::try_from)
        .collect()
    }

    async fn update_password(&self, credential: &Credential) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE service_users SET password = $1 WHERE id = $2")
            .bind(credential.password_hash().as_str())
            .bind(credential.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Database(DatabaseError::NotFound(
                "User not found".to_string(),
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM service_users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price, image_name, created_at
            FROM products
            WHERE ($1::INT IS NULL OR price <= $1)
              AND ($2::TEXT IS NULL OR name = $2)
            ORDER BY id
            "#,
        )
        .bind(filter.max_price)
        .bind(filter.name.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, image_name, created_at FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (name, price, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, image_name, created_at
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, patch: &ProductPatch) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name), price = COALESCE($3, price)
            WHERE id = $1
            RETURNING id, name, price, image_name, created_at
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.price)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
