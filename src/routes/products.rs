/// Product Catalog Routes

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::{NewProduct, ProductFilter, ProductPatch};
use crate::error::{AppError, DatabaseError};
use crate::repository::ProductRepository;

#[derive(Deserialize)]
pub struct ProductQuery {
    pub max_price: Option<i32>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: i32,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<i32>,
}

fn product_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound("Product not found".to_string()))
}

/// GET /products?max_price=&name=
pub async fn list_products(
    query: web::Query<ProductQuery>,
    products: web::Data<dyn ProductRepository>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let filter = ProductFilter::new(query.max_price, query.name)?;
    Ok(HttpResponse::Ok().json(products.list(&filter).await?))
}

/// POST /products
pub async fn create_product(
    body: web::Json<CreateProductRequest>,
    products: web::Data<dyn ProductRepository>,
) -> Result<HttpResponse, AppError> {
    let product = products.insert(NewProduct::new(&body.name, body.price)?).await?;
    tracing::info!(product_id = product.id, "Product created");
    Ok(HttpResponse::Created().json(product))
}

/// GET /products/{product_id}
pub async fn get_product(
    path: web::Path<i64>,
    products: web::Data<dyn ProductRepository>,
) -> Result<HttpResponse, AppError> {
    let product = products
        .get(path.into_inner())
        .await?
        .ok_or_else(product_not_found)?;
    Ok(HttpResponse::Ok().json(product))
}

/// PATCH /products/{product_id}
pub async fn update_product(
    path: web::Path<i64>,
    body: web::Json<UpdateProductRequest>,
    products: web::Data<dyn ProductRepository>,
) -> Result<HttpResponse, AppError> {
    let patch = ProductPatch::new(body.name.as_deref(), body.price)?;
    let product = products
        .update(path.into_inner(), &patch)
        .await?
        .ok_or_else(product_not_found)?;
    Ok(HttpResponse::Ok().json(product))
}

/// DELETE /products/{product_id}
pub async fn delete_product(
    path: web::Path<i64>,
    products: web::Data<dyn ProductRepository>,
) -> Result<HttpResponse, AppError> {
    if !products.delete(path.into_inner()).await? {
        return Err(product_not_found());
    }
    Ok(HttpResponse::NoContent().finish())
}
