use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ValidationError;
use crate::validators::{is_valid_price, is_valid_price_filter, is_valid_product_name};

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i32,
    pub image_name: Option<String>,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: i32,
}

impl NewProduct {
    pub fn new(name: &str, price: i32) -> Result<Self, ValidationError> {
        Ok(Self {
            name: is_valid_product_name(name)?,
            price: is_valid_price(price)?,
        })
    }
}

/// Partial update; `None` leaves the field as is
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<i32>,
}

impl ProductPatch {
    pub fn new(name: Option<&str>, price: Option<i32>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: name.map(is_valid_product_name).transpose()?,
            price: price.map(is_valid_price).transpose()?,
        })
    }

    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
    }
}

/// Catalog search; every present field must match
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub max_price: Option<i32>,
    pub name: Option<String>,
}

impl ProductFilter {
    pub fn new(max_price: Option<i32>, name: Option<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            max_price: max_price.map(is_valid_price_filter).transpose()?,
            name,
        })
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.max_price.map_or(true, |max| product.price <= max)
            && self.name.as_ref().map_or(true, |name| &product.name == name)
    }
}

fn serialize_rfc3339<S>(dt: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    ser.serialize_str(&dt.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: i32) -> Product {
        Product {
            id: 1,
            name: name.to_string(),
            price,
            image_name: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_by_price_and_name() {
        let iphone = product("i-Phone", 1000);
        let imac = product("i-Mac", 2000);

        let by_price = ProductFilter::new(Some(1500), None).unwrap();
        assert!(by_price.matches(&iphone));
        assert!(!by_price.matches(&imac));

        let by_both = ProductFilter::new(Some(2500), Some("i-Mac".to_string())).unwrap();
        assert!(!by_both.matches(&iphone));
        assert!(by_both.matches(&imac));

        let by_name = ProductFilter::new(None, Some("i-Phone".to_string())).unwrap();
        assert!(by_name.matches(&iphone));
        assert!(!by_name.matches(&imac));

        assert!(ProductFilter::default().matches(&imac));
    }

    #[test]
    fn test_filter_rejects_low_max_price() {
        assert!(ProductFilter::new(Some(99), None).is_err());
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut p = product("i-Phone", 1000);

        ProductPatch::new(None, Some(1200)).unwrap().apply(&mut p);
        assert_eq!(p.name, "i-Phone");
        assert_eq!(p.price, 1200);

        ProductPatch::new(Some("Galaxy fold"), None).unwrap().apply(&mut p);
        assert_eq!(p.name, "Galaxy fold");
        assert_eq!(p.price, 1200);
    }

    #[test]
    fn test_new_product_validation() {
        assert!(NewProduct::new("i-Phone", 1000).is_ok());
        assert!(NewProduct::new("", 1000).is_err());
        assert!(NewProduct::new("i-Phone", -5).is_err());
        assert!(NewProduct::new("a-product-name-too-long", 5).is_err());
    }
}
