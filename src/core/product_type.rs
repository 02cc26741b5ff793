//! Product type business logic.

use crate::{
    entities::{ProductType, product_type},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all product types ordered by name.
pub async fn get_all_product_types(db: &DatabaseConnection) -> Result<Vec<product_type::Model>> {
    ProductType::find()
        .order_by_asc(product_type::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a product type by its exact name.
pub async fn get_product_type_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<product_type::Model>> {
    ProductType::find()
        .filter(product_type::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a product type by id.
pub async fn get_product_type_by_id(
    db: &DatabaseConnection,
    product_type_id: i64,
) -> Result<Option<product_type::Model>> {
    ProductType::find_by_id(product_type_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a product type. Names must be non-empty and not already taken.
pub async fn create_product_type(
    db: &DatabaseConnection,
    name: String,
    description: Option<String>,
) -> Result<product_type::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product type name cannot be empty".to_string(),
        });
    }
    if get_product_type_by_name(db, &name).await?.is_some() {
        return Err(Error::Validation {
            message: format!("Product type already exists: {}", name.trim()),
        });
    }

    let product_type = product_type::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description.filter(|d| !d.trim().is_empty())),
        ..Default::default()
    };
    product_type.insert(db).await.map_err(Into::into)
}
