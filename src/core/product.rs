//! Product business logic - Handles all product catalog operations.
//!
//! Products are the items purchase orders are made of. Codes are unique among
//! active products; names are free-form. Deleting a product flags it as
//! deleted so existing order lines keep their reference.

use crate::{
    entities::{Product, ProductType, StorageType, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Product name
    pub name: String,
    /// Unique product code
    pub code: String,
    /// Unit of measure
    pub unit: String,
    /// Optional product type
    pub product_type_id: Option<i64>,
    /// Storage strategy
    pub storage_type: StorageType,
    /// Whether expiry is tracked
    pub expiry_control: bool,
    /// Minimum stock
    pub min_stock: f64,
}

/// Retrieves all active (non-deleted) products, ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_active_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active product by its code.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_code<C>(db: &C, code: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::Code.eq(code.trim()))
        .filter(product::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by id, including deleted ones.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The name, code or unit is empty
/// - The minimum stock is negative or not finite
/// - The code is already used by an active product
/// - The product type does not exist
/// - The database insert operation fails
pub async fn create_product(db: &DatabaseConnection, input: NewProduct) -> Result<product::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product name cannot be empty".to_string(),
        });
    }
    if input.code.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product code cannot be empty".to_string(),
        });
    }
    if input.unit.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product unit cannot be empty".to_string(),
        });
    }
    if !input.min_stock.is_finite() || input.min_stock < 0.0 {
        return Err(Error::InvalidAmount {
            amount: input.min_stock,
        });
    }
    if get_product_by_code(db, &input.code).await?.is_some() {
        return Err(Error::DuplicateCode {
            code: input.code.trim().to_string(),
        });
    }
    if let Some(type_id) = input.product_type_id {
        ProductType::find_by_id(type_id)
            .one(db)
            .await?
            .ok_or(Error::ProductTypeNotFound { id: type_id })?;
    }

    let now = chrono::Utc::now().naive_utc();
    let product = product::ActiveModel {
        name: Set(input.name.trim().to_string()),
        code: Set(input.code.trim().to_string()),
        unit: Set(input.unit.trim().to_string()),
        product_type_id: Set(input.product_type_id),
        storage_type: Set(input.storage_type),
        expiry_control: Set(input.expiry_control),
        min_stock: Set(input.min_stock),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = product.insert(db).await?;
    info!("Created product {} [{}]", result.name, result.code);
    Ok(result)
}

/// Changes a product's minimum stock level.
///
/// # Errors
/// Returns an error if the value is negative or the product does not exist.
pub async fn update_min_stock(
    db: &DatabaseConnection,
    product_id: i64,
    min_stock: f64,
) -> Result<product::Model> {
    if !min_stock.is_finite() || min_stock < 0.0 {
        return Err(Error::InvalidAmount { amount: min_stock });
    }

    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let mut active: product::ActiveModel = existing.into();
    active.min_stock = Set(min_stock);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

/// Soft-deletes a product.
///
/// # Errors
/// Returns an error if the product does not exist or is already deleted.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let mut active: product::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await?;
    Ok(())
}
