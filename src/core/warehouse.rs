//! Warehouse business logic.

use crate::{
    entities::{Warehouse, warehouse},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all active warehouses ordered by name.
pub async fn get_all_active_warehouses(db: &DatabaseConnection) -> Result<Vec<warehouse::Model>> {
    Warehouse::find()
        .filter(warehouse::Column::IsDeleted.eq(false))
        .order_by_asc(warehouse::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active warehouse by name.
pub async fn get_warehouse_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<warehouse::Model>> {
    Warehouse::find()
        .filter(warehouse::Column::Name.eq(name.trim()))
        .filter(warehouse::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a warehouse.
pub async fn create_warehouse(
    db: &DatabaseConnection,
    name: String,
    location: Option<String>,
) -> Result<warehouse::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Warehouse name cannot be empty".to_string(),
        });
    }

    let warehouse = warehouse::ActiveModel {
        name: Set(name.trim().to_string()),
        location: Set(location.filter(|l| !l.trim().is_empty())),
        is_deleted: Set(false),
        ..Default::default()
    };
    warehouse.insert(db).await.map_err(Into::into)
}

/// Soft-deletes a warehouse.
pub async fn delete_warehouse(db: &DatabaseConnection, warehouse_id: i64) -> Result<()> {
    let existing = Warehouse::find_by_id(warehouse_id)
        .one(db)
        .await?
        .filter(|w| !w.is_deleted)
        .ok_or(Error::WarehouseNotFound { id: warehouse_id })?;

    let mut active: warehouse::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.update(db).await?;
    Ok(())
}
