//! Warehouse entity - Physical storage locations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Warehouse database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "warehouses")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Warehouse name (e.g., "Bodega Central")
    pub name: String,
    /// Address or free-text location
    pub location: Option<String>,
    /// Soft delete flag
    pub is_deleted: bool,
}

/// Warehouses have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
