//! Product entity - Catalog items that can be purchased from providers.
//!
//! Products carry handling metadata (unit, storage type, expiry control and
//! minimum stock) but no stock quantities.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a product is stored and tracked
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Stored loose, tracked by quantity only (e.g., milk in tanks)
    #[sea_orm(string_value = "bulk")]
    Bulk,
    /// Stored in identifiable lots
    #[sea_orm(string_value = "batch")]
    Batch,
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bulk => write!(f, "bulk"),
            Self::Batch => write!(f, "batch"),
        }
    }
}

impl FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bulk" | "granel" => Ok(Self::Bulk),
            "batch" | "lote" => Ok(Self::Batch),
            _ => Err(format!("Unknown storage type: {s}")),
        }
    }
}

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Leche entera")
    pub name: String,
    /// Internal product code, unique among active products
    pub code: String,
    /// Unit of measure (e.g., "kg", "lt", "unidad")
    pub unit: String,
    /// Optional catalog grouping
    pub product_type_id: Option<i64>,
    /// Storage strategy
    pub storage_type: StorageType,
    /// Whether expiry dates must be tracked for this product
    pub expiry_control: bool,
    /// Minimum stock level in `unit`s
    pub min_stock: f64,
    /// Soft delete flag
    pub is_deleted: bool,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product may belong to one product type
    #[sea_orm(
        belongs_to = "super::product_type::Entity",
        from = "Column::ProductTypeId",
        to = "super::product_type::Column::Id"
    )]
    ProductType,
    /// One product appears in many order lines
    #[sea_orm(has_many = "super::purchase_order_item::Entity")]
    OrderItems,
}

impl Related<super::product_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductType.def()
    }
}

impl Related<super::purchase_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
