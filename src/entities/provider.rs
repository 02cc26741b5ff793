//! Provider entity - External suppliers the business buys from.
//!
//! Phones and emails are stored as comma-separated lists; `core::provider`
//! exposes them as vectors. Deleting a provider only flips `is_deleted` so
//! that historic purchase orders keep their reference.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Provider database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    /// Unique identifier for the provider
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Business name (e.g., "Lechera del Sur")
    pub name: String,
    /// Tax identifier (RUT)
    pub tax_id: String,
    /// Name of the person to contact
    pub contact_name: Option<String>,
    /// Comma-separated phone numbers
    pub phones: String,
    /// Comma-separated email addresses
    pub emails: String,
    /// Credit days granted by the contract
    pub payment_terms_days: i32,
    /// Free-text contract conditions
    pub contract_notes: Option<String>,
    /// Soft delete flag
    pub is_deleted: bool,
    /// When the provider was created
    pub created_at: DateTime,
    /// When the provider was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Provider and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One provider has many purchase orders
    #[sea_orm(has_many = "super::purchase_order::Entity")]
    PurchaseOrders,
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
