//! Payment entity - Money paid against a purchase order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a payment was made
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Efectivo
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Transferencia bancaria
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Cheque
    #[sea_orm(string_value = "check")]
    Check,
    /// Tarjeta
    #[sea_orm(string_value = "card")]
    Card,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Transfer => write!(f, "transfer"),
            Self::Check => write!(f, "check"),
            Self::Card => write!(f, "card"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(Self::Cash),
            "transfer" | "transferencia" => Ok(Self::Transfer),
            "check" | "cheque" => Ok(Self::Check),
            "card" | "tarjeta" => Ok(Self::Card),
            _ => Err(format!("Unknown payment method: {s}")),
        }
    }
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this payment settles (fully or partially)
    pub purchase_order_id: i64,
    /// Amount paid, always positive
    pub amount: f64,
    /// Date the payment was made
    pub payment_date: Date,
    /// Payment method
    pub method: PaymentMethod,
    /// Bank reference, check number, etc.
    pub reference: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// File name of the scanned receipt
    pub receipt_filename: Option<String>,
    /// When the payment was recorded
    pub created_at: DateTime,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one order
    #[sea_orm(
        belongs_to = "super::purchase_order::Entity",
        from = "Column::PurchaseOrderId",
        to = "super::purchase_order::Column::Id",
        on_delete = "Cascade"
    )]
    PurchaseOrder,
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
