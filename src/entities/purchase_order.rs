//! Purchase order entity - A commitment to buy products from a provider.
//!
//! Each order has a header (provider, dates, lifecycle status, payment status
//! and frozen totals) and a list of line items in `purchase_order_items`.
//! Payments recorded against the order live in `payments`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of a purchase order
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Drafted, items may still change
    #[sea_orm(string_value = "pre_order")]
    PreOrder,
    /// Sent to the provider
    #[sea_orm(string_value = "issued")]
    Issued,
    /// Goods received
    #[sea_orm(string_value = "received")]
    Received,
    /// Settled
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreOrder => write!(f, "pre_order"),
            Self::Issued => write!(f, "issued"),
            Self::Received => write!(f, "received"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pre_order" | "preorder" | "pre-order" => Ok(Self::PreOrder),
            "issued" => Ok(Self::Issued),
            "received" => Ok(Self::Received),
            "paid" => Ok(Self::Paid),
            _ => Err(format!("Unknown order status: {s}")),
        }
    }
}

/// Whether the order has been fully settled
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum OrderPaymentStatus {
    /// Some balance is still owed
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Payments cover the full total
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl fmt::Display for OrderPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// Purchase order header model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-facing number, e.g. `OC-00012`
    #[sea_orm(unique)]
    pub order_number: String,
    /// Provider the order is placed with
    pub provider_id: i64,
    /// Date the order was placed
    pub order_date: Date,
    /// Date the goods are expected
    pub expected_delivery_date: Option<Date>,
    /// Date the balance must be paid by
    pub payment_due_date: Option<Date>,
    /// Lifecycle stage
    pub status: OrderStatus,
    /// Settlement flag
    pub payment_status: OrderPaymentStatus,
    /// Sum of line subtotals
    pub subtotal: f64,
    /// Tax over the subtotal
    pub tax: f64,
    /// Subtotal plus tax
    pub total: f64,
    /// Free-text notes
    pub notes: Option<String>,
    /// When the order was created
    pub created_at: DateTime,
    /// When the order was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `PurchaseOrder` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order is placed with one provider
    #[sea_orm(
        belongs_to = "super::provider::Entity",
        from = "Column::ProviderId",
        to = "super::provider::Column::Id"
    )]
    Provider,
    /// One order has many line items
    #[sea_orm(has_many = "super::purchase_order_item::Entity")]
    Items,
    /// One order has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::provider::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl Related<super::purchase_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
