//! Notification entity - In-app alerts about payments, orders and stock.
//!
//! Notifications are records only; nothing dispatches them anywhere.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a notification is about
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A payment deadline is near or past
    #[sea_orm(string_value = "payment_due")]
    PaymentDue,
    /// A purchase order changed status
    #[sea_orm(string_value = "order_update")]
    OrderUpdate,
    /// Stock fell under the minimum
    #[sea_orm(string_value = "low_stock")]
    LowStock,
    /// Anything else
    #[sea_orm(string_value = "system")]
    System,
}

/// Urgency of a notification
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    /// Informational
    #[sea_orm(string_value = "low")]
    Low,
    /// Needs attention soon
    #[sea_orm(string_value = "medium")]
    Medium,
    /// Needs attention now
    #[sea_orm(string_value = "high")]
    High,
}

/// Read state of a notification
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Not yet seen
    #[sea_orm(string_value = "unread")]
    Unread,
    /// Seen
    #[sea_orm(string_value = "read")]
    Read,
    /// Hidden from the default listing
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaymentDue => write!(f, "payment_due"),
            Self::OrderUpdate => write!(f, "order_update"),
            Self::LowStock => write!(f, "low_stock"),
            Self::System => write!(f, "system"),
        }
    }
}

impl fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unread => write!(f, "unread"),
            Self::Read => write!(f, "read"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("Unknown notification status: {s}")),
        }
    }
}

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Classification
    pub notification_type: NotificationType,
    /// Urgency
    pub priority: NotificationPriority,
    /// Read state
    pub status: NotificationStatus,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Order the notification refers to, if any
    pub purchase_order_id: Option<i64>,
    /// When the notification was created
    pub created_at: DateTime,
}

/// Notifications reference orders by plain id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
