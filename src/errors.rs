//! Unified error type for the access layer, reconciliation rules and CLI.

use crate::entities::OrderStatus;
use sea_orm::DbErr;
use thiserror::Error;

/// Every failure the application can surface to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// A required environment variable is absent or empty
    #[error("Required environment variable {name} is not set")]
    MissingEnvVar {
        /// Variable name
        name: String,
    },

    /// Error reported by the database client
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing command output failed
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Input rejected before reaching the database
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description
        message: String,
    },

    /// Amount that is zero, negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Offending amount
        amount: f64,
    },

    /// Payment larger than what is still owed on the order
    #[error("Payment of {amount:.2} exceeds the remaining balance of {remaining:.2}")]
    PaymentExceedsBalance {
        /// Submitted amount
        amount: f64,
        /// Balance still owed
        remaining: f64,
    },

    /// Provider not found
    #[error("Provider not found: {id}")]
    ProviderNotFound {
        /// Provider id
        id: i64,
    },

    /// Product not found
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Product id
        id: i64,
    },

    /// Product type not found
    #[error("Product type not found: {id}")]
    ProductTypeNotFound {
        /// Product type id
        id: i64,
    },

    /// Warehouse not found
    #[error("Warehouse not found: {id}")]
    WarehouseNotFound {
        /// Warehouse id
        id: i64,
    },

    /// Purchase order not found
    #[error("Purchase order not found: {id}")]
    OrderNotFound {
        /// Order id
        id: i64,
    },

    /// Payment not found
    #[error("Payment not found: {id}")]
    PaymentNotFound {
        /// Payment id
        id: i64,
    },

    /// Notification not found
    #[error("Notification not found: {id}")]
    NotificationNotFound {
        /// Notification id
        id: i64,
    },

    /// Order already reached the last lifecycle stage
    #[error("Order {order_number} is already paid and has no further status")]
    FinalOrderStatus {
        /// Order number
        order_number: String,
    },

    /// Line items can only change while the order is a pre-order
    #[error("Order {order_number} is {status} and its items can no longer change")]
    OrderLocked {
        /// Order number
        order_number: String,
        /// Current status
        status: OrderStatus,
    },

    /// Another active product already uses this code
    #[error("Product code already in use: {code}")]
    DuplicateCode {
        /// Conflicting code
        code: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
