//! Core business logic - framework-agnostic access layer and reconciliation rules.

/// Notification records and payment-deadline scanning
pub mod notification;
/// Purchase order status progression
pub mod order_status;
/// Payment recording and balance lookups
pub mod payment;
/// Product catalog operations
pub mod product;
/// Product type operations
pub mod product_type;
/// Provider operations
pub mod provider;
/// Purchase orders, line items and totals
pub mod purchase_order;
/// Pure balance and payment status rules
pub mod reconciliation;
/// Order detail and accounts-payable reports
pub mod report;
/// Idempotent catalog seeding from `config.toml`
pub mod seed;
/// Cached entity collections refreshed after writes
pub mod sync;
/// Warehouse operations
pub mod warehouse;
