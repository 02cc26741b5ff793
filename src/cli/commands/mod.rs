//! Command implementations organized by entity.

/// Schema setup, verification and seeding
pub mod admin;
/// Product types, products and warehouses
pub mod catalog;
/// Notification inbox and deadline checks
pub mod notification;
/// Purchase orders
pub mod order;
/// Payments
pub mod payment;
/// Providers
pub mod provider;
