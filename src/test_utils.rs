//! Shared test utilities for `lacteo-admin`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating providers, products, orders and payments with sensible
//! defaults.

use crate::{
    config::app::Settings,
    core::{
        payment::{self, NewPayment},
        product::{self, NewProduct},
        provider::{self, ProviderInput},
        purchase_order::{self, NewOrderItem, NewPurchaseOrder},
    },
    entities::{self, PaymentMethod, StorageType},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes log output through the test harness. Safe to call more than once.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("lacteo_admin=debug")
        .try_init();
}

/// Shorthand for a calendar date.
///
/// # Panics
/// Panics if the date does not exist.
#[allow(clippy::unwrap_used)]
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Settings with no tax, so an order's total equals its line amount.
#[must_use]
pub fn test_settings() -> Settings {
    Settings {
        tax_rate: 0.0,
        ..Settings::default()
    }
}

/// Provider input with 30 credit days and no contact details.
#[must_use]
pub fn provider_input(name: &str, tax_id: &str) -> ProviderInput {
    ProviderInput {
        name: name.to_string(),
        tax_id: tax_id.to_string(),
        payment_terms_days: 30,
        ..ProviderInput::default()
    }
}

/// Creates a provider whose tax id is derived from its name.
pub async fn create_test_provider(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::provider::Model> {
    provider::create_provider(db, provider_input(name, &format!("RUT-{name}"))).await
}

/// Product input measured in kg, stored by batch, with no minimum stock.
#[must_use]
pub fn product_input(name: &str, code: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        code: code.to_string(),
        unit: "kg".to_string(),
        product_type_id: None,
        storage_type: StorageType::Batch,
        expiry_control: false,
        min_stock: 0.0,
    }
}

/// Creates a product with [`product_input`] defaults.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    code: &str,
) -> Result<entities::product::Model> {
    product::create_product(db, product_input(name, code)).await
}

/// Database with one provider and one product.
pub async fn setup_with_catalog() -> Result<(
    DatabaseConnection,
    entities::provider::Model,
    entities::product::Model,
)> {
    let db = setup_test_db().await?;
    let provider = create_test_provider(&db, "Lechería del Sur").await?;
    let product = create_test_product(&db, "Leche cruda", "LC-001").await?;
    Ok((db, provider, product))
}

/// Order placed on 2024-01-10 with one line of quantity 1 costing `amount`.
#[must_use]
pub fn order_input(provider_id: i64, product_id: i64, amount: f64) -> NewPurchaseOrder {
    NewPurchaseOrder {
        provider_id,
        order_date: date(2024, 1, 10),
        expected_delivery_date: None,
        payment_due_date: None,
        notes: None,
        items: vec![NewOrderItem {
            product_id,
            quantity: 1.0,
            unit_cost: amount,
        }],
    }
}

/// Creates an untaxed order whose total is `amount`.
pub async fn create_test_order(
    db: &DatabaseConnection,
    provider_id: i64,
    product_id: i64,
    amount: f64,
    payment_due_date: Option<NaiveDate>,
) -> Result<entities::purchase_order::Model> {
    let input = NewPurchaseOrder {
        payment_due_date,
        ..order_input(provider_id, product_id, amount)
    };
    purchase_order::create_purchase_order(db, input, &test_settings()).await
}

/// Database with a single pre-order totalling `total`.
pub async fn setup_with_order(
    total: f64,
) -> Result<(DatabaseConnection, entities::purchase_order::Model)> {
    let (db, provider, product) = setup_with_catalog().await?;
    let order = create_test_order(&db, provider.id, product.id, total, None).await?;
    Ok((db, order))
}

/// Transfer payment dated 2024-01-11.
#[must_use]
pub fn payment_input(purchase_order_id: i64, amount: f64) -> NewPayment {
    NewPayment {
        purchase_order_id,
        amount,
        payment_date: date(2024, 1, 11),
        method: PaymentMethod::Transfer,
        reference: None,
        description: None,
        receipt_filename: None,
    }
}

/// Records a payment with [`payment_input`] defaults.
pub async fn record_test_payment(
    db: &DatabaseConnection,
    purchase_order_id: i64,
    amount: f64,
) -> Result<entities::payment::Model> {
    payment::record_payment(db, payment_input(purchase_order_id, amount)).await
}
