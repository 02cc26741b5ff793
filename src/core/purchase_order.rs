//! Purchase order business logic - Orders, their line items and lifecycle.
//!
//! Orders are created together with their line items inside one database
//! transaction. Totals (subtotal, tax, total) are computed from the line items
//! whenever the item list is written, which is only allowed while the order is
//! still a pre-order; from issuance on the totals are frozen. Status moves
//! forward one step at a time through [`OrderStatus::next`].

use crate::{
    config::app::Settings,
    core::{
        notification::{self, NewNotification},
        reconciliation::{remaining_balance, round_currency, total_paid},
    },
    entities::{
        NotificationPriority, NotificationType, OrderPaymentStatus, OrderStatus, Payment,
        Product, Provider, PurchaseOrder, PurchaseOrderItem, payment, purchase_order,
        purchase_order_item,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, TimeDelta};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

/// One requested order line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewOrderItem {
    /// Product being bought
    pub product_id: i64,
    /// Quantity in the product's unit
    pub quantity: f64,
    /// Cost per unit
    pub unit_cost: f64,
}

/// Input for creating a purchase order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchaseOrder {
    /// Provider to order from
    pub provider_id: i64,
    /// Date the order is placed
    pub order_date: NaiveDate,
    /// Expected delivery date
    pub expected_delivery_date: Option<NaiveDate>,
    /// Payment due date; derived from the provider's credit days when absent
    pub payment_due_date: Option<NaiveDate>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Order lines, at least one
    pub items: Vec<NewOrderItem>,
}

/// Header fields that may change after creation. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDetailsUpdate {
    /// New expected delivery date
    pub expected_delivery_date: Option<NaiveDate>,
    /// New payment due date
    pub payment_due_date: Option<NaiveDate>,
    /// New notes
    pub notes: Option<String>,
}

/// Monetary totals of an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    /// Sum of line subtotals
    pub subtotal: f64,
    /// Tax over the subtotal
    pub tax: f64,
    /// Subtotal plus tax
    pub total: f64,
}

/// Cost of a single line, rounded to cents.
#[must_use]
pub fn line_subtotal(quantity: f64, unit_cost: f64) -> f64 {
    round_currency(quantity * unit_cost)
}

/// Computes subtotal, tax and total for a set of lines.
#[must_use]
pub fn compute_order_totals(items: &[NewOrderItem], tax_rate: f64) -> OrderTotals {
    let subtotal = round_currency(
        items
            .iter()
            .map(|item| line_subtotal(item.quantity, item.unit_cost))
            .sum(),
    );
    let tax = round_currency(subtotal * tax_rate);
    OrderTotals {
        subtotal,
        tax,
        total: round_currency(subtotal + tax),
    }
}

fn validate_items(items: &[NewOrderItem]) -> Result<()> {
    if items.is_empty() {
        return Err(Error::Validation {
            message: "A purchase order needs at least one item".to_string(),
        });
    }
    for item in items {
        if !item.quantity.is_finite() || item.quantity <= 0.0 {
            return Err(Error::InvalidAmount {
                amount: item.quantity,
            });
        }
        if !item.unit_cost.is_finite() || item.unit_cost < 0.0 {
            return Err(Error::InvalidAmount {
                amount: item.unit_cost,
            });
        }
    }
    Ok(())
}

fn validate_dates(
    order_date: NaiveDate,
    expected_delivery_date: Option<NaiveDate>,
    payment_due_date: Option<NaiveDate>,
) -> Result<()> {
    if expected_delivery_date.is_some_and(|d| d < order_date) {
        return Err(Error::Validation {
            message: "Expected delivery date cannot be before the order date".to_string(),
        });
    }
    if payment_due_date.is_some_and(|d| d < order_date) {
        return Err(Error::Validation {
            message: "Payment due date cannot be before the order date".to_string(),
        });
    }
    Ok(())
}

async fn ensure_products_exist<C>(db: &C, items: &[NewOrderItem]) -> Result<()>
where
    C: ConnectionTrait,
{
    for item in items {
        Product::find_by_id(item.product_id)
            .one(db)
            .await?
            .filter(|p| !p.is_deleted)
            .ok_or(Error::ProductNotFound {
                id: item.product_id,
            })?;
    }
    Ok(())
}

async fn insert_items<C>(
    db: &C,
    order_id: i64,
    items: &[NewOrderItem],
) -> Result<Vec<purchase_order_item::Model>>
where
    C: ConnectionTrait,
{
    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let line = purchase_order_item::ActiveModel {
            purchase_order_id: Set(order_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            unit_cost: Set(item.unit_cost),
            subtotal: Set(line_subtotal(item.quantity, item.unit_cost)),
            ..Default::default()
        };
        inserted.push(line.insert(db).await?);
    }
    Ok(inserted)
}

async fn next_order_number<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    let last = PurchaseOrder::find()
        .order_by_desc(purchase_order::Column::Id)
        .one(db)
        .await?;
    let next_id = last.map_or(1, |order| order.id + 1);
    Ok(format!("OC-{next_id:05}"))
}

/// Date the balance falls due when the caller gives none.
fn default_due_date(
    order_date: NaiveDate,
    provider_terms_days: i32,
    settings: &Settings,
) -> Option<NaiveDate> {
    let days = if provider_terms_days > 0 {
        provider_terms_days
    } else {
        settings.default_payment_terms_days
    };
    order_date.checked_add_signed(TimeDelta::days(i64::from(days)))
}

/// Creates a purchase order and its line items in one transaction.
///
/// # Errors
/// Returns an error if:
/// - There are no items, or an item has a non-positive quantity or negative cost
/// - A date precedes the order date
/// - The provider or a product does not exist or is deleted
/// - Any database operation fails
pub async fn create_purchase_order(
    db: &DatabaseConnection,
    input: NewPurchaseOrder,
    settings: &Settings,
) -> Result<purchase_order::Model> {
    validate_items(&input.items)?;
    validate_dates(
        input.order_date,
        input.expected_delivery_date,
        input.payment_due_date,
    )?;

    let txn = db.begin().await?;

    let provider = Provider::find_by_id(input.provider_id)
        .one(&txn)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::ProviderNotFound {
            id: input.provider_id,
        })?;
    ensure_products_exist(&txn, &input.items).await?;

    let totals = compute_order_totals(&input.items, settings.tax_rate);
    let payment_due_date = input.payment_due_date.or_else(|| {
        default_due_date(input.order_date, provider.payment_terms_days, settings)
    });
    let order_number = next_order_number(&txn).await?;
    let now = chrono::Utc::now().naive_utc();

    let order = purchase_order::ActiveModel {
        order_number: Set(order_number),
        provider_id: Set(provider.id),
        order_date: Set(input.order_date),
        expected_delivery_date: Set(input.expected_delivery_date),
        payment_due_date: Set(payment_due_date),
        status: Set(OrderStatus::PreOrder),
        payment_status: Set(OrderPaymentStatus::Unpaid),
        subtotal: Set(totals.subtotal),
        tax: Set(totals.tax),
        total: Set(totals.total),
        notes: Set(input.notes.filter(|n| !n.trim().is_empty())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let order = order.insert(&txn).await?;
    insert_items(&txn, order.id, &input.items).await?;

    txn.commit().await?;

    info!(
        "Created purchase order {} for provider {} with {} items, total {:.2}",
        order.order_number,
        provider.name,
        input.items.len(),
        order.total
    );
    Ok(order)
}

/// Retrieves an order header by id.
pub async fn get_order_by_id<C>(db: &C, order_id: i64) -> Result<Option<purchase_order::Model>>
where
    C: ConnectionTrait,
{
    PurchaseOrder::find_by_id(order_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an order by its `OC-00001` style number.
pub async fn get_order_by_number(
    db: &DatabaseConnection,
    order_number: &str,
) -> Result<Option<purchase_order::Model>> {
    PurchaseOrder::find()
        .filter(purchase_order::Column::OrderNumber.eq(order_number.trim().to_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the line items of an order in insertion order.
pub async fn get_order_items<C>(db: &C, order_id: i64) -> Result<Vec<purchase_order_item::Model>>
where
    C: ConnectionTrait,
{
    PurchaseOrderItem::find()
        .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
        .order_by_asc(purchase_order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an order together with its line items.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if the order does not exist.
pub async fn get_order_with_items(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<(purchase_order::Model, Vec<purchase_order_item::Model>)> {
    let order = get_order_by_id(db, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    let items = get_order_items(db, order_id).await?;
    Ok((order, items))
}

/// Lists orders newest first, optionally restricted to one status.
pub async fn list_orders(
    db: &DatabaseConnection,
    status: Option<OrderStatus>,
) -> Result<Vec<purchase_order::Model>> {
    let mut query = PurchaseOrder::find();
    if let Some(status) = status {
        query = query.filter(purchase_order::Column::Status.eq(status));
    }
    query
        .order_by_desc(purchase_order::Column::OrderDate)
        .order_by_desc(purchase_order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the orders placed with one provider, newest first.
pub async fn list_orders_for_provider(
    db: &DatabaseConnection,
    provider_id: i64,
) -> Result<Vec<purchase_order::Model>> {
    PurchaseOrder::find()
        .filter(purchase_order::Column::ProviderId.eq(provider_id))
        .order_by_desc(purchase_order::Column::OrderDate)
        .order_by_desc(purchase_order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists orders whose balance is not settled, oldest due date first.
pub async fn list_unpaid_orders(db: &DatabaseConnection) -> Result<Vec<purchase_order::Model>> {
    PurchaseOrder::find()
        .filter(purchase_order::Column::PaymentStatus.eq(OrderPaymentStatus::Unpaid))
        .order_by_asc(purchase_order::Column::PaymentDueDate)
        .order_by_asc(purchase_order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates header dates and notes.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if the order does not exist, or
/// [`Error::Validation`] if a date would precede the order date.
pub async fn update_order_details(
    db: &DatabaseConnection,
    order_id: i64,
    update: OrderDetailsUpdate,
) -> Result<purchase_order::Model> {
    let order = get_order_by_id(db, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    let expected = update
        .expected_delivery_date
        .or(order.expected_delivery_date);
    let due = update.payment_due_date.or(order.payment_due_date);
    validate_dates(order.order_date, expected, due)?;

    let mut active: purchase_order::ActiveModel = order.into();
    active.expected_delivery_date = Set(expected);
    active.payment_due_date = Set(due);
    if let Some(notes) = update.notes {
        active.notes = Set(Some(notes).filter(|n| !n.trim().is_empty()));
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

/// Replaces the line items of a pre-order and recomputes its totals.
///
/// # Errors
/// Returns [`Error::OrderLocked`] once the order has been issued, plus the
/// same item validation errors as [`create_purchase_order`].
pub async fn replace_order_items(
    db: &DatabaseConnection,
    order_id: i64,
    items: Vec<NewOrderItem>,
    settings: &Settings,
) -> Result<purchase_order::Model> {
    validate_items(&items)?;

    let txn = db.begin().await?;

    let order = get_order_by_id(&txn, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    if !order.status.allows_item_changes() {
        return Err(Error::OrderLocked {
            order_number: order.order_number,
            status: order.status,
        });
    }
    ensure_products_exist(&txn, &items).await?;

    let totals = compute_order_totals(&items, settings.tax_rate);
    let payments = Payment::find()
        .filter(payment::Column::PurchaseOrderId.eq(order_id))
        .all(&txn)
        .await?;
    let paid = total_paid(&payments);
    if round_currency(paid) > round_currency(totals.total) {
        return Err(Error::Validation {
            message: format!(
                "Order {} already has {paid:.2} paid, more than the new total {:.2}",
                order.order_number, totals.total
            ),
        });
    }

    PurchaseOrderItem::delete_many()
        .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
        .exec(&txn)
        .await?;
    insert_items(&txn, order_id, &items).await?;

    let payment_status = if remaining_balance(totals.total, paid) <= 0.0 {
        OrderPaymentStatus::Paid
    } else {
        OrderPaymentStatus::Unpaid
    };

    let mut active: purchase_order::ActiveModel = order.into();
    active.subtotal = Set(totals.subtotal);
    active.tax = Set(totals.tax);
    active.total = Set(totals.total);
    active.payment_status = Set(payment_status);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    debug!(
        "Replaced items of {}: {} lines, total {:.2}",
        updated.order_number,
        items.len(),
        updated.total
    );
    Ok(updated)
}

/// Moves an order to the next lifecycle status and records an
/// `order_update` notification.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if the order does not exist, or
/// [`Error::FinalOrderStatus`] if it is already paid.
pub async fn advance_order_status(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<purchase_order::Model> {
    let txn = db.begin().await?;

    let order = get_order_by_id(&txn, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    let next = order.status.next().ok_or_else(|| Error::FinalOrderStatus {
        order_number: order.order_number.clone(),
    })?;
    let previous = order.status;

    let mut active: purchase_order::ActiveModel = order.into();
    active.status = Set(next);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = active.update(&txn).await?;

    notification::create_notification(
        &txn,
        NewNotification {
            notification_type: NotificationType::OrderUpdate,
            priority: NotificationPriority::Low,
            title: format!("Orden {} actualizada", updated.order_number),
            message: format!(
                "La orden {} pasó de {} a {}",
                updated.order_number,
                previous.label_es(),
                next.label_es()
            ),
            purchase_order_id: Some(updated.id),
        },
    )
    .await?;

    txn.commit().await?;

    info!(
        "Order {} advanced from {} to {}",
        updated.order_number, previous, next
    );
    Ok(updated)
}

/// Deletes an order together with its line items and payments.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if the order does not exist.
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let order = get_order_by_id(&txn, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    Payment::delete_many()
        .filter(payment::Column::PurchaseOrderId.eq(order_id))
        .exec(&txn)
        .await?;
    PurchaseOrderItem::delete_many()
        .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
        .exec(&txn)
        .await?;
    let order_number = order.order_number.clone();
    order.delete(&txn).await?;

    txn.commit().await?;

    info!("Deleted purchase order {order_number}");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::payment::get_payments_for_order;
    use crate::entities::Notification;
    use crate::test_utils::*;

    #[test]
    fn test_compute_order_totals() {
        let items = vec![
            NewOrderItem {
                product_id: 1,
                quantity: 1000.0,
                unit_cost: 450.0,
            },
            NewOrderItem {
                product_id: 2,
                quantity: 2.5,
                unit_cost: 3990.0,
            },
        ];
        let totals = compute_order_totals(&items, 0.19);
        assert_eq!(totals.subtotal, 459_975.0);
        assert_eq!(totals.tax, 87_395.25);
        assert_eq!(totals.total, 547_370.25);

        let untaxed = compute_order_totals(&items, 0.0);
        assert_eq!(untaxed.total, untaxed.subtotal);
    }

    #[test]
    fn test_line_subtotal_rounds() {
        assert_eq!(line_subtotal(3.0, 0.1), 0.3);
        assert_eq!(line_subtotal(0.333, 10.0), 3.33);
    }

    #[tokio::test]
    async fn test_create_purchase_order_validation() -> Result<()> {
        let (db, provider, product) = setup_with_catalog().await?;

        let mut input = order_input(provider.id, product.id, 100.0);
        input.items.clear();
        assert!(matches!(
            create_purchase_order(&db, input, &test_settings()).await,
            Err(Error::Validation { .. })
        ));

        let mut input = order_input(provider.id, product.id, 100.0);
        input.items[0].quantity = 0.0;
        assert!(matches!(
            create_purchase_order(&db, input, &test_settings()).await,
            Err(Error::InvalidAmount { amount: 0.0 })
        ));

        let mut input = order_input(provider.id, product.id, 100.0);
        input.items[0].unit_cost = -1.0;
        assert!(matches!(
            create_purchase_order(&db, input, &test_settings()).await,
            Err(Error::InvalidAmount { amount: -1.0 })
        ));

        let mut input = order_input(provider.id, product.id, 100.0);
        input.payment_due_date = Some(date(2023, 12, 31));
        assert!(matches!(
            create_purchase_order(&db, input, &test_settings()).await,
            Err(Error::Validation { .. })
        ));

        let input = order_input(999, product.id, 100.0);
        assert!(matches!(
            create_purchase_order(&db, input, &test_settings()).await,
            Err(Error::ProviderNotFound { id: 999 })
        ));

        let input = order_input(provider.id, 999, 100.0);
        assert!(matches!(
            create_purchase_order(&db, input, &test_settings()).await,
            Err(Error::ProductNotFound { id: 999 })
        ));

        assert!(list_orders(&db, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_purchase_order_integration() -> Result<()> {
        let (db, provider, product) = setup_with_catalog().await?;
        let other = create_test_product(&db, "Cultivo láctico", "CL-1").await?;

        let input = NewPurchaseOrder {
            provider_id: provider.id,
            order_date: date(2024, 1, 10),
            expected_delivery_date: Some(date(2024, 1, 15)),
            payment_due_date: None,
            notes: Some("Entregar en Bodega Central".to_string()),
            items: vec![
                NewOrderItem {
                    product_id: product.id,
                    quantity: 1000.0,
                    unit_cost: 450.0,
                },
                NewOrderItem {
                    product_id: other.id,
                    quantity: 4.0,
                    unit_cost: 12_500.0,
                },
            ],
        };
        let order = create_purchase_order(&db, input, &Settings::default()).await?;

        assert_eq!(order.order_number, "OC-00001");
        assert_eq!(order.status, OrderStatus::PreOrder);
        assert_eq!(order.payment_status, OrderPaymentStatus::Unpaid);
        assert_eq!(order.subtotal, 500_000.0);
        assert_eq!(order.tax, 95_000.0);
        assert_eq!(order.total, 595_000.0);
        // Provider has 30 credit days
        assert_eq!(order.payment_due_date, Some(date(2024, 2, 9)));

        let (loaded, items) = get_order_with_items(&db, order.id).await?;
        assert_eq!(loaded, order);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].subtotal, 450_000.0);
        assert_eq!(items[1].subtotal, 50_000.0);

        let second = create_test_order(&db, provider.id, product.id, 1000.0, None).await?;
        assert_eq!(second.order_number, "OC-00002");
        Ok(())
    }

    #[tokio::test]
    async fn test_default_due_date_uses_settings_without_provider_terms() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = provider_input("Contado SpA", "77.000.000-1");
        input.payment_terms_days = 0;
        let provider = crate::core::provider::create_provider(&db, input).await?;
        let product = create_test_product(&db, "Sal", "SL-1").await?;

        let mut settings = test_settings();
        settings.default_payment_terms_days = 15;
        let order = create_purchase_order(
            &db,
            order_input(provider.id, product.id, 100.0),
            &settings,
        )
        .await?;
        assert_eq!(order.payment_due_date, Some(date(2024, 1, 25)));
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_provider_cannot_receive_orders() -> Result<()> {
        let (db, provider, product) = setup_with_catalog().await?;
        crate::core::provider::delete_provider(&db, provider.id).await?;

        let result =
            create_purchase_order(&db, order_input(provider.id, product.id, 10.0), &test_settings())
                .await;
        assert!(matches!(result, Err(Error::ProviderNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_order_by_number() -> Result<()> {
        let (db, order) = setup_with_order(1000.0).await?;

        let found = get_order_by_number(&db, "oc-00001").await?;
        assert_eq!(found.map(|o| o.id), Some(order.id));
        assert!(get_order_by_number(&db, "OC-00099").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_advance_order_status_through_lifecycle() -> Result<()> {
        let (db, order) = setup_with_order(1000.0).await?;

        let issued = advance_order_status(&db, order.id).await?;
        assert_eq!(issued.status, OrderStatus::Issued);
        let received = advance_order_status(&db, order.id).await?;
        assert_eq!(received.status, OrderStatus::Received);
        let paid = advance_order_status(&db, order.id).await?;
        assert_eq!(paid.status, OrderStatus::Paid);

        let result = advance_order_status(&db, order.id).await;
        assert!(matches!(result, Err(Error::FinalOrderStatus { .. })));

        let notifications = Notification::find().all(&db).await?;
        assert_eq!(notifications.len(), 3);
        assert!(
            notifications
                .iter()
                .all(|n| n.notification_type == NotificationType::OrderUpdate
                    && n.purchase_order_id == Some(order.id))
        );

        assert!(matches!(
            advance_order_status(&db, 999).await,
            Err(Error::OrderNotFound { id: 999 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_by_status() -> Result<()> {
        let (db, provider, product) = setup_with_catalog().await?;
        let first = create_test_order(&db, provider.id, product.id, 100.0, None).await?;
        let second = create_test_order(&db, provider.id, product.id, 200.0, None).await?;
        advance_order_status(&db, second.id).await?;

        let all = list_orders(&db, None).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);

        let pre_orders = list_orders(&db, Some(OrderStatus::PreOrder)).await?;
        assert_eq!(pre_orders.len(), 1);
        assert_eq!(pre_orders[0].id, first.id);

        let by_provider = list_orders_for_provider(&db, provider.id).await?;
        assert_eq!(by_provider.len(), 2);
        assert!(list_orders_for_provider(&db, 999).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_items_only_while_pre_order() -> Result<()> {
        let (db, provider, product) = setup_with_catalog().await?;
        let order = create_test_order(&db, provider.id, product.id, 1000.0, None).await?;

        let new_items = vec![NewOrderItem {
            product_id: product.id,
            quantity: 3.0,
            unit_cost: 1000.0,
        }];
        let updated = replace_order_items(&db, order.id, new_items.clone(), &Settings::default())
            .await?;
        assert_eq!(updated.subtotal, 3000.0);
        assert_eq!(updated.tax, 570.0);
        assert_eq!(updated.total, 3570.0);
        assert_eq!(get_order_items(&db, order.id).await?.len(), 1);

        advance_order_status(&db, order.id).await?;
        let locked = replace_order_items(&db, order.id, new_items, &Settings::default()).await;
        assert!(matches!(
            locked,
            Err(Error::OrderLocked {
                status: OrderStatus::Issued,
                ..
            })
        ));

        let frozen = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(frozen.total, 3570.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_items_recomputes_payment_status() -> Result<()> {
        let (db, order) = setup_with_order(1000.0).await?;
        record_test_payment(&db, order.id, 1000.0).await?;
        let settled = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(settled.payment_status, OrderPaymentStatus::Paid);

        let items = get_order_items(&db, order.id).await?;
        let grown = replace_order_items(
            &db,
            order.id,
            vec![NewOrderItem {
                product_id: items[0].product_id,
                quantity: 2.0,
                unit_cost: 1000.0,
            }],
            &test_settings(),
        )
        .await?;
        assert_eq!(grown.total, 2000.0);
        assert_eq!(grown.payment_status, OrderPaymentStatus::Unpaid);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_items_cannot_drop_total_below_paid() -> Result<()> {
        let (db, order) = setup_with_order(1000.0).await?;
        record_test_payment(&db, order.id, 800.0).await?;
        let items = get_order_items(&db, order.id).await?;

        let shrunk = replace_order_items(
            &db,
            order.id,
            vec![NewOrderItem {
                product_id: items[0].product_id,
                quantity: 1.0,
                unit_cost: 300.0,
            }],
            &test_settings(),
        )
        .await;
        assert!(matches!(shrunk, Err(Error::Validation { .. })));

        // Nothing changed
        let unchanged = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(unchanged.total, 1000.0);
        assert_eq!(unchanged.payment_status, OrderPaymentStatus::Unpaid);
        let kept = get_order_items(&db, order.id).await?;
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].unit_cost, 1000.0);

        // Shrinking exactly to the amount paid settles the order
        let settled = replace_order_items(
            &db,
            order.id,
            vec![NewOrderItem {
                product_id: items[0].product_id,
                quantity: 1.0,
                unit_cost: 800.0,
            }],
            &test_settings(),
        )
        .await?;
        assert_eq!(settled.total, 800.0);
        assert_eq!(settled.payment_status, OrderPaymentStatus::Paid);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_order_details() -> Result<()> {
        let (db, order) = setup_with_order(1000.0).await?;

        let updated = update_order_details(
            &db,
            order.id,
            OrderDetailsUpdate {
                payment_due_date: Some(date(2024, 3, 1)),
                notes: Some("Pagar por transferencia".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.payment_due_date, Some(date(2024, 3, 1)));
        assert_eq!(updated.notes.as_deref(), Some("Pagar por transferencia"));
        assert_eq!(updated.expected_delivery_date, order.expected_delivery_date);

        let invalid = update_order_details(
            &db,
            order.id,
            OrderDetailsUpdate {
                expected_delivery_date: Some(date(2020, 1, 1)),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(invalid, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_order_cascades() -> Result<()> {
        let (db, order) = setup_with_order(1000.0).await?;
        record_test_payment(&db, order.id, 400.0).await?;

        delete_order(&db, order.id).await?;

        assert!(get_order_by_id(&db, order.id).await?.is_none());
        assert!(get_order_items(&db, order.id).await?.is_empty());
        assert!(get_payments_for_order(&db, order.id).await?.is_empty());

        assert!(matches!(
            delete_order(&db, order.id).await,
            Err(Error::OrderNotFound { .. })
        ));
        Ok(())
    }
}
