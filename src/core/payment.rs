//! Payment business logic - Recording and removing payments against orders.
//!
//! Recording a payment checks the amount against the order's remaining
//! balance, inserts the payment and updates the order's payment status in a
//! single database transaction, so the sum of an order's payments can never
//! exceed its total. Deleting a payment recomputes the payment status the same
//! way.

use crate::{
    config::app::Settings,
    core::reconciliation::{self, OrderBalance},
    entities::{OrderPaymentStatus, Payment, PaymentMethod, payment, purchase_order},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, warn};

/// Input for recording a payment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    /// Order being paid
    pub purchase_order_id: i64,
    /// Amount paid
    pub amount: f64,
    /// Date of payment
    pub payment_date: NaiveDate,
    /// Payment method
    pub method: PaymentMethod,
    /// Bank reference, check number, etc.
    pub reference: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// File name of the scanned receipt
    pub receipt_filename: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Retrieves the payments of an order, oldest first.
pub async fn get_payments_for_order<C>(db: &C, order_id: i64) -> Result<Vec<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(payment::Column::PurchaseOrderId.eq(order_id))
        .order_by_asc(payment::Column::PaymentDate)
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every payment, newest first.
pub async fn list_payments(db: &DatabaseConnection) -> Result<Vec<payment::Model>> {
    Payment::find()
        .order_by_desc(payment::Column::PaymentDate)
        .order_by_desc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a payment by id.
pub async fn get_payment_by_id(
    db: &DatabaseConnection,
    payment_id: i64,
) -> Result<Option<payment::Model>> {
    Payment::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn load_order<C>(db: &C, order_id: i64) -> Result<purchase_order::Model>
where
    C: ConnectionTrait,
{
    crate::core::purchase_order::get_order_by_id(db, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })
}

async fn set_payment_status<C>(
    db: &C,
    order: purchase_order::Model,
    status: OrderPaymentStatus,
) -> Result<()>
where
    C: ConnectionTrait,
{
    if order.payment_status == status {
        return Ok(());
    }
    let mut active: purchase_order::ActiveModel = order.into();
    active.payment_status = Set(status);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await?;
    Ok(())
}

/// Records a payment against an order.
///
/// # Errors
/// Returns an error if:
/// - The order does not exist ([`Error::OrderNotFound`])
/// - The amount rounds to zero cents, is negative or is not finite
///   ([`Error::InvalidAmount`])
/// - The amount exceeds the remaining balance ([`Error::PaymentExceedsBalance`])
/// - Any database operation fails
pub async fn record_payment(db: &DatabaseConnection, input: NewPayment) -> Result<payment::Model> {
    if !input.amount.is_finite() || reconciliation::round_currency(input.amount) <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: input.amount,
        });
    }

    let txn = db.begin().await?;

    let order = load_order(&txn, input.purchase_order_id).await?;
    let existing = get_payments_for_order(&txn, order.id).await?;
    let remaining =
        reconciliation::remaining_balance(order.total, reconciliation::total_paid(&existing));

    if let Err(e) = reconciliation::validate_payment_amount(input.amount, remaining) {
        warn!(
            "Rejected payment of {:.2} for {}: {}",
            input.amount, order.order_number, e
        );
        return Err(e);
    }

    let payment = payment::ActiveModel {
        purchase_order_id: Set(order.id),
        amount: Set(reconciliation::round_currency(input.amount)),
        payment_date: Set(input.payment_date),
        method: Set(input.method),
        reference: Set(non_blank(input.reference)),
        description: Set(non_blank(input.description)),
        receipt_filename: Set(non_blank(input.receipt_filename)),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };
    let payment = payment.insert(&txn).await?;

    let remaining_after = reconciliation::remaining_balance(remaining, payment.amount);
    let order_number = order.order_number.clone();
    if remaining_after <= 0.0 {
        set_payment_status(&txn, order, OrderPaymentStatus::Paid).await?;
    }

    txn.commit().await?;

    info!(
        "Recorded {} payment of {:.2} for {}, remaining {:.2}",
        payment.method, payment.amount, order_number, remaining_after
    );
    Ok(payment)
}

/// Deletes a payment and recomputes the order's payment status.
///
/// # Errors
/// Returns [`Error::PaymentNotFound`] if the payment does not exist.
pub async fn delete_payment(db: &DatabaseConnection, payment_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let payment = Payment::find_by_id(payment_id)
        .one(&txn)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })?;
    let order_id = payment.purchase_order_id;
    payment.delete(&txn).await?;

    let order = load_order(&txn, order_id).await?;
    let remaining_payments = get_payments_for_order(&txn, order_id).await?;
    let remaining = reconciliation::remaining_balance(
        order.total,
        reconciliation::total_paid(&remaining_payments),
    );
    let status = if remaining <= 0.0 {
        OrderPaymentStatus::Paid
    } else {
        OrderPaymentStatus::Unpaid
    };
    set_payment_status(&txn, order, status).await?;

    txn.commit().await?;

    info!("Deleted payment {payment_id} of order {order_id}");
    Ok(())
}

/// Loads an order with its payments and reconciles them as of `today`.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if the order does not exist.
pub async fn get_order_balance(
    db: &DatabaseConnection,
    order_id: i64,
    today: NaiveDate,
    settings: &Settings,
) -> Result<OrderBalance> {
    let order = load_order(db, order_id).await?;
    let payments = get_payments_for_order(db, order_id).await?;
    Ok(reconciliation::reconcile(
        &order,
        &payments,
        today,
        settings.due_soon_days,
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::purchase_order::get_order_by_id;
    use crate::core::reconciliation::PaymentStatus;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_record_payment_rejects_overpayment() -> Result<()> {
        let (db, order) = setup_with_order(1_000_000.0).await?;
        record_test_payment(&db, order.id, 400_000.0).await?;

        let result = record_test_payment(&db, order.id, 700_000.0).await;
        assert!(matches!(
            result,
            Err(Error::PaymentExceedsBalance {
                amount: 700_000.0,
                remaining: 600_000.0
            })
        ));

        // Rejected payment left nothing behind
        assert_eq!(get_payments_for_order(&db, order.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_exact_remaining_settles_order() -> Result<()> {
        let (db, order) = setup_with_order(1_000_000.0).await?;
        let settings = test_settings();
        let today = date(2024, 1, 20);

        record_test_payment(&db, order.id, 400_000.0).await?;
        let partial = get_order_balance(&db, order.id, today, &settings).await?;
        assert_eq!(partial.remaining, 600_000.0);
        assert_eq!(partial.status, PaymentStatus::Partial);

        record_test_payment(&db, order.id, 600_000.0).await?;
        let settled = get_order_balance(&db, order.id, today, &settings).await?;
        assert_eq!(settled.remaining, 0.0);
        assert_eq!(settled.paid, 1_000_000.0);
        assert_eq!(settled.status, PaymentStatus::Paid);

        let reloaded = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(reloaded.payment_status, OrderPaymentStatus::Paid);

        let extra = record_test_payment(&db, order.id, 1.0).await;
        assert!(matches!(extra, Err(Error::PaymentExceedsBalance { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_validation() -> Result<()> {
        let (db, order) = setup_with_order(1000.0).await?;

        assert!(matches!(
            record_test_payment(&db, order.id, 0.0).await,
            Err(Error::InvalidAmount { amount: 0.0 })
        ));
        assert!(matches!(
            record_test_payment(&db, order.id, -10.0).await,
            Err(Error::InvalidAmount { amount: -10.0 })
        ));
        assert!(matches!(
            record_test_payment(&db, 999, 10.0).await,
            Err(Error::OrderNotFound { id: 999 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_sub_cent_payments() -> Result<()> {
        let (db, order) = setup_with_order(1000.0).await?;

        assert!(matches!(
            record_test_payment(&db, order.id, 0.001).await,
            Err(Error::InvalidAmount { .. })
        ));
        assert!(get_payments_for_order(&db, order.id).await?.is_empty());

        let stored = record_test_payment(&db, order.id, 100.004).await?;
        assert_eq!(stored.amount, 100.0);
        let balance = get_order_balance(&db, order.id, date(2024, 1, 20), &test_settings()).await?;
        assert_eq!(balance.paid, 100.0);
        assert_eq!(balance.remaining, 900.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_stores_optional_fields() -> Result<()> {
        let (db, order) = setup_with_order(1000.0).await?;

        let payment = record_payment(
            &db,
            NewPayment {
                purchase_order_id: order.id,
                amount: 250.0,
                payment_date: date(2024, 1, 12),
                method: PaymentMethod::Check,
                reference: Some("Cheque 004512".to_string()),
                description: Some("  ".to_string()),
                receipt_filename: Some("boleta-004512.pdf".to_string()),
            },
        )
        .await?;

        assert_eq!(payment.method, PaymentMethod::Check);
        assert_eq!(payment.reference.as_deref(), Some("Cheque 004512"));
        assert_eq!(payment.description, None);
        assert_eq!(payment.receipt_filename.as_deref(), Some("boleta-004512.pdf"));

        let found = get_payment_by_id(&db, payment.id).await?;
        assert_eq!(found, Some(payment));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_payment_reopens_order() -> Result<()> {
        let (db, order) = setup_with_order(500.0).await?;
        let payment = record_test_payment(&db, order.id, 500.0).await?;
        assert_eq!(
            get_order_by_id(&db, order.id).await?.unwrap().payment_status,
            OrderPaymentStatus::Paid
        );

        delete_payment(&db, payment.id).await?;
        assert_eq!(
            get_order_by_id(&db, order.id).await?.unwrap().payment_status,
            OrderPaymentStatus::Unpaid
        );
        assert!(get_payments_for_order(&db, order.id).await?.is_empty());

        assert!(matches!(
            delete_payment(&db, payment.id).await,
            Err(Error::PaymentNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_payments_newest_first() -> Result<()> {
        let (db, order) = setup_with_order(1000.0).await?;
        let first = record_payment(
            &db,
            NewPayment {
                payment_date: date(2024, 1, 11),
                ..payment_input(order.id, 100.0)
            },
        )
        .await?;
        let second = record_payment(
            &db,
            NewPayment {
                payment_date: date(2024, 1, 20),
                ..payment_input(order.id, 100.0)
            },
        )
        .await?;

        let all = list_payments(&db).await?;
        assert_eq!(all, vec![second.clone(), first.clone()]);

        let for_order = get_payments_for_order(&db, order.id).await?;
        assert_eq!(for_order, vec![first, second]);
        Ok(())
    }

    #[tokio::test]
    async fn test_unpaid_order_balance_follows_due_date() -> Result<()> {
        let (db, provider, product) = setup_with_catalog().await?;
        let order =
            create_test_order(&db, provider.id, product.id, 800.0, Some(date(2024, 2, 1))).await?;
        let settings = test_settings();

        let pending = get_order_balance(&db, order.id, date(2024, 1, 20), &settings).await?;
        assert_eq!(pending.status, PaymentStatus::Pending);
        let due_soon = get_order_balance(&db, order.id, date(2024, 1, 26), &settings).await?;
        assert_eq!(due_soon.status, PaymentStatus::DueSoon);
        let overdue = get_order_balance(&db, order.id, date(2024, 2, 2), &settings).await?;
        assert_eq!(overdue.status, PaymentStatus::Overdue);
        assert_eq!(overdue.days_until_due, Some(-1));
        Ok(())
    }
}
