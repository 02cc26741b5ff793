//! Payment reconciliation rules.
//!
//! Pure functions that derive an order's paid amount, remaining balance and
//! payment status label from the order total, its payment records and the
//! payment due date. Nothing here touches the database; `core::payment` loads
//! the rows and calls into this module.

use crate::{
    entities::{payment, purchase_order},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Derived payment situation of a purchase order.
///
/// Precedence: `Paid` when nothing is owed, `Partial` when something was paid,
/// otherwise the due date decides between `Overdue`, `DueSoon` and `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Remaining balance is zero
    Paid,
    /// At least one payment exists but a balance remains
    Partial,
    /// No payments and the due date has passed
    Overdue,
    /// No payments and the due date is within the warning window
    DueSoon,
    /// No payments and the due date is further away (or unknown)
    Pending,
}

impl PaymentStatus {
    /// Label shown to users.
    #[must_use]
    pub const fn label_es(self) -> &'static str {
        match self {
            Self::Paid => "Pagado",
            Self::Partial => "Parcial",
            Self::Overdue => "Vencido",
            Self::DueSoon => "Por vencer",
            Self::Pending => "Pendiente",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paid => write!(f, "paid"),
            Self::Partial => write!(f, "partial"),
            Self::Overdue => write!(f, "overdue"),
            Self::DueSoon => write!(f, "due_soon"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// Snapshot of an order's balance on a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBalance {
    /// Order the balance belongs to
    pub order_id: i64,
    /// Order total
    pub total: f64,
    /// Sum of recorded payments
    pub paid: f64,
    /// `max(0, total - paid)`
    pub remaining: f64,
    /// Number of payments recorded
    pub payment_count: usize,
    /// Days from `today` until the due date; negative once it has passed
    pub days_until_due: Option<i64>,
    /// Derived label
    pub status: PaymentStatus,
}

/// Rounds an amount to cents.
#[must_use]
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Sum of all payment amounts.
#[must_use]
pub fn total_paid(payments: &[payment::Model]) -> f64 {
    round_currency(payments.iter().map(|p| p.amount).sum())
}

/// What is still owed on an order. Never negative.
#[must_use]
pub fn remaining_balance(total: f64, paid: f64) -> f64 {
    round_currency((total - paid).max(0.0))
}

/// Whole days from `today` until `due_date`.
#[must_use]
pub fn days_until_due(due_date: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    due_date.map(|due| due.signed_duration_since(today).num_days())
}

/// Derives the status label for an order.
#[must_use]
pub fn payment_status(
    total: f64,
    payments: &[payment::Model],
    due_date: Option<NaiveDate>,
    today: NaiveDate,
    due_soon_days: i64,
) -> PaymentStatus {
    let remaining = remaining_balance(total, total_paid(payments));
    if remaining <= 0.0 {
        return PaymentStatus::Paid;
    }
    if !payments.is_empty() {
        return PaymentStatus::Partial;
    }

    match days_until_due(due_date, today) {
        Some(days) if days < 0 => PaymentStatus::Overdue,
        Some(days) if days <= due_soon_days => PaymentStatus::DueSoon,
        _ => PaymentStatus::Pending,
    }
}

/// Checks a new payment amount against the balance still owed.
///
/// # Errors
/// - [`Error::InvalidAmount`] if the amount rounds to zero cents, is negative
///   or is not finite
/// - [`Error::PaymentExceedsBalance`] if the amount is larger than `remaining`
pub fn validate_payment_amount(amount: f64, remaining: f64) -> Result<()> {
    if !amount.is_finite() || round_currency(amount) <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    if round_currency(amount) > round_currency(remaining) {
        return Err(Error::PaymentExceedsBalance { amount, remaining });
    }

    Ok(())
}

/// Computes the full balance snapshot for an order and its payments.
#[must_use]
pub fn reconcile(
    order: &purchase_order::Model,
    payments: &[payment::Model],
    today: NaiveDate,
    due_soon_days: i64,
) -> OrderBalance {
    let paid = total_paid(payments);
    OrderBalance {
        order_id: order.id,
        total: order.total,
        paid,
        remaining: remaining_balance(order.total, paid),
        payment_count: payments.len(),
        days_until_due: days_until_due(order.payment_due_date, today),
        status: payment_status(
            order.total,
            payments,
            order.payment_due_date,
            today,
            due_soon_days,
        ),
    }
}
