//! Report generation business logic.
//!
//! This module builds the structured data behind the order detail view and
//! the accounts-payable summary, plus the small formatting helpers (currency,
//! progress bar) the CLI uses to print them. All functions return structured
//! data; presentation happens in the `cli` layer.

use crate::{
    config::app::Settings,
    core::{
        payment::get_payments_for_order,
        provider::get_provider_by_id,
        purchase_order::{get_order_with_items, list_unpaid_orders},
        reconciliation::{self, OrderBalance, PaymentStatus},
    },
    entities::{payment, provider, purchase_order, purchase_order_item},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Everything known about one purchase order.
#[derive(Debug, Clone)]
pub struct OrderReport {
    /// Order header
    pub order: purchase_order::Model,
    /// Provider the order was placed with
    pub provider: provider::Model,
    /// Line items
    pub items: Vec<purchase_order_item::Model>,
    /// Payments, oldest first
    pub payments: Vec<payment::Model>,
    /// Reconciled balance
    pub balance: OrderBalance,
    /// Share of the total already paid (0-100)
    pub paid_percent: f64,
}

/// Outstanding balances across all unpaid orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayablesSummary {
    /// Number of unpaid orders
    pub open_orders: usize,
    /// Sum of remaining balances
    pub total_outstanding: f64,
    /// Remaining balance of overdue orders
    pub overdue: f64,
    /// Remaining balance of orders due soon
    pub due_soon: f64,
    /// Remaining balance of orders with some payment
    pub partial: f64,
    /// Remaining balance of orders with nothing paid and no near deadline
    pub pending: f64,
    /// Orders that need attention, most urgent first
    pub attention: Vec<(purchase_order::Model, OrderBalance)>,
}

/// Builds the detail report for one order.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] or [`Error::ProviderNotFound`] if either
/// row is missing.
pub async fn generate_order_report(
    db: &DatabaseConnection,
    order_id: i64,
    today: NaiveDate,
    settings: &Settings,
) -> Result<OrderReport> {
    let (order, items) = get_order_with_items(db, order_id).await?;
    let provider = get_provider_by_id(db, order.provider_id)
        .await?
        .ok_or(Error::ProviderNotFound {
            id: order.provider_id,
        })?;
    let payments = get_payments_for_order(db, order_id).await?;
    let balance = reconciliation::reconcile(&order, &payments, today, settings.due_soon_days);
    let paid_percent = calculate_paid_percent(balance.paid, balance.total);

    Ok(OrderReport {
        order,
        provider,
        items,
        payments,
        balance,
        paid_percent,
    })
}

/// Summarizes what is owed across all unpaid orders as of `today`.
pub async fn summarize_payables(
    db: &DatabaseConnection,
    today: NaiveDate,
    settings: &Settings,
) -> Result<PayablesSummary> {
    let mut summary = PayablesSummary::default();

    for order in list_unpaid_orders(db).await? {
        let payments = get_payments_for_order(db, order.id).await?;
        let balance = reconciliation::reconcile(&order, &payments, today, settings.due_soon_days);

        summary.open_orders += 1;
        summary.total_outstanding += balance.remaining;
        match balance.status {
            PaymentStatus::Overdue => summary.overdue += balance.remaining,
            PaymentStatus::DueSoon => summary.due_soon += balance.remaining,
            PaymentStatus::Partial => summary.partial += balance.remaining,
            PaymentStatus::Pending => summary.pending += balance.remaining,
            PaymentStatus::Paid => {}
        }
        if matches!(balance.status, PaymentStatus::Overdue | PaymentStatus::DueSoon) {
            summary.attention.push((order, balance));
        }
    }

    summary.total_outstanding = reconciliation::round_currency(summary.total_outstanding);
    summary
        .attention
        .sort_by_key(|(_, balance)| balance.days_until_due.unwrap_or(i64::MAX));
    Ok(summary)
}

/// Share of `total` covered by `paid`, as a percentage.
#[must_use]
pub fn calculate_paid_percent(paid: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 100.0;
    }

    ((paid / total) * 100.0).clamp(0.0, 100.0)
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // clamped_progress is in [0, 100] and length is small, so the result is in [0, length]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.1}%")
}

/// Formats an amount the way invoices in Chile print it: dots between
/// thousands, a comma before cents, cents only when non-zero.
///
/// `format_currency(1_234_567.5, "$")` gives `"$1.234.567,50"`.
#[must_use]
pub fn format_currency(amount: f64, symbol: &str) -> String {
    // Amounts handled here are far below 2^53 cents
    #[allow(clippy::cast_possible_truncation)]
    let cents = (amount.abs() * 100.0).round() as i64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    if fraction == 0 {
        format!("{sign}{symbol}{grouped}")
    } else {
        format!("{sign}{symbol}{grouped},{fraction:02}")
    }
}
