//! Payment commands - list, record and delete.

use crate::{
    cli::{AppContext, format, lookup},
    core::{
        payment::{self, NewPayment},
        purchase_order::get_order_by_id,
    },
    entities::PaymentMethod,
    errors::Result,
};
use chrono::NaiveDate;
use clap::Subcommand;

/// Payment subcommands.
#[derive(Subcommand, Debug)]
pub enum PaymentCommand {
    /// List payments, newest first
    List {
        /// Only payments of this order (id or number)
        #[arg(long)]
        order: Option<String>,
    },
    /// Record a payment against an order
    Record {
        /// Order id or number
        #[arg(long)]
        order: String,
        /// Amount paid
        #[arg(long)]
        amount: f64,
        /// cash, transfer, check or card
        #[arg(long, default_value = "transfer")]
        method: PaymentMethod,
        /// Payment date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Bank reference or check number
        #[arg(long)]
        reference: Option<String>,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
        /// File name of the scanned receipt
        #[arg(long)]
        receipt: Option<String>,
    },
    /// Delete a payment
    Delete {
        /// Payment id
        id: i64,
    },
}

/// Runs a payment subcommand.
pub async fn run(ctx: &AppContext, command: PaymentCommand) -> Result<String> {
    let db = &ctx.database;
    let settings = ctx.settings();
    match command {
        PaymentCommand::List { order } => {
            let payments = match order {
                Some(reference) => {
                    let order = lookup::resolve_order(ctx, &reference).await?;
                    let mut payments = payment::get_payments_for_order(db, order.id).await?;
                    payments.reverse();
                    payments
                }
                None => payment::list_payments(db).await?,
            };
            if payments.is_empty() {
                return Ok("📋 No hay pagos registrados.".to_string());
            }

            let mut rows = Vec::with_capacity(payments.len());
            for p in &payments {
                let order_number = get_order_by_id(db, p.purchase_order_id)
                    .await?
                    .map_or_else(|| format!("#{}", p.purchase_order_id), |o| o.order_number);
                rows.push(vec![
                    p.id.to_string(),
                    order_number,
                    format::date_or_dash(Some(p.payment_date)),
                    p.method.to_string(),
                    format::text_or_dash(p.reference.as_deref()),
                    format::money(p.amount, settings),
                ]);
            }
            Ok(format::table(
                &["ID", "Orden", "Fecha", "Medio", "Referencia", "Monto"],
                &rows,
            ))
        }
        PaymentCommand::Record {
            order,
            amount,
            method,
            date,
            reference,
            description,
            receipt,
        } => {
            let order = lookup::resolve_order(ctx, &order).await?;
            let input = NewPayment {
                purchase_order_id: order.id,
                amount,
                payment_date: date.unwrap_or(ctx.today),
                method,
                reference,
                description,
                receipt_filename: receipt,
            };
            let recorded = payment::record_payment(db, input).await?;
            let balance = payment::get_order_balance(db, order.id, ctx.today, settings).await?;
            Ok(format!(
                "✅ Pago de {} registrado en {} (ID: {}). Saldo: {} ({})",
                format::money(recorded.amount, settings),
                order.order_number,
                recorded.id,
                format::money(balance.remaining, settings),
                balance.status.label_es()
            ))
        }
        PaymentCommand::Delete { id } => {
            payment::delete_payment(db, id).await?;
            Ok(format!("🗑️ Pago {id} eliminado"))
        }
    }
}
