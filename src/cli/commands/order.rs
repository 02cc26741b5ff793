//! Purchase order commands - list, show, create, edit, advance, set-items,
//! delete and the accounts-payable summary.

use crate::{
    cli::{
        AppContext, format,
        lookup::{self, ItemArg},
    },
    core::{
        payment::get_order_balance,
        purchase_order::{self, NewPurchaseOrder, OrderDetailsUpdate},
        report::{format_progress_bar, generate_order_report, summarize_payables},
    },
    entities::OrderStatus,
    errors::Result,
};
use chrono::NaiveDate;
use clap::Subcommand;
use std::fmt::Write;

/// Purchase order subcommands.
#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// List orders with their balance
    List {
        /// Only orders in this status (pre_order, issued, received, paid)
        #[arg(long)]
        status: Option<OrderStatus>,
        /// Only orders placed with this provider (id, tax id or name)
        #[arg(long)]
        provider: Option<String>,
    },
    /// Show one order with items, payments and balance
    Show {
        /// Order id or number
        order: String,
    },
    /// Create a pre-order
    Create {
        /// Provider id, tax id or name
        #[arg(long)]
        provider: String,
        /// Order line as PRODUCT:QUANTITY:UNIT_COST (repeatable)
        #[arg(long = "item", required = true)]
        items: Vec<ItemArg>,
        /// Order date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Expected delivery date
        #[arg(long)]
        delivery: Option<NaiveDate>,
        /// Payment due date (default: order date plus provider credit days)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change dates or notes of an order
    Edit {
        /// Order id or number
        order: String,
        /// New expected delivery date
        #[arg(long)]
        delivery: Option<NaiveDate>,
        /// New payment due date
        #[arg(long)]
        due: Option<NaiveDate>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move an order to its next status
    Advance {
        /// Order id or number
        order: String,
    },
    /// Replace the items of a pre-order
    SetItems {
        /// Order id or number
        order: String,
        /// Order line as PRODUCT:QUANTITY:UNIT_COST (repeatable)
        #[arg(long = "item", required = true)]
        items: Vec<ItemArg>,
    },
    /// Delete an order with its items and payments
    Delete {
        /// Order id or number
        order: String,
    },
    /// Outstanding balances across unpaid orders
    Summary,
}

/// Runs an order subcommand.
pub async fn run(ctx: &AppContext, command: OrderCommand) -> Result<String> {
    let db = &ctx.database;
    match command {
        OrderCommand::List { status, provider } => list(ctx, status, provider).await,
        OrderCommand::Show { order } => show(ctx, &order).await,
        OrderCommand::Create {
            provider,
            items,
            date,
            delivery,
            due,
            notes,
        } => {
            let provider = lookup::resolve_provider(ctx, &provider).await?;
            let items = lookup::resolve_items(ctx, &items).await?;
            let input = NewPurchaseOrder {
                provider_id: provider.id,
                order_date: date.unwrap_or(ctx.today),
                expected_delivery_date: delivery,
                payment_due_date: due,
                notes,
                items,
            };
            let order = purchase_order::create_purchase_order(db, input, ctx.settings()).await?;
            Ok(format!(
                "✅ Orden {} creada para {}: total {}, vence {}",
                order.order_number,
                provider.name,
                format::money(order.total, ctx.settings()),
                format::date_or_dash(order.payment_due_date)
            ))
        }
        OrderCommand::Edit {
            order,
            delivery,
            due,
            notes,
        } => {
            let order = lookup::resolve_order(ctx, &order).await?;
            let update = OrderDetailsUpdate {
                expected_delivery_date: delivery,
                payment_due_date: due,
                notes,
            };
            let updated = purchase_order::update_order_details(db, order.id, update).await?;
            Ok(format!("✅ Orden {} actualizada", updated.order_number))
        }
        OrderCommand::Advance { order } => {
            let order = lookup::resolve_order(ctx, &order).await?;
            let updated = purchase_order::advance_order_status(db, order.id).await?;
            Ok(format!(
                "✅ Orden {}: {} → {}",
                updated.order_number,
                order.status.label_es(),
                updated.status.label_es()
            ))
        }
        OrderCommand::SetItems { order, items } => {
            let order = lookup::resolve_order(ctx, &order).await?;
            let items = lookup::resolve_items(ctx, &items).await?;
            let updated =
                purchase_order::replace_order_items(db, order.id, items, ctx.settings()).await?;
            Ok(format!(
                "✅ Orden {}: nuevo total {}",
                updated.order_number,
                format::money(updated.total, ctx.settings())
            ))
        }
        OrderCommand::Delete { order } => {
            let order = lookup::resolve_order(ctx, &order).await?;
            purchase_order::delete_order(db, order.id).await?;
            Ok(format!("🗑️ Orden {} eliminada", order.order_number))
        }
        OrderCommand::Summary => summary(ctx).await,
    }
}

async fn list(
    ctx: &AppContext,
    status: Option<OrderStatus>,
    provider: Option<String>,
) -> Result<String> {
    let db = &ctx.database;
    let orders = match provider {
        Some(reference) => {
            let provider = lookup::resolve_provider(ctx, &reference).await?;
            purchase_order::list_orders_for_provider(db, provider.id)
                .await?
                .into_iter()
                .filter(|o| status.is_none_or(|s| o.status == s))
                .collect()
        }
        None => purchase_order::list_orders(db, status).await?,
    };
    if orders.is_empty() {
        return Ok("📋 No hay órdenes de compra.".to_string());
    }

    let mut rows = Vec::with_capacity(orders.len());
    for order in &orders {
        let balance = get_order_balance(db, order.id, ctx.today, ctx.settings()).await?;
        rows.push(vec![
            order.order_number.clone(),
            lookup::provider_name(ctx, order.provider_id).await?,
            format::date_or_dash(Some(order.order_date)),
            order.status.label_es().to_string(),
            format::money(order.total, ctx.settings()),
            format::money(balance.remaining, ctx.settings()),
            format::date_or_dash(order.payment_due_date),
            balance.status.label_es().to_string(),
        ]);
    }
    Ok(format::table(
        &[
            "Número",
            "Proveedor",
            "Fecha",
            "Estado",
            "Total",
            "Saldo",
            "Vencimiento",
            "Pago",
        ],
        &rows,
    ))
}

async fn show(ctx: &AppContext, reference: &str) -> Result<String> {
    let order = lookup::resolve_order(ctx, reference).await?;
    let report = generate_order_report(&ctx.database, order.id, ctx.today, ctx.settings()).await?;
    let settings = ctx.settings();
    let mut out = String::new();

    writeln!(
        out,
        "📦 Orden {} - {}",
        report.order.order_number,
        report.order.status.label_es()
    )?;
    writeln!(
        out,
        "Proveedor: {} ({})",
        report.provider.name, report.provider.tax_id
    )?;
    writeln!(
        out,
        "Fecha: {}  Entrega: {}  Vencimiento: {}",
        format::date_or_dash(Some(report.order.order_date)),
        format::date_or_dash(report.order.expected_delivery_date),
        format::date_or_dash(report.order.payment_due_date)
    )?;
    if let Some(notes) = &report.order.notes {
        writeln!(out, "Notas: {notes}")?;
    }

    let mut item_rows = Vec::with_capacity(report.items.len());
    for item in &report.items {
        item_rows.push(vec![
            lookup::product_label(ctx, item.product_id).await?,
            format::quantity(item.quantity),
            format::money(item.unit_cost, settings),
            format::money(item.subtotal, settings),
        ]);
    }
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        format::table(&["Producto", "Cantidad", "Costo unit.", "Subtotal"], &item_rows)
    )?;
    writeln!(out)?;
    writeln!(out, "Subtotal: {}", format::money(report.order.subtotal, settings))?;
    writeln!(out, "IVA:      {}", format::money(report.order.tax, settings))?;
    writeln!(out, "Total:    {}", format::money(report.order.total, settings))?;

    if !report.payments.is_empty() {
        let payment_rows: Vec<Vec<String>> = report
            .payments
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    format::date_or_dash(Some(p.payment_date)),
                    p.method.to_string(),
                    format::text_or_dash(p.reference.as_deref()),
                    format::money(p.amount, settings),
                ]
            })
            .collect();
        writeln!(out)?;
        writeln!(
            out,
            "{}",
            format::table(&["ID", "Fecha", "Medio", "Referencia", "Monto"], &payment_rows)
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Pagado: {}  Saldo: {}  Estado: {}",
        format::money(report.balance.paid, settings),
        format::money(report.balance.remaining, settings),
        report.balance.status.label_es()
    )?;
    write!(out, "{}", format_progress_bar(report.paid_percent, Some(20)))?;
    Ok(out)
}

async fn summary(ctx: &AppContext) -> Result<String> {
    let settings = ctx.settings();
    let summary = summarize_payables(&ctx.database, ctx.today, settings).await?;
    if summary.open_orders == 0 {
        return Ok("✅ No hay órdenes con saldo pendiente.".to_string());
    }

    let mut out = String::new();
    writeln!(
        out,
        "💰 Cuentas por pagar al {}: {} en {} órdenes",
        format::date_or_dash(Some(ctx.today)),
        format::money(summary.total_outstanding, settings),
        summary.open_orders
    )?;
    writeln!(out, "  Vencido:    {}", format::money(summary.overdue, settings))?;
    writeln!(out, "  Por vencer: {}", format::money(summary.due_soon, settings))?;
    writeln!(out, "  Parcial:    {}", format::money(summary.partial, settings))?;
    write!(out, "  Pendiente:  {}", format::money(summary.pending, settings))?;

    if !summary.attention.is_empty() {
        let mut rows = Vec::with_capacity(summary.attention.len());
        for (order, balance) in &summary.attention {
            rows.push(vec![
                order.order_number.clone(),
                lookup::provider_name(ctx, order.provider_id).await?,
                format::date_or_dash(order.payment_due_date),
                balance.status.label_es().to_string(),
                format::money(balance.remaining, settings),
            ]);
        }
        write!(
            out,
            "\n\n⚠️ Requieren atención\n{}",
            format::table(&["Número", "Proveedor", "Vencimiento", "Estado", "Saldo"], &rows)
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{run_args, test_context};
    use crate::errors::Error;
    use crate::test_utils::*;

    async fn context_with_catalog() -> Result<AppContext> {
        let ctx = test_context().await?;
        create_test_provider(&ctx.database, "Lechería del Sur").await?;
        create_test_product(&ctx.database, "Leche cruda", "LC-001").await?;
        create_test_product(&ctx.database, "Cuajo", "CJ-001").await?;
        Ok(ctx)
    }

    #[tokio::test]
    async fn test_create_and_show_order() -> Result<()> {
        let ctx = context_with_catalog().await?;

        let created = run_args(
            &ctx,
            &[
                "order",
                "create",
                "--provider",
                "Sur",
                "--item",
                "LC-001:1000:450",
                "--item",
                "CJ-001:2:25000",
                "--date",
                "2024-01-10",
            ],
        )
        .await?;
        assert!(created.contains("Orden OC-00001 creada para Lechería del Sur"));
        assert!(created.contains("total $500.000"));
        assert!(created.contains("vence 09-02-2024"));

        let shown = run_args(&ctx, &["order", "show", "OC-00001"]).await?;
        assert!(shown.contains("Pre-orden"));
        assert!(shown.contains("LC-001 Leche cruda"));
        assert!(shown.contains("$450.000"));
        assert!(shown.contains("Estado: Pendiente"));
        assert!(shown.contains("0.0%"));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_defaults_to_today() -> Result<()> {
        let ctx = context_with_catalog().await?;
        run_args(&ctx, &["order", "create", "--provider", "1", "--item", "1:1:100"]).await?;

        let order = purchase_order::get_order_by_number(&ctx.database, "OC-00001").await?;
        let order = order.ok_or(Error::OrderNotFound { id: 1 })?;
        assert_eq!(order.order_date, ctx.today);
        Ok(())
    }

    #[tokio::test]
    async fn test_order_lifecycle_commands() -> Result<()> {
        let ctx = context_with_catalog().await?;
        run_args(
            &ctx,
            &["order", "create", "--provider", "Sur", "--item", "LC-001:10:100"],
        )
        .await?;

        let replaced =
            run_args(&ctx, &["order", "set-items", "1", "--item", "CJ-001:3:100"]).await?;
        assert!(replaced.contains("nuevo total $300"));

        let edited =
            run_args(&ctx, &["order", "edit", "OC-00001", "--notes", "Urgente"]).await?;
        assert!(edited.contains("actualizada"));

        let advanced = run_args(&ctx, &["order", "advance", "OC-00001"]).await?;
        assert!(advanced.contains("Pre-orden → Emitida"));

        let locked = run_args(&ctx, &["order", "set-items", "1", "--item", "CJ-001:1:1"]).await;
        assert!(matches!(locked, Err(Error::OrderLocked { .. })));

        let listed = run_args(&ctx, &["order", "list", "--status", "issued"]).await?;
        assert!(listed.contains("OC-00001"));
        assert!(listed.contains("Emitida"));
        assert!(
            run_args(&ctx, &["order", "list", "--status", "paid"])
                .await?
                .contains("No hay órdenes")
        );
        assert!(
            run_args(&ctx, &["order", "list", "--provider", "Sur"])
                .await?
                .contains("OC-00001")
        );

        run_args(&ctx, &["order", "delete", "OC-00001"]).await?;
        assert!(run_args(&ctx, &["order", "list"]).await?.contains("No hay órdenes"));
        Ok(())
    }

    #[tokio::test]
    async fn test_payables_summary() -> Result<()> {
        let ctx = context_with_catalog().await?;
        assert!(run_args(&ctx, &["order", "summary"]).await?.contains("No hay órdenes"));

        // Today is 2024-02-01
        run_args(
            &ctx,
            &[
                "order", "create", "--provider", "1", "--item", "1:1:1000", "--date", "2024-01-01",
                "--due", "2024-01-25",
            ],
        )
        .await?;
        run_args(
            &ctx,
            &["order", "create", "--provider", "1", "--item", "1:1:2000", "--due", "2024-06-01"],
        )
        .await?;

        let summary = run_args(&ctx, &["order", "summary"]).await?;
        assert!(summary.contains("$3.000 en 2 órdenes"));
        assert!(summary.contains("Vencido:    $1.000"));
        assert!(summary.contains("Pendiente:  $2.000"));
        assert!(summary.contains("Requieren atención"));
        assert!(summary.contains("OC-00001"));
        assert!(!summary.contains("OC-00002"));
        Ok(())
    }
}
