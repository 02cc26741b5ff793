//! Administrative commands - `init`, `verify` and `seed`.

use crate::{
    cli::{AppContext, format},
    config::database::{TableCount, create_tables, table_row_counts},
    core::seed::seed_catalog,
    errors::Result,
};
use tracing::info;

fn counts_table(counts: &[TableCount]) -> String {
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|c| vec![c.table.to_string(), c.rows.to_string()])
        .collect();
    format::table(&["Tabla", "Filas"], &rows)
}

/// Creates any missing tables and prints the resulting row counts.
pub async fn init(ctx: &AppContext) -> Result<String> {
    create_tables(&ctx.database).await?;
    let counts = table_row_counts(&ctx.database).await?;
    info!("Database schema ready");
    Ok(format!("✅ Tablas listas\n{}", counts_table(&counts)))
}

/// Reads every table once. Any failure propagates, so the process exits 1.
pub async fn verify(ctx: &AppContext) -> Result<String> {
    let counts = table_row_counts(&ctx.database).await?;
    Ok(format!(
        "✅ Conexión verificada ({} tablas)\n{}",
        counts.len(),
        counts_table(&counts)
    ))
}

/// Seeds the catalog from the config file.
pub async fn seed(ctx: &AppContext) -> Result<String> {
    let report = seed_catalog(&ctx.database, &ctx.config).await?;
    ctx.providers.invalidate().await;
    ctx.products.invalidate().await;

    Ok(format!(
        "✅ Catálogo cargado: {} proveedores, {} tipos de producto, {} productos, {} bodegas ({} ya existían)",
        report.providers_created,
        report.product_types_created,
        report.products_created,
        report.warehouses_created,
        report.skipped
    ))
}
