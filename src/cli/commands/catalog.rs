//! Catalog commands - product types, products and warehouses.

use crate::{
    cli::{AppContext, format, lookup},
    core::{
        product::{self, NewProduct},
        product_type, warehouse,
    },
    entities::StorageType,
    errors::{Error, Result},
};
use clap::Subcommand;
use std::collections::HashMap;

/// Product type subcommands.
#[derive(Subcommand, Debug)]
pub enum ProductTypeCommand {
    /// List product types
    List,
    /// Add a product type
    Add {
        /// Display name
        #[arg(long)]
        name: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },
}

/// Product subcommands.
#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// List active products
    List,
    /// Add a product
    Add {
        /// Product name
        #[arg(long)]
        name: String,
        /// Unique product code
        #[arg(long)]
        code: String,
        /// Unit of measure (kg, litro, unidad...)
        #[arg(long)]
        unit: String,
        /// Product type name
        #[arg(long = "type")]
        product_type: Option<String>,
        /// Storage strategy: bulk or batch
        #[arg(long, default_value = "batch")]
        storage: StorageType,
        /// Track expiry dates
        #[arg(long)]
        expiry: bool,
        /// Minimum stock
        #[arg(long, default_value_t = 0.0)]
        min_stock: f64,
    },
    /// Change the minimum stock of a product
    MinStock {
        /// Product id or code
        product: String,
        /// New minimum stock
        value: f64,
    },
    /// Delete a product (order lines keep their reference)
    Delete {
        /// Product id or code
        product: String,
    },
}

/// Warehouse subcommands.
#[derive(Subcommand, Debug)]
pub enum WarehouseCommand {
    /// List active warehouses
    List,
    /// Add a warehouse
    Add {
        /// Warehouse name
        #[arg(long)]
        name: String,
        /// Location
        #[arg(long)]
        location: Option<String>,
    },
    /// Delete a warehouse
    Delete {
        /// Warehouse id
        id: i64,
    },
}

/// Runs a product type subcommand.
pub async fn run_product_type(ctx: &AppContext, command: ProductTypeCommand) -> Result<String> {
    match command {
        ProductTypeCommand::List => {
            let types = product_type::get_all_product_types(&ctx.database).await?;
            if types.is_empty() {
                return Ok("📋 No hay tipos de producto.".to_string());
            }
            let rows: Vec<Vec<String>> = types
                .iter()
                .map(|t| {
                    vec![
                        t.id.to_string(),
                        t.name.clone(),
                        format::text_or_dash(t.description.as_deref()),
                    ]
                })
                .collect();
            Ok(format::table(&["ID", "Nombre", "Descripción"], &rows))
        }
        ProductTypeCommand::Add { name, description } => {
            let created =
                product_type::create_product_type(&ctx.database, name, description).await?;
            Ok(format!(
                "✅ Tipo de producto '{}' creado (ID: {})",
                created.name, created.id
            ))
        }
    }
}

/// Runs a product subcommand.
pub async fn run_product(ctx: &AppContext, command: ProductCommand) -> Result<String> {
    let db = &ctx.database;
    match command {
        ProductCommand::List => {
            let products = ctx.products.get_or_load(db).await?;
            if products.is_empty() {
                return Ok("📋 No hay productos registrados.".to_string());
            }
            let type_names: HashMap<i64, String> = product_type::get_all_product_types(db)
                .await?
                .into_iter()
                .map(|t| (t.id, t.name))
                .collect();
            let rows: Vec<Vec<String>> = products
                .iter()
                .map(|p| {
                    vec![
                        p.code.clone(),
                        p.name.clone(),
                        p.unit.clone(),
                        format::text_or_dash(
                            p.product_type_id
                                .and_then(|id| type_names.get(&id))
                                .map(String::as_str),
                        ),
                        p.storage_type.to_string(),
                        if p.expiry_control { "sí" } else { "no" }.to_string(),
                        format::quantity(p.min_stock),
                    ]
                })
                .collect();
            Ok(format::table(
                &["Código", "Nombre", "Unidad", "Tipo", "Almacenaje", "Vencimiento", "Stock mín."],
                &rows,
            ))
        }
        ProductCommand::Add {
            name,
            code,
            unit,
            product_type: type_name,
            storage,
            expiry,
            min_stock,
        } => {
            let product_type_id = match type_name {
                Some(type_name) => Some(
                    product_type::get_product_type_by_name(db, &type_name)
                        .await?
                        .ok_or_else(|| Error::Validation {
                            message: format!("Unknown product type '{type_name}'"),
                        })?
                        .id,
                ),
                None => None,
            };
            let input = NewProduct {
                name,
                code,
                unit,
                product_type_id,
                storage_type: storage,
                expiry_control: expiry,
                min_stock,
            };
            let created = ctx
                .products
                .mutate(db, product::create_product(db, input))
                .await?;
            Ok(format!(
                "✅ Producto {} '{}' creado (ID: {})",
                created.code, created.name, created.id
            ))
        }
        ProductCommand::MinStock {
            product: reference,
            value,
        } => {
            let existing = lookup::resolve_product(ctx, &reference).await?;
            let updated = ctx
                .products
                .mutate(db, product::update_min_stock(db, existing.id, value))
                .await?;
            Ok(format!(
                "✅ Stock mínimo de {} ahora es {} {}",
                updated.code,
                format::quantity(updated.min_stock),
                updated.unit
            ))
        }
        ProductCommand::Delete { product: reference } => {
            let existing = lookup::resolve_product(ctx, &reference).await?;
            ctx.products
                .mutate(db, product::delete_product(db, existing.id))
                .await?;
            Ok(format!("🗑️ Producto {} eliminado", existing.code))
        }
    }
}

/// Runs a warehouse subcommand.
pub async fn run_warehouse(ctx: &AppContext, command: WarehouseCommand) -> Result<String> {
    match command {
        WarehouseCommand::List => {
            let warehouses = warehouse::get_all_active_warehouses(&ctx.database).await?;
            if warehouses.is_empty() {
                return Ok("📋 No hay bodegas registradas.".to_string());
            }
            let rows: Vec<Vec<String>> = warehouses
                .iter()
                .map(|w| {
                    vec![
                        w.id.to_string(),
                        w.name.clone(),
                        format::text_or_dash(w.location.as_deref()),
                    ]
                })
                .collect();
            Ok(format::table(&["ID", "Nombre", "Ubicación"], &rows))
        }
        WarehouseCommand::Add { name, location } => {
            let created = warehouse::create_warehouse(&ctx.database, name, location).await?;
            Ok(format!("✅ Bodega '{}' creada (ID: {})", created.name, created.id))
        }
        WarehouseCommand::Delete { id } => {
            warehouse::delete_warehouse(&ctx.database, id).await?;
            Ok(format!("🗑️ Bodega {id} eliminada"))
        }
    }
}
