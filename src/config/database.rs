//! Database configuration module.
//!
//! This module handles the backend connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL. It also provides the row-count query used
//! by the `verify` command as a connectivity smoke test.

use crate::config::backend::BackendConfig;
use crate::entities::{
    Notification, Payment, Product, ProductType, Provider, PurchaseOrder, PurchaseOrderItem,
    Warehouse,
};
use crate::errors::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    Schema,
};
use tracing::{debug, info};

/// Opens a connection to the backend described by `config`.
pub async fn create_connection(config: &BackendConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.connection_url());
    options.sqlx_logging(false);
    info!("Connecting to backend at {}", config.url());
    Database::connect(options).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet.
///
/// Parents are created before children so foreign keys resolve: providers and
/// product types first, then products, orders, order lines and payments.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = vec![
        schema.create_table_from_entity(Provider),
        schema.create_table_from_entity(ProductType),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(Warehouse),
        schema.create_table_from_entity(PurchaseOrder),
        schema.create_table_from_entity(PurchaseOrderItem),
        schema.create_table_from_entity(Payment),
        schema.create_table_from_entity(Notification),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(&*statement)).await?;
    }

    debug!("Ensured {} tables exist", statements.len());
    Ok(())
}

/// Row count for one table, as reported by [`table_row_counts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    /// Table name
    pub table: &'static str,
    /// Number of rows
    pub rows: u64,
}

/// Counts the rows of every table. Fails if any table is unreachable.
pub async fn table_row_counts(db: &DatabaseConnection) -> Result<Vec<TableCount>> {
    Ok(vec![
        TableCount {
            table: "providers",
            rows: Provider::find().count(db).await?,
        },
        TableCount {
            table: "product_types",
            rows: ProductType::find().count(db).await?,
        },
        TableCount {
            table: "products",
            rows: Product::find().count(db).await?,
        },
        TableCount {
            table: "warehouses",
            rows: Warehouse::find().count(db).await?,
        },
        TableCount {
            table: "purchase_orders",
            rows: PurchaseOrder::find().count(db).await?,
        },
        TableCount {
            table: "purchase_order_items",
            rows: PurchaseOrderItem::find().count(db).await?,
        },
        TableCount {
            table: "payments",
            rows: Payment::find().count(db).await?,
        },
        TableCount {
            table: "notifications",
            rows: Notification::find().count(db).await?,
        },
    ])
}
