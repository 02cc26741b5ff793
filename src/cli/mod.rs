//! Command-line layer - argument parsing, shared context and dispatch.
//!
//! Every command handler returns the text to print. The binary writes it to
//! stdout and maps an `Err` to exit code 1.

/// Command implementations grouped by entity
pub mod commands;
/// Table and value formatting
pub mod format;
/// Resolution of user-supplied references (ids, names, codes, order numbers)
pub mod lookup;

use crate::{
    config::app::{AppConfig, DEFAULT_CONFIG_PATH, Settings},
    core::sync::CachedCollection,
    entities::{ProductModel, ProviderModel},
    errors::Result,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;

/// Procurement and payments administration for a dairy business.
#[derive(Parser, Debug)]
#[command(name = "lacteo-admin", version, about)]
pub struct Cli {
    /// Path to the settings and seed catalog file
    #[arg(long, global = true, env = "LACTEO_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Reference date for due-date calculations (YYYY-MM-DD, default: today)
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database tables
    Init,
    /// Check that every table is reachable and print row counts
    Verify,
    /// Insert the catalog from the config file (skips existing entries)
    Seed,
    /// Manage providers
    Provider {
        #[command(subcommand)]
        action: commands::provider::ProviderCommand,
    },
    /// Manage product types
    #[command(name = "product-type")]
    ProductType {
        #[command(subcommand)]
        action: commands::catalog::ProductTypeCommand,
    },
    /// Manage products
    Product {
        #[command(subcommand)]
        action: commands::catalog::ProductCommand,
    },
    /// Manage warehouses
    Warehouse {
        #[command(subcommand)]
        action: commands::catalog::WarehouseCommand,
    },
    /// Purchase orders
    Order {
        #[command(subcommand)]
        action: commands::order::OrderCommand,
    },
    /// Payments against purchase orders
    Payment {
        #[command(subcommand)]
        action: commands::payment::PaymentCommand,
    },
    /// Notifications
    Notification {
        #[command(subcommand)]
        action: commands::notification::NotificationCommand,
    },
}

impl Command {
    /// Whether tables should be created before the command runs.
    ///
    /// `verify` checks the schema as it is, and `init` creates it itself.
    #[must_use]
    pub const fn ensures_schema(&self) -> bool {
        !matches!(self, Self::Init | Self::Verify)
    }
}

/// Shared state available to every command.
pub struct AppContext {
    /// Database connection for all operations
    pub database: DatabaseConnection,
    /// Settings and seed catalog
    pub config: AppConfig,
    /// Reference date for due-date calculations
    pub today: NaiveDate,
    /// Active providers, used to resolve names
    pub providers: CachedCollection<ProviderModel>,
    /// Active products, used to resolve codes
    pub products: CachedCollection<ProductModel>,
}

impl AppContext {
    /// Creates a context with empty caches.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: AppConfig, today: NaiveDate) -> Self {
        Self {
            database,
            config,
            today,
            providers: CachedCollection::new(),
            products: CachedCollection::new(),
        }
    }

    /// Business rule settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.config.settings
    }
}

/// Runs one command and returns its output.
pub async fn run(ctx: &AppContext, command: Command) -> Result<String> {
    match command {
        Command::Init => commands::admin::init(ctx).await,
        Command::Verify => commands::admin::verify(ctx).await,
        Command::Seed => commands::admin::seed(ctx).await,
        Command::Provider { action } => commands::provider::run(ctx, action).await,
        Command::ProductType { action } => commands::catalog::run_product_type(ctx, action).await,
        Command::Product { action } => commands::catalog::run_product(ctx, action).await,
        Command::Warehouse { action } => commands::catalog::run_warehouse(ctx, action).await,
        Command::Order { action } => commands::order::run(ctx, action).await,
        Command::Payment { action } => commands::payment::run(ctx, action).await,
        Command::Notification { action } => commands::notification::run(ctx, action).await,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{AppContext, Cli, run};
    use crate::{config::app::AppConfig, errors::Result, test_utils::*};
    use clap::Parser;

    /// Context over a fresh in-memory database, dated 2024-02-01, without tax.
    pub async fn test_context() -> Result<AppContext> {
        let db = setup_test_db().await?;
        let config = AppConfig {
            settings: test_settings(),
            ..AppConfig::default()
        };
        Ok(AppContext::new(db, config, date(2024, 2, 1)))
    }

    /// Parses `args` as a command line and runs it.
    ///
    /// # Panics
    /// Panics if the arguments do not parse.
    #[allow(clippy::unwrap_used)]
    pub async fn run_args(ctx: &AppContext, args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("lacteo-admin").chain(args.iter().copied()))
            .unwrap();
        run(ctx, cli.command).await
    }
}
