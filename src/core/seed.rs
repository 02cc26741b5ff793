//! Catalog seeding from the `[[providers]]`, `[[product_types]]`,
//! `[[products]]` and `[[warehouses]]` arrays of `config.toml`.
//!
//! Seeding is idempotent: entries that already exist (providers by tax id,
//! product types and warehouses by name, products by code) are skipped, so
//! the command can be rerun after the catalog file grows.

use crate::{
    config::app::{AppConfig, ProductSeed, ProviderSeed},
    core::{
        product::{NewProduct, create_product, get_product_by_code},
        product_type::{create_product_type, get_product_type_by_name},
        provider::{ProviderInput, create_provider, get_provider_by_tax_id},
        warehouse::{create_warehouse, get_warehouse_by_name},
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument};

/// Rows inserted and skipped by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Providers inserted
    pub providers_created: usize,
    /// Product types inserted
    pub product_types_created: usize,
    /// Products inserted
    pub products_created: usize,
    /// Warehouses inserted
    pub warehouses_created: usize,
    /// Entries already present in the database
    pub skipped: usize,
}

impl SeedReport {
    /// Total rows inserted.
    #[must_use]
    pub const fn created(&self) -> usize {
        self.providers_created
            + self.product_types_created
            + self.products_created
            + self.warehouses_created
    }
}

fn provider_from_seed(seed: &ProviderSeed, default_terms: i32) -> ProviderInput {
    ProviderInput {
        name: seed.name.clone(),
        tax_id: seed.tax_id.clone(),
        contact_name: seed.contact_name.clone(),
        phones: seed.phones.clone(),
        emails: seed.emails.clone(),
        payment_terms_days: seed.payment_terms_days.unwrap_or(default_terms),
        contract_notes: seed.contract_notes.clone(),
    }
}

async fn product_from_seed(db: &DatabaseConnection, seed: &ProductSeed) -> Result<NewProduct> {
    let product_type_id = match seed.product_type.as_deref() {
        Some(type_name) => Some(
            get_product_type_by_name(db, type_name)
                .await?
                .ok_or_else(|| Error::Config {
                    message: format!(
                        "Product '{}' references unknown product type '{type_name}'",
                        seed.code
                    ),
                })?
                .id,
        ),
        None => None,
    };

    Ok(NewProduct {
        name: seed.name.clone(),
        code: seed.code.clone(),
        unit: seed.unit.clone(),
        product_type_id,
        storage_type: seed.storage_type,
        expiry_control: seed.expiry_control,
        min_stock: seed.min_stock,
    })
}

/// Inserts every catalog entry from `config` that is not in the database yet.
///
/// Product types are seeded before products so products can refer to them
/// by name.
///
/// # Errors
/// Returns [`Error::Config`] if a product names a product type that exists
/// neither in the database nor in the catalog, and any validation or database
/// error raised while inserting.
#[instrument(skip(db, config))]
pub async fn seed_catalog(db: &DatabaseConnection, config: &AppConfig) -> Result<SeedReport> {
    info!(
        "Seeding catalog: {} providers, {} product types, {} products, {} warehouses",
        config.providers.len(),
        config.product_types.len(),
        config.products.len(),
        config.warehouses.len()
    );
    let mut report = SeedReport::default();

    for seed in &config.providers {
        if get_provider_by_tax_id(db, &seed.tax_id).await?.is_some() {
            debug!("Provider {} already exists. Skipping.", seed.tax_id);
            report.skipped += 1;
            continue;
        }
        let input = provider_from_seed(seed, config.settings.default_payment_terms_days);
        create_provider(db, input).await?;
        report.providers_created += 1;
    }

    for seed in &config.product_types {
        if get_product_type_by_name(db, &seed.name).await?.is_some() {
            debug!("Product type '{}' already exists. Skipping.", seed.name);
            report.skipped += 1;
            continue;
        }
        create_product_type(db, seed.name.clone(), seed.description.clone()).await?;
        report.product_types_created += 1;
    }

    for seed in &config.products {
        if get_product_by_code(db, seed.code.trim()).await?.is_some() {
            debug!("Product {} already exists. Skipping.", seed.code);
            report.skipped += 1;
            continue;
        }
        let input = product_from_seed(db, seed).await?;
        create_product(db, input).await?;
        report.products_created += 1;
    }

    for seed in &config.warehouses {
        if get_warehouse_by_name(db, &seed.name).await?.is_some() {
            debug!("Warehouse '{}' already exists. Skipping.", seed.name);
            report.skipped += 1;
            continue;
        }
        create_warehouse(db, seed.name.clone(), seed.location.clone()).await?;
        report.warehouses_created += 1;
    }

    info!(
        "Seeding finished: {} created, {} skipped",
        report.created(),
        report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::app::parse_config;
    use crate::core::{
        product::get_all_active_products, provider::get_all_active_providers,
        warehouse::get_all_active_warehouses,
    };
    use crate::test_utils::*;

    const CATALOG: &str = r#"
[settings]
default_payment_terms_days = 45

[[providers]]
name = "Lechería del Sur"
tax_id = "76.123.456-7"
phones = ["+56 9 1111 2222"]
payment_terms_days = 30

[[providers]]
name = "Envases Andinos"
tax_id = "77.987.654-3"

[[product_types]]
name = "Materia prima"

[[products]]
name = "Leche cruda"
code = "MP-001"
unit = "litro"
product_type = "Materia prima"
storage_type = "bulk"
min_stock = 5000.0

[[products]]
name = "Cuajo"
code = "MP-002"
unit = "kg"
storage_type = "batch"
expiry_control = true

[[warehouses]]
name = "Bodega central"
location = "Osorno"
"#;

    #[tokio::test]
    async fn test_seed_catalog() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(CATALOG)?;

        let report = seed_catalog(&db, &config).await?;
        assert_eq!(report.providers_created, 2);
        assert_eq!(report.product_types_created, 1);
        assert_eq!(report.products_created, 2);
        assert_eq!(report.warehouses_created, 1);
        assert_eq!(report.skipped, 0);

        let providers = get_all_active_providers(&db).await?;
        let envases = providers.iter().find(|p| p.tax_id == "77.987.654-3").unwrap();
        assert_eq!(envases.payment_terms_days, 45);

        let products = get_all_active_products(&db).await?;
        let leche = products.iter().find(|p| p.code == "MP-001").unwrap();
        assert!(leche.product_type_id.is_some());
        assert_eq!(get_all_active_warehouses(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(CATALOG)?;

        seed_catalog(&db, &config).await?;
        let second = seed_catalog(&db, &config).await?;

        assert_eq!(second.created(), 0);
        assert_eq!(second.skipped, 6);
        assert_eq!(get_all_active_providers(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_rejects_unknown_product_type() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(
            r#"
[[products]]
name = "Sal"
code = "IN-001"
unit = "kg"
product_type = "Insumos"
storage_type = "bulk"
"#,
        )?;

        let result = seed_catalog(&db, &config).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }
}
