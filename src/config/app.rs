//! Application settings and seed catalog loaded from `config.toml`.
//!
//! The `[settings]` table tunes the reconciliation rules (tax rate, "due soon"
//! window, default credit days). The `[[providers]]`, `[[product_types]]`,
//! `[[products]]` and `[[warehouses]]` arrays describe the catalog that the
//! `seed` command inserts into an empty database.

use crate::entities::StorageType;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_VAR: &str = "LACTEO_CONFIG";
/// Config file used when nothing else is specified
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Entire contents of `config.toml`
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Business rule settings
    #[serde(default)]
    pub settings: Settings,
    /// Providers to seed
    #[serde(default)]
    pub providers: Vec<ProviderSeed>,
    /// Product types to seed
    #[serde(default)]
    pub product_types: Vec<ProductTypeSeed>,
    /// Products to seed
    #[serde(default)]
    pub products: Vec<ProductSeed>,
    /// Warehouses to seed
    #[serde(default)]
    pub warehouses: Vec<WarehouseSeed>,
}

/// Tunables for totals and payment status labels
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tax applied over an order subtotal (IVA)
    pub tax_rate: f64,
    /// An unpaid order is "due soon" when this many days or fewer remain
    pub due_soon_days: i64,
    /// Credit days used when a provider has none configured
    pub default_payment_terms_days: i32,
    /// Symbol printed in front of amounts
    pub currency_symbol: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tax_rate: 0.19,
            due_soon_days: 7,
            default_payment_terms_days: 30,
            currency_symbol: "$".to_string(),
        }
    }
}

/// Provider entry in the seed catalog
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSeed {
    /// Business name
    pub name: String,
    /// Tax identifier, used to detect already-seeded providers
    pub tax_id: String,
    /// Contact person
    #[serde(default)]
    pub contact_name: Option<String>,
    /// Phone numbers
    #[serde(default)]
    pub phones: Vec<String>,
    /// Email addresses
    #[serde(default)]
    pub emails: Vec<String>,
    /// Credit days
    #[serde(default)]
    pub payment_terms_days: Option<i32>,
    /// Contract conditions
    #[serde(default)]
    pub contract_notes: Option<String>,
}

/// Product type entry in the seed catalog
#[derive(Debug, Clone, Deserialize)]
pub struct ProductTypeSeed {
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Product entry in the seed catalog
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    /// Product name
    pub name: String,
    /// Product code, used to detect already-seeded products
    pub code: String,
    /// Unit of measure
    pub unit: String,
    /// Name of a product type from the same catalog
    #[serde(default)]
    pub product_type: Option<String>,
    /// Storage strategy
    pub storage_type: StorageType,
    /// Whether expiry is tracked
    #[serde(default)]
    pub expiry_control: bool,
    /// Minimum stock
    #[serde(default)]
    pub min_stock: f64,
}

/// Warehouse entry in the seed catalog
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseSeed {
    /// Warehouse name
    pub name: String,
    /// Location
    #[serde(default)]
    pub location: Option<String>,
}

/// Parses the configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    validate_settings(&config.settings)?;
    Ok(config)
}

/// Loads the configuration from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A setting is out of range
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads the configuration, falling back to defaults when the file is absent.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        load_config(path_ref)
    } else {
        warn!(
            "Config file {} not found, using default settings and an empty catalog",
            path_ref.display()
        );
        Ok(AppConfig::default())
    }
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if !settings.tax_rate.is_finite() || settings.tax_rate < 0.0 {
        return Err(Error::Config {
            message: format!("tax_rate must be a non-negative number, got {}", settings.tax_rate),
        });
    }
    if settings.due_soon_days < 0 {
        return Err(Error::Config {
            message: format!("due_soon_days must not be negative, got {}", settings.due_soon_days),
        });
    }
    if settings.default_payment_terms_days < 0 {
        return Err(Error::Config {
            message: format!(
                "default_payment_terms_days must not be negative, got {}",
                settings.default_payment_terms_days
            ),
        });
    }
    Ok(())
}
