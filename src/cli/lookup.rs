//! Resolution of the references users type on the command line.
//!
//! Providers may be given by id, tax id or name; products by id or code;
//! orders by id or order number. Provider and product lookups go through the
//! context caches so a command resolving several references reads each table
//! once.

use crate::{
    cli::AppContext,
    core::{
        product::get_product_by_id,
        provider::get_provider_by_id,
        purchase_order::{NewOrderItem, get_order_by_id, get_order_by_number},
    },
    entities::{ProductModel, ProviderModel, purchase_order},
    errors::{Error, Result},
};
use std::str::FromStr;

/// Resolves an active provider by id, tax id, exact name, or a name fragment
/// that matches exactly one provider.
pub async fn resolve_provider(ctx: &AppContext, reference: &str) -> Result<ProviderModel> {
    let reference = reference.trim();
    let providers = ctx.providers.get_or_load(&ctx.database).await?;

    if let Ok(id) = reference.parse::<i64>() {
        return providers
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(Error::ProviderNotFound { id });
    }

    let needle = reference.to_lowercase();
    if let Some(exact) = providers
        .iter()
        .find(|p| p.tax_id.eq_ignore_ascii_case(reference) || p.name.to_lowercase() == needle)
    {
        return Ok(exact.clone());
    }

    let mut partial: Vec<ProviderModel> = providers
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect();
    match partial.len() {
        1 => Ok(partial.remove(0)),
        0 => Err(Error::Validation {
            message: format!("No provider matches '{reference}'"),
        }),
        n => Err(Error::Validation {
            message: format!("'{reference}' matches {n} providers, use the id or tax id"),
        }),
    }
}

/// Resolves an active product by code or id.
///
/// A code match wins over an id, so numeric codes such as `001` resolve to
/// their product.
pub async fn resolve_product(ctx: &AppContext, reference: &str) -> Result<ProductModel> {
    let reference = reference.trim();
    let products = ctx.products.get_or_load(&ctx.database).await?;

    if let Some(product) = products
        .iter()
        .find(|p| p.code.eq_ignore_ascii_case(reference))
    {
        return Ok(product.clone());
    }

    match reference.parse::<i64>() {
        Ok(id) => products
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(Error::ProductNotFound { id }),
        Err(_) => Err(Error::Validation {
            message: format!("No product with code '{reference}'"),
        }),
    }
}

/// Resolves an order by id or order number.
pub async fn resolve_order(ctx: &AppContext, reference: &str) -> Result<purchase_order::Model> {
    let reference = reference.trim();
    if let Ok(id) = reference.parse::<i64>() {
        return get_order_by_id(&ctx.database, id)
            .await?
            .ok_or(Error::OrderNotFound { id });
    }
    get_order_by_number(&ctx.database, reference)
        .await?
        .ok_or_else(|| Error::Validation {
            message: format!("No purchase order numbered '{reference}'"),
        })
}

/// Display name of a provider, including soft-deleted ones.
pub async fn provider_name(ctx: &AppContext, provider_id: i64) -> Result<String> {
    if let Some(provider) = ctx.providers.find_by_id(&ctx.database, provider_id).await? {
        return Ok(provider.name);
    }
    Ok(get_provider_by_id(&ctx.database, provider_id)
        .await?
        .map_or_else(|| format!("#{provider_id}"), |p| p.name))
}

/// Code and name of a product, including soft-deleted ones.
pub async fn product_label(ctx: &AppContext, product_id: i64) -> Result<String> {
    let product = match ctx.products.find_by_id(&ctx.database, product_id).await? {
        Some(product) => Some(product),
        None => get_product_by_id(&ctx.database, product_id).await?,
    };
    Ok(product.map_or_else(
        || format!("#{product_id}"),
        |p| format!("{} {}", p.code, p.name),
    ))
}

/// One `--item` argument: `PRODUCT:QUANTITY:UNIT_COST`, where `PRODUCT` is a
/// product id or code.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemArg {
    /// Product id or code
    pub product: String,
    /// Quantity ordered
    pub quantity: f64,
    /// Cost per unit
    pub unit_cost: f64,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(cost), Some(quantity), Some(product)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("Expected PRODUCT:QUANTITY:UNIT_COST, got '{s}'"));
        };
        if product.trim().is_empty() {
            return Err(format!("Missing product in '{s}'"));
        }
        let quantity = quantity
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("Invalid quantity '{quantity}': {e}"))?;
        let unit_cost = cost
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("Invalid unit cost '{cost}': {e}"))?;

        Ok(Self {
            product: product.trim().to_string(),
            quantity,
            unit_cost,
        })
    }
}

/// Resolves the products of `--item` arguments into order lines.
pub async fn resolve_items(ctx: &AppContext, items: &[ItemArg]) -> Result<Vec<NewOrderItem>> {
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let product = resolve_product(ctx, &item.product).await?;
        resolved.push(NewOrderItem {
            product_id: product.id,
            quantity: item.quantity,
            unit_cost: item.unit_cost,
        });
    }
    Ok(resolved)
}
