//! Provider business logic - CRUD over the `providers` table.
//!
//! Providers are looked up by id or tax id. Deleting a provider is
//! unconditional: no check is made for purchase orders that reference it, and
//! the row is only flagged as deleted so those orders keep resolving.

use crate::{
    entities::{Provider, provider},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Input for creating or editing a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderInput {
    /// Business name
    pub name: String,
    /// Tax identifier (RUT)
    pub tax_id: String,
    /// Contact person
    pub contact_name: Option<String>,
    /// Phone numbers
    pub phones: Vec<String>,
    /// Email addresses
    pub emails: Vec<String>,
    /// Credit days granted by the contract
    pub payment_terms_days: i32,
    /// Contract conditions
    pub contract_notes: Option<String>,
}

/// Joins list entries into the stored comma-separated form, dropping blanks.
#[must_use]
pub fn join_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a stored comma-separated list.
#[must_use]
pub fn split_list(stored: &str) -> Vec<String> {
    stored
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl provider::Model {
    /// Phone numbers as a list.
    #[must_use]
    pub fn phone_list(&self) -> Vec<String> {
        split_list(&self.phones)
    }

    /// Email addresses as a list.
    #[must_use]
    pub fn email_list(&self) -> Vec<String> {
        split_list(&self.emails)
    }
}

fn validate(input: &ProviderInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Provider name cannot be empty".to_string(),
        });
    }
    if input.tax_id.trim().is_empty() {
        return Err(Error::Validation {
            message: "Provider tax id cannot be empty".to_string(),
        });
    }
    if input.payment_terms_days < 0 {
        return Err(Error::Validation {
            message: format!(
                "Payment terms cannot be negative, got {} days",
                input.payment_terms_days
            ),
        });
    }
    if let Some(email) = input.emails.iter().find(|e| !e.trim().is_empty() && !e.contains('@')) {
        return Err(Error::Validation {
            message: format!("Invalid email address: {email}"),
        });
    }
    Ok(())
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Retrieves all active providers, ordered alphabetically by name.
pub async fn get_all_active_providers(db: &DatabaseConnection) -> Result<Vec<provider::Model>> {
    Provider::find()
        .filter(provider::Column::IsDeleted.eq(false))
        .order_by_asc(provider::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a provider by id. Deleted providers are still returned so that
/// historic orders can show who they were placed with.
pub async fn get_provider_by_id<C>(db: &C, provider_id: i64) -> Result<Option<provider::Model>>
where
    C: ConnectionTrait,
{
    Provider::find_by_id(provider_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active provider by tax id.
pub async fn get_provider_by_tax_id(
    db: &DatabaseConnection,
    tax_id: &str,
) -> Result<Option<provider::Model>> {
    Provider::find()
        .filter(provider::Column::TaxId.eq(tax_id.trim()))
        .filter(provider::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a provider after validating the input.
///
/// # Errors
/// Returns [`Error::Validation`] for an empty name or tax id, negative credit
/// days or a malformed email, and a database error if the insert fails.
pub async fn create_provider(
    db: &DatabaseConnection,
    input: ProviderInput,
) -> Result<provider::Model> {
    validate(&input)?;

    let now = chrono::Utc::now().naive_utc();
    let provider = provider::ActiveModel {
        name: Set(input.name.trim().to_string()),
        tax_id: Set(input.tax_id.trim().to_string()),
        contact_name: Set(normalize(input.contact_name)),
        phones: Set(join_list(&input.phones)),
        emails: Set(join_list(&input.emails)),
        payment_terms_days: Set(input.payment_terms_days),
        contract_notes: Set(normalize(input.contract_notes)),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = provider.insert(db).await?;
    info!("Created provider {} ({})", result.name, result.id);
    Ok(result)
}

/// Replaces every editable field of a provider.
pub async fn update_provider(
    db: &DatabaseConnection,
    provider_id: i64,
    input: ProviderInput,
) -> Result<provider::Model> {
    validate(&input)?;

    let existing = Provider::find_by_id(provider_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::ProviderNotFound { id: provider_id })?;

    let mut active: provider::ActiveModel = existing.into();
    active.name = Set(input.name.trim().to_string());
    active.tax_id = Set(input.tax_id.trim().to_string());
    active.contact_name = Set(normalize(input.contact_name));
    active.phones = Set(join_list(&input.phones));
    active.emails = Set(join_list(&input.emails));
    active.payment_terms_days = Set(input.payment_terms_days);
    active.contract_notes = Set(normalize(input.contract_notes));
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    active.update(db).await.map_err(Into::into)
}

/// Deletes a provider without checking for referencing orders.
pub async fn delete_provider(db: &DatabaseConnection, provider_id: i64) -> Result<()> {
    let existing = Provider::find_by_id(provider_id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted)
        .ok_or(Error::ProviderNotFound { id: provider_id })?;

    let name = existing.name.clone();
    let mut active: provider::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await?;

    info!("Deleted provider {name} ({provider_id})");
    Ok(())
}
