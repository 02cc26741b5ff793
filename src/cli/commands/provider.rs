//! Provider commands - list, add, edit and delete.

use crate::{
    cli::{AppContext, format, lookup},
    core::provider::{self, ProviderInput, split_list},
    errors::Result,
};
use clap::Subcommand;

/// Provider subcommands.
#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// List active providers
    List,
    /// Register a provider
    Add {
        /// Business name
        #[arg(long)]
        name: String,
        /// Tax identifier (RUT)
        #[arg(long)]
        tax_id: String,
        /// Contact person
        #[arg(long)]
        contact: Option<String>,
        /// Phone number (repeatable)
        #[arg(long = "phone")]
        phones: Vec<String>,
        /// Email address (repeatable)
        #[arg(long = "email")]
        emails: Vec<String>,
        /// Credit days (default from settings)
        #[arg(long)]
        terms: Option<i32>,
        /// Contract conditions
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a provider; omitted fields keep their value
    Edit {
        /// Provider id, tax id or name
        provider: String,
        /// New business name
        #[arg(long)]
        name: Option<String>,
        /// New tax identifier
        #[arg(long)]
        tax_id: Option<String>,
        /// New contact person
        #[arg(long)]
        contact: Option<String>,
        /// Comma-separated phone list, replaces the current one
        #[arg(long)]
        phones: Option<String>,
        /// Comma-separated email list, replaces the current one
        #[arg(long)]
        emails: Option<String>,
        /// New credit days
        #[arg(long)]
        terms: Option<i32>,
        /// New contract conditions
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a provider (its orders are kept)
    Delete {
        /// Provider id, tax id or name
        provider: String,
    },
}

/// Runs a provider subcommand.
pub async fn run(ctx: &AppContext, command: ProviderCommand) -> Result<String> {
    let db = &ctx.database;
    match command {
        ProviderCommand::List => {
            let providers = ctx.providers.get_or_load(db).await?;
            if providers.is_empty() {
                return Ok("📋 No hay proveedores registrados.".to_string());
            }
            let rows: Vec<Vec<String>> = providers
                .iter()
                .map(|p| {
                    vec![
                        p.id.to_string(),
                        p.name.clone(),
                        p.tax_id.clone(),
                        format::text_or_dash(p.contact_name.as_deref()),
                        format::text_or_dash(Some(p.phone_list().join(", ").as_str())),
                        format!("{} días", p.payment_terms_days),
                    ]
                })
                .collect();
            Ok(format::table(
                &["ID", "Nombre", "RUT", "Contacto", "Teléfonos", "Crédito"],
                &rows,
            ))
        }
        ProviderCommand::Add {
            name,
            tax_id,
            contact,
            phones,
            emails,
            terms,
            notes,
        } => {
            let input = ProviderInput {
                name,
                tax_id,
                contact_name: contact,
                phones,
                emails,
                payment_terms_days: terms
                    .unwrap_or(ctx.settings().default_payment_terms_days),
                contract_notes: notes,
            };
            let created = ctx
                .providers
                .mutate(db, provider::create_provider(db, input))
                .await?;
            Ok(format!(
                "✅ Proveedor '{}' registrado (ID: {})",
                created.name, created.id
            ))
        }
        ProviderCommand::Edit {
            provider: reference,
            name,
            tax_id,
            contact,
            phones,
            emails,
            terms,
            notes,
        } => {
            let existing = lookup::resolve_provider(ctx, &reference).await?;
            let input = ProviderInput {
                name: name.unwrap_or_else(|| existing.name.clone()),
                tax_id: tax_id.unwrap_or_else(|| existing.tax_id.clone()),
                contact_name: contact.or_else(|| existing.contact_name.clone()),
                phones: phones.map_or_else(|| existing.phone_list(), |p| split_list(&p)),
                emails: emails.map_or_else(|| existing.email_list(), |e| split_list(&e)),
                payment_terms_days: terms.unwrap_or(existing.payment_terms_days),
                contract_notes: notes.or_else(|| existing.contract_notes.clone()),
            };
            let updated = ctx
                .providers
                .mutate(db, provider::update_provider(db, existing.id, input))
                .await?;
            Ok(format!("✅ Proveedor '{}' actualizado", updated.name))
        }
        ProviderCommand::Delete {
            provider: reference,
        } => {
            let existing = lookup::resolve_provider(ctx, &reference).await?;
            ctx.providers
                .mutate(db, provider::delete_provider(db, existing.id))
                .await?;
            Ok(format!("🗑️ Proveedor '{}' eliminado", existing.name))
        }
    }
}
