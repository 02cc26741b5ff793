//! Notification commands - inbox listing, read state and deadline checks.

use crate::{
    cli::{AppContext, format},
    core::notification,
    entities::NotificationStatus,
    errors::Result,
};
use clap::Subcommand;

/// Notification subcommands.
#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    /// List notifications (archived ones only with --status archived)
    List {
        /// unread, read or archived
        #[arg(long)]
        status: Option<NotificationStatus>,
    },
    /// Mark a notification as read
    Read {
        /// Notification id
        id: i64,
    },
    /// Mark every unread notification as read
    ReadAll,
    /// Archive a notification
    Archive {
        /// Notification id
        id: i64,
    },
    /// Delete a notification
    Delete {
        /// Notification id
        id: i64,
    },
    /// Create notifications for overdue and soon-due unpaid orders
    CheckDue,
}

/// Runs a notification subcommand.
pub async fn run(ctx: &AppContext, command: NotificationCommand) -> Result<String> {
    let db = &ctx.database;
    match command {
        NotificationCommand::List { status } => {
            let notifications = notification::list_notifications(db, status).await?;
            let unread = notification::unread_count(db).await?;
            if notifications.is_empty() {
                return Ok(format!("🔔 Sin notificaciones ({unread} sin leer)"));
            }
            let rows: Vec<Vec<String>> = notifications
                .iter()
                .map(|n| {
                    vec![
                        n.id.to_string(),
                        n.created_at.format("%d-%m-%Y %H:%M").to_string(),
                        n.priority.to_string(),
                        n.status.to_string(),
                        n.title.clone(),
                        n.message.clone(),
                    ]
                })
                .collect();
            Ok(format!(
                "🔔 {unread} sin leer\n{}",
                format::table(
                    &["ID", "Fecha", "Prioridad", "Estado", "Título", "Mensaje"],
                    &rows
                )
            ))
        }
        NotificationCommand::Read { id } => {
            let read = notification::mark_read(db, id).await?;
            Ok(format!("✅ Notificación '{}' leída", read.title))
        }
        NotificationCommand::ReadAll => {
            let changed = notification::mark_all_read(db).await?;
            Ok(format!("✅ {changed} notificaciones marcadas como leídas"))
        }
        NotificationCommand::Archive { id } => {
            let archived = notification::archive(db, id).await?;
            Ok(format!("📥 Notificación '{}' archivada", archived.title))
        }
        NotificationCommand::Delete { id } => {
            notification::delete_notification(db, id).await?;
            Ok(format!("🗑️ Notificación {id} eliminada"))
        }
        NotificationCommand::CheckDue => {
            let created =
                notification::sync_payment_notifications(db, ctx.today, ctx.settings()).await?;
            if created.is_empty() {
                return Ok("✅ Sin pagos vencidos ni por vencer nuevos".to_string());
            }
            let mut out = format!("⚠️ {} avisos de pago creados", created.len());
            for n in &created {
                out.push_str(&format!("\n  [{}] {} - {}", n.priority, n.title, n.message));
            }
            Ok(out)
        }
    }
}
