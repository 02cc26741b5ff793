//! Notification business logic.
//!
//! Notifications are plain records classified by type, priority and read
//! state. Besides manual creation they are produced by order status changes
//! and by [`sync_payment_notifications`], which scans unpaid orders for
//! deadlines that are near or already past.

use crate::{
    config::app::Settings,
    core::{
        payment::get_payments_for_order,
        purchase_order::list_unpaid_orders,
        reconciliation::{self, PaymentStatus},
        report::format_currency,
    },
    entities::{
        Notification, NotificationPriority, NotificationStatus, NotificationType, notification,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{debug, info};

/// Input for creating a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Classification
    pub notification_type: NotificationType,
    /// Urgency
    pub priority: NotificationPriority,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Related order, if any
    pub purchase_order_id: Option<i64>,
}

/// Creates an unread notification.
///
/// Generic over the connection so it can run inside another operation's
/// transaction.
pub async fn create_notification<C>(db: &C, input: NewNotification) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    if input.title.trim().is_empty() {
        return Err(Error::Validation {
            message: "Notification title cannot be empty".to_string(),
        });
    }

    let notification = notification::ActiveModel {
        notification_type: Set(input.notification_type),
        priority: Set(input.priority),
        status: Set(NotificationStatus::Unread),
        title: Set(input.title.trim().to_string()),
        message: Set(input.message),
        purchase_order_id: Set(input.purchase_order_id),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };
    notification.insert(db).await.map_err(Into::into)
}

/// Lists notifications newest first.
///
/// With no status filter, archived notifications are left out.
pub async fn list_notifications(
    db: &DatabaseConnection,
    status: Option<NotificationStatus>,
) -> Result<Vec<notification::Model>> {
    let query = match status {
        Some(status) => Notification::find().filter(notification::Column::Status.eq(status)),
        None => Notification::find()
            .filter(notification::Column::Status.ne(NotificationStatus::Archived)),
    };
    query
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of unread notifications.
pub async fn unread_count(db: &DatabaseConnection) -> Result<u64> {
    Notification::find()
        .filter(notification::Column::Status.eq(NotificationStatus::Unread))
        .count(db)
        .await
        .map_err(Into::into)
}

async fn set_status(
    db: &DatabaseConnection,
    notification_id: i64,
    status: NotificationStatus,
) -> Result<notification::Model> {
    let existing = Notification::find_by_id(notification_id)
        .one(db)
        .await?
        .ok_or(Error::NotificationNotFound {
            id: notification_id,
        })?;

    let mut active: notification::ActiveModel = existing.into();
    active.status = Set(status);
    active.update(db).await.map_err(Into::into)
}

/// Marks one notification as read.
pub async fn mark_read(
    db: &DatabaseConnection,
    notification_id: i64,
) -> Result<notification::Model> {
    set_status(db, notification_id, NotificationStatus::Read).await
}

/// Archives one notification.
pub async fn archive(db: &DatabaseConnection, notification_id: i64) -> Result<notification::Model> {
    set_status(db, notification_id, NotificationStatus::Archived).await
}

/// Marks every unread notification as read, returning how many changed.
pub async fn mark_all_read(db: &DatabaseConnection) -> Result<u64> {
    let result = Notification::update_many()
        .col_expr(
            notification::Column::Status,
            Expr::value(NotificationStatus::Read.to_value()),
        )
        .filter(notification::Column::Status.eq(NotificationStatus::Unread))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Deletes a notification.
pub async fn delete_notification(db: &DatabaseConnection, notification_id: i64) -> Result<()> {
    let result = Notification::delete_by_id(notification_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotificationNotFound {
            id: notification_id,
        });
    }
    Ok(())
}

fn deadline_notification(
    order_number: &str,
    order_id: i64,
    remaining: f64,
    days_until_due: i64,
    status: PaymentStatus,
    settings: &Settings,
) -> Option<NewNotification> {
    let amount = format_currency(remaining, &settings.currency_symbol);
    match status {
        PaymentStatus::Overdue => Some(NewNotification {
            notification_type: NotificationType::PaymentDue,
            priority: NotificationPriority::High,
            title: format!("Pago vencido: {order_number}"),
            message: format!(
                "Saldo pendiente {amount}, venció hace {} días",
                days_until_due.abs()
            ),
            purchase_order_id: Some(order_id),
        }),
        PaymentStatus::DueSoon => Some(NewNotification {
            notification_type: NotificationType::PaymentDue,
            priority: NotificationPriority::Medium,
            title: format!("Pago por vencer: {order_number}"),
            message: format!("Saldo pendiente {amount}, vence en {days_until_due} días"),
            purchase_order_id: Some(order_id),
        }),
        PaymentStatus::Paid | PaymentStatus::Partial | PaymentStatus::Pending => None,
    }
}

async fn has_open_deadline_notification(
    db: &DatabaseConnection,
    order_id: i64,
    priority: NotificationPriority,
) -> Result<bool> {
    let existing = Notification::find()
        .filter(notification::Column::PurchaseOrderId.eq(order_id))
        .filter(notification::Column::NotificationType.eq(NotificationType::PaymentDue))
        .filter(notification::Column::Priority.eq(priority))
        .filter(notification::Column::Status.ne(NotificationStatus::Archived))
        .count(db)
        .await?;
    Ok(existing > 0)
}

/// Creates payment-deadline notifications for unpaid orders.
///
/// Orders labelled `Overdue` get a high-priority notification and orders
/// labelled `DueSoon` a medium-priority one. An order that already has a
/// non-archived deadline notification of the same priority is skipped.
/// Returns the notifications created.
pub async fn sync_payment_notifications(
    db: &DatabaseConnection,
    today: NaiveDate,
    settings: &Settings,
) -> Result<Vec<notification::Model>> {
    let mut created = Vec::new();

    for order in list_unpaid_orders(db).await? {
        let payments = get_payments_for_order(db, order.id).await?;
        let balance = reconciliation::reconcile(&order, &payments, today, settings.due_soon_days);
        let Some(days) = balance.days_until_due else {
            continue;
        };
        let Some(input) = deadline_notification(
            &order.order_number,
            order.id,
            balance.remaining,
            days,
            balance.status,
            settings,
        ) else {
            continue;
        };

        if has_open_deadline_notification(db, order.id, input.priority).await? {
            debug!("Deadline notification for {} already open", order.order_number);
            continue;
        }
        created.push(create_notification(db, input).await?);
    }

    info!("Created {} payment deadline notifications", created.len());
    Ok(created)
}
