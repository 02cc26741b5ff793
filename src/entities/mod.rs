//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod notification;
pub mod payment;
pub mod product;
pub mod product_type;
pub mod provider;
pub mod purchase_order;
pub mod purchase_order_item;
pub mod warehouse;

// Re-export specific types to avoid conflicts
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
    NotificationPriority, NotificationStatus, NotificationType,
};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel, PaymentMethod};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel, StorageType};
pub use product_type::{
    Column as ProductTypeColumn, Entity as ProductType, Model as ProductTypeModel,
};
pub use provider::{Column as ProviderColumn, Entity as Provider, Model as ProviderModel};
pub use purchase_order::{
    Column as PurchaseOrderColumn, Entity as PurchaseOrder, Model as PurchaseOrderModel,
    OrderPaymentStatus, OrderStatus,
};
pub use purchase_order_item::{
    Column as PurchaseOrderItemColumn, Entity as PurchaseOrderItem,
    Model as PurchaseOrderItemModel,
};
pub use warehouse::{Column as WarehouseColumn, Entity as Warehouse, Model as WarehouseModel};
