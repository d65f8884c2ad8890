//! Entity module - Contains all SeaORM entity definitions for the database.
//! Every tenant-owned table carries a `user_id` column referencing `users.id`;
//! that column is the sole authorization boundary in the system.

pub mod customer;
pub mod inventory_item;
pub mod purchase_order;
pub mod purchase_order_item;
pub mod sales_order;
pub mod sales_order_item;
pub mod supplier;
pub mod user;

// Re-export specific types to avoid conflicts
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use inventory_item::{
    Column as InventoryItemColumn, Entity as InventoryItem, Model as InventoryItemModel,
};
pub use purchase_order::{
    Column as PurchaseOrderColumn, Entity as PurchaseOrder, Model as PurchaseOrderModel,
    PurchaseOrderStatus,
};
pub use purchase_order_item::{
    Column as PurchaseOrderItemColumn, Entity as PurchaseOrderItem,
    Model as PurchaseOrderItemModel,
};
pub use sales_order::{
    Column as SalesOrderColumn, Entity as SalesOrder, Model as SalesOrderModel, SalesOrderStatus,
};
pub use sales_order_item::{
    Column as SalesOrderItemColumn, Entity as SalesOrderItem, Model as SalesOrderItemModel,
};
pub use supplier::{Column as SupplierColumn, Entity as Supplier, Model as SupplierModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
