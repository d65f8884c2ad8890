//! Purchase order entity - An order header placed with a supplier.
//!
//! Like sales orders, the supplier name and email are snapshotted. An order is
//! overdue when `expected_delivery` has passed and it has not been received.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle of a purchase order. Any status may be set to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    /// Drafted, awaiting approval
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Approved and sent to the supplier
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Goods received
    #[sea_orm(string_value = "RECEIVED")]
    Received,
    /// Abandoned
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl PurchaseOrderStatus {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Received => "RECEIVED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for PurchaseOrderStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "RECEIVED" => Ok(Self::Received),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(crate::errors::Error::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Purchase order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// PO number, unique per owner
    pub po_number: String,
    /// Optional live reference to the supplier record
    pub supplier_id: Option<i64>,
    /// Supplier name at the time the order was written
    pub supplier_name: String,
    /// Supplier email at the time the order was written
    pub supplier_email: Option<String>,
    /// Order total (line subtotal, or caller supplied when there are no lines)
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Current status
    pub status: PurchaseOrderStatus,
    /// Business date of the order
    pub order_date: DateTimeUtc,
    /// When the goods are due
    pub expected_delivery: DateTimeUtc,
    /// Free-form notes
    pub notes: Option<String>,
    /// Owning user
    pub user_id: i64,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `PurchaseOrder` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each order may reference one supplier
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_delete = "SetNull"
    )]
    Supplier,
    /// One order has many line items
    #[sea_orm(has_many = "super::purchase_order_item::Entity")]
    Items,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::purchase_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
