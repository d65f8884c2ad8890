//! Sales order entity - An order header placed for a customer.
//!
//! The customer name and email are a snapshot taken when the order is written,
//! so renaming the customer later never rewrites history. `total_amount` is
//! derived from the line items whenever the order has any.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle of a sales order. Any status may be set to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalesOrderStatus {
    /// Accepted, not yet worked on
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Being picked and packed
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    /// Handed to the carrier
    #[sea_orm(string_value = "SHIPPED")]
    Shipped,
    /// Received by the customer
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    /// Abandoned
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl SalesOrderStatus {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for SalesOrderStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PROCESSING" => Ok(Self::Processing),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(crate::errors::Error::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Sales order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order number, unique per owner
    pub order_number: String,
    /// Optional live reference to the customer record
    pub customer_id: Option<i64>,
    /// Customer name at the time the order was written
    pub customer_name: String,
    /// Customer email at the time the order was written
    pub customer_email: Option<String>,
    /// Flat tax percentage applied to the line subtotal (0 to 100)
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    /// Flat tax added on top of the line subtotal
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_amount: Decimal,
    /// Order total (line subtotal plus tax, or caller supplied when there are no lines)
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Current status
    pub status: SalesOrderStatus,
    /// Business date of the order
    pub order_date: DateTimeUtc,
    /// Free-form notes
    pub notes: Option<String>,
    /// Owning user
    pub user_id: i64,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `SalesOrder` and other entities
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
    /// Each order may reference one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_delete = "SetNull"
    )]
    Customer,
    /// One order has many line items
    #[sea_orm(has_many = "super::sales_order_item::Entity")]
    Items,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::sales_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
