//! Dashboard reporting.
//!
//! Every figure is computed fresh from current storage on each call; nothing
//! is cached. Money sums are done in `Decimal` after loading the rows so the
//! result does not depend on how a backend aggregates decimals.

use crate::{
    core::pricing,
    entities::{
        InventoryItem, PurchaseOrder, PurchaseOrderStatus, SalesOrder, SalesOrderStatus,
        inventory_item, purchase_order, sales_order,
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::instrument;

/// Per-tenant summary shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Number of catalog items
    pub inventory_items: u64,
    /// Items at or below their reorder level
    pub low_stock_items: u64,
    /// Sum of `quantity * unit_price` over the catalog
    #[serde(with = "rust_decimal::serde::float")]
    pub inventory_value: Decimal,
    /// Number of sales orders in any status
    pub sales_orders: u64,
    /// Number of purchase orders in any status
    pub purchase_orders: u64,
    /// Sum of sales order totals, excluding cancelled orders
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    /// Sum of purchase order totals, excluding cancelled orders
    #[serde(with = "rust_decimal::serde::float")]
    pub spend: Decimal,
    /// Sales orders still `PENDING`
    pub pending_sales_orders: u64,
    /// Purchase orders still `PENDING`
    pub pending_purchase_orders: u64,
    /// Purchase orders past their expected delivery and not yet received
    pub overdue_purchase_orders: u64,
}

/// Builds the dashboard summary for `user_id` as of `now`.
#[instrument(skip(db))]
pub async fn dashboard(
    db: &DatabaseConnection,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<DashboardSummary> {
    let items = InventoryItem::find()
        .filter(inventory_item::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    let low_stock_items = InventoryItem::find()
        .filter(inventory_item::Column::UserId.eq(user_id))
        .filter(
            Expr::col(inventory_item::Column::Quantity)
                .lte(Expr::col(inventory_item::Column::ReorderLevel)),
        )
        .count(db)
        .await?;
    let inventory_value = pricing::subtotal(items.iter().map(|i| (i.quantity, i.unit_price)))?;

    let sales = SalesOrder::find()
        .filter(sales_order::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    let revenue = pricing::checked_sum(
        sales
            .iter()
            .filter(|o| o.status != SalesOrderStatus::Cancelled)
            .map(|o| o.total_amount),
    )?;
    let pending_sales_orders = sales
        .iter()
        .filter(|o| o.status == SalesOrderStatus::Pending)
        .count();

    let purchases = PurchaseOrder::find()
        .filter(purchase_order::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    let spend = pricing::checked_sum(
        purchases
            .iter()
            .filter(|o| o.status != PurchaseOrderStatus::Cancelled)
            .map(|o| o.total_amount),
    )?;
    let pending_purchase_orders = purchases
        .iter()
        .filter(|o| o.status == PurchaseOrderStatus::Pending)
        .count();
    let overdue_purchase_orders = purchases
        .iter()
        .filter(|o| o.status != PurchaseOrderStatus::Received && o.expected_delivery < now)
        .count();

    Ok(DashboardSummary {
        inventory_items: items.len() as u64,
        low_stock_items,
        inventory_value,
        sales_orders: sales.len() as u64,
        purchase_orders: purchases.len() as u64,
        revenue,
        spend,
        pending_sales_orders: pending_sales_orders as u64,
        pending_purchase_orders: pending_purchase_orders as u64,
        overdue_purchase_orders: overdue_purchase_orders as u64,
    })
}
