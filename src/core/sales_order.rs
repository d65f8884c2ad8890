//! Sales order business logic - orders placed by customers and the stock they consume.
//!
//! Creating an order writes the header, its lines, and the matching stock
//! decrements in one transaction: either the whole order lands and every line's
//! quantity leaves the shelf, or nothing changes. Replacing the lines of an
//! existing order first puts the old quantities back, then takes the new ones.
//! Cancelling or deleting an order does not restock.

use crate::{
    core::{
        customer, inventory, on_unique_violation,
        pricing::{self, OrderTotals},
        validation,
    },
    entities::{
        Customer, InventoryItem, SalesOrder, SalesOrderItem, SalesOrderStatus,
        customer as customer_entity, inventory_item, sales_order, sales_order_item,
    },
    errors::{Error, FieldError, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};
use validator::Validate;

const ENTITY: &str = "Sales order";

/// One requested line of a sales order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SalesLineInput {
    /// Catalog item being sold
    pub inventory_id: i64,
    /// Units sold, at least one
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: i32,
    /// Price per unit; defaults to the catalog price at order time
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "crate::core::validation::money"))]
    pub unit_price: Option<Decimal>,
}

/// Payload for creating a sales order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSalesOrder {
    /// Order number, unique per owner
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub order_number: String,
    /// Linked customer record
    #[serde(default)]
    pub customer_id: Option<i64>,
    /// Required unless `customer_id` is given
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Customer contact email
    #[serde(default)]
    #[validate(email)]
    pub customer_email: Option<String>,
    /// Only used when the order has no lines
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "crate::core::validation::money"))]
    pub total_amount: Option<Decimal>,
    /// Flat tax percentage applied to the line subtotal
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "crate::core::validation::percentage"))]
    pub tax_rate: Option<Decimal>,
    /// Defaults to `PENDING`
    #[serde(default)]
    pub status: Option<String>,
    /// Defaults to now
    #[serde(default, deserialize_with = "crate::core::validation::flexible_date::deserialize")]
    pub order_date: Option<DateTime<Utc>>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Order lines
    #[serde(default)]
    pub items: Vec<SalesLineInput>,
}

/// Partial update of a sales order. `items`, when present, replaces every line.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderPatch {
    /// Order number, unique per owner
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub order_number: Option<String>,
    /// Linked customer record
    pub customer_id: Option<i64>,
    /// Customer name shown on the order
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub customer_name: Option<String>,
    /// Customer contact email
    #[validate(email)]
    pub customer_email: Option<String>,
    /// Applies only when the order ends up with no lines
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "crate::core::validation::money"))]
    pub total_amount: Option<Decimal>,
    /// Flat tax percentage
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "crate::core::validation::percentage"))]
    pub tax_rate: Option<Decimal>,
    /// Status name such as `PENDING`
    pub status: Option<String>,
    /// New order date
    #[serde(default, deserialize_with = "crate::core::validation::flexible_date::deserialize")]
    pub order_date: Option<DateTime<Utc>>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Replacement lines
    pub items: Option<Vec<SalesLineInput>>,
}

/// A stored line together with the catalog item it refers to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderLine {
    /// The stored line
    #[serde(flatten)]
    pub item: sales_order_item::Model,
    /// Catalog item, if it still exists
    pub inventory: Option<inventory_item::Model>,
}

/// A sales order with its lines and customer, loaded eagerly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderDetail {
    /// Order header
    #[serde(flatten)]
    pub order: sales_order::Model,
    /// Order lines
    pub items: Vec<SalesOrderLine>,
    /// Linked customer, if any
    pub customer: Option<customer_entity::Model>,
}

/// Parses a status name such as `"SHIPPED"`.
///
/// # Errors
/// `InvalidStatus` for anything that is not a sales order status.
pub fn parse_status(raw: &str) -> Result<SalesOrderStatus> {
    raw.trim().parse()
}

/// A line whose price and item have been resolved against the catalog.
struct PricedLine {
    item: inventory_item::Model,
    quantity: i32,
    unit_price: Decimal,
}

async fn price_lines(
    txn: &DatabaseTransaction,
    user_id: i64,
    lines: Vec<SalesLineInput>,
) -> Result<Vec<PricedLine>> {
    let mut priced = Vec::with_capacity(lines.len());
    for line in lines {
        let item = inventory::get_item(txn, user_id, line.inventory_id).await?;
        let unit_price = line
            .unit_price
            .map_or(item.unit_price, validation::to_cents);
        priced.push(PricedLine {
            item,
            quantity: line.quantity,
            unit_price,
        });
    }
    Ok(priced)
}

/// Takes each line's quantity off the shelf, failing the whole batch on the
/// first line that would drive stock below zero.
async fn take_stock(txn: &DatabaseTransaction, user_id: i64, lines: &[PricedLine]) -> Result<()> {
    for line in lines {
        if !inventory::shift_stock(txn, user_id, line.item.id, -line.quantity).await? {
            let current = inventory::get_item(txn, user_id, line.item.id).await?;
            return Err(Error::InsufficientStock {
                sku: current.sku,
                available: current.quantity,
                requested: line.quantity,
            });
        }
    }
    Ok(())
}

async fn insert_lines(txn: &DatabaseTransaction, order_id: i64, lines: &[PricedLine]) -> Result<()> {
    for line in lines {
        sales_order_item::ActiveModel {
            sales_order_id: Set(order_id),
            inventory_id: Set(line.item.id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            total_price: Set(pricing::line_total(line.quantity, line.unit_price)?),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

fn totals_of(lines: &[PricedLine], tax_rate: Decimal) -> Result<OrderTotals> {
    OrderTotals::from_lines(
        lines.iter().map(|l| (l.quantity, l.unit_price)),
        Some(tax_rate),
    )
}

async fn order_number_taken(
    db: &DatabaseConnection,
    user_id: i64,
    order_number: &str,
    except_id: Option<i64>,
) -> Result<bool> {
    let mut query = SalesOrder::find()
        .filter(sales_order::Column::UserId.eq(user_id))
        .filter(sales_order::Column::OrderNumber.eq(order_number));
    if let Some(id) = except_id {
        query = query.filter(sales_order::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

/// Finds a sales order header owned by `user_id`.
pub async fn find_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
) -> Result<Option<sales_order::Model>> {
    SalesOrder::find_by_id(order_id)
        .filter(sales_order::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn get_header(db: &DatabaseConnection, user_id: i64, order_id: i64) -> Result<sales_order::Model> {
    find_order(db, user_id, order_id).await?.ok_or(Error::NotFound {
        entity: ENTITY,
        id: order_id,
    })
}

/// Loads lines, catalog items and customers for a batch of orders in three queries.
async fn hydrate(
    db: &DatabaseConnection,
    orders: Vec<sales_order::Model>,
) -> Result<Vec<SalesOrderDetail>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let lines = SalesOrderItem::find()
        .filter(sales_order_item::Column::SalesOrderId.is_in(order_ids))
        .order_by_asc(sales_order_item::Column::Id)
        .all(db)
        .await?;

    let mut inventory_ids: Vec<i64> = lines.iter().map(|l| l.inventory_id).collect();
    inventory_ids.sort_unstable();
    inventory_ids.dedup();
    let inventory: HashMap<i64, inventory_item::Model> = if inventory_ids.is_empty() {
        HashMap::new()
    } else {
        InventoryItem::find()
            .filter(inventory_item::Column::Id.is_in(inventory_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect()
    };

    let mut customer_ids: Vec<i64> = orders.iter().filter_map(|o| o.customer_id).collect();
    customer_ids.sort_unstable();
    customer_ids.dedup();
    let customers: HashMap<i64, customer_entity::Model> = if customer_ids.is_empty() {
        HashMap::new()
    } else {
        Customer::find()
            .filter(customer_entity::Column::Id.is_in(customer_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    };

    let mut by_order: HashMap<i64, Vec<SalesOrderLine>> = HashMap::new();
    for item in lines {
        let line = SalesOrderLine {
            inventory: inventory.get(&item.inventory_id).cloned(),
            item,
        };
        by_order.entry(line.item.sales_order_id).or_default().push(line);
    }

    Ok(orders
        .into_iter()
        .map(|order| SalesOrderDetail {
            items: by_order.remove(&order.id).unwrap_or_default(),
            customer: order.customer_id.and_then(|id| customers.get(&id).cloned()),
            order,
        })
        .collect())
}

/// Retrieves a sales order with its lines and customer.
///
/// # Errors
/// `NotFound` if the order is missing or owned by someone else.
pub async fn get_order(db: &DatabaseConnection, user_id: i64, order_id: i64) -> Result<SalesOrderDetail> {
    let header = get_header(db, user_id, order_id).await?;
    hydrate(db, vec![header])
        .await?
        .pop()
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: order_id,
        })
}

/// Creates a sales order, its lines, and the stock decrements atomically.
///
/// # Errors
/// - `Validation` for malformed fields, a missing customer name, or a missing
///   total on an order without lines
/// - `InvalidStatus` for an unknown status name
/// - `DuplicateOrderNumber` if the owner already used this order number
/// - `NotFound` if the customer or any line item is not the owner's
/// - `InsufficientStock` if any line asks for more than is on hand
#[instrument(skip(db, input), fields(order_number = %input.order_number))]
pub async fn create_order(
    db: &DatabaseConnection,
    user_id: i64,
    mut input: NewSalesOrder,
) -> Result<SalesOrderDetail> {
    input.customer_email = validation::clean_optional(input.customer_email);
    input.customer_name = validation::clean_optional(input.customer_name);

    let mut errors: Vec<FieldError> = validation::field_errors(&input, &input.items);
    if input.customer_id.is_none() && input.customer_name.is_none() {
        errors.push(FieldError::new("customerName", "is required when no customer is selected"));
    }
    if input.items.is_empty() && input.total_amount.is_none() {
        errors.push(FieldError::new("totalAmount", "is required when the order has no items"));
    }
    if !errors.is_empty() {
        return Err(Error::Validation { errors });
    }
    let status = input
        .status
        .as_deref()
        .map_or(Ok(SalesOrderStatus::Pending), parse_status)?;

    let order_number = input.order_number.trim().to_string();
    if order_number_taken(db, user_id, &order_number, None).await? {
        return Err(Error::DuplicateOrderNumber { order_number });
    }

    let txn = db.begin().await?;

    let (customer_name, customer_email) = match input.customer_id {
        Some(customer_id) => {
            let customer = customer::get_customer(&txn, user_id, customer_id).await?;
            (
                input.customer_name.unwrap_or(customer.name),
                input.customer_email.or(customer.email),
            )
        }
        None => (input.customer_name.unwrap_or_default(), input.customer_email),
    };

    let tax_rate = input.tax_rate.unwrap_or(Decimal::ZERO);
    let lines = price_lines(&txn, user_id, input.items).await?;
    take_stock(&txn, user_id, &lines).await?;
    let (tax_amount, total_amount) = if lines.is_empty() {
        (
            Decimal::ZERO,
            validation::to_cents(input.total_amount.unwrap_or_default()),
        )
    } else {
        let totals = totals_of(&lines, tax_rate)?;
        (totals.tax, totals.total)
    };

    let now = Utc::now();
    let order = sales_order::ActiveModel {
        order_number: Set(order_number.clone()),
        customer_id: Set(input.customer_id),
        customer_name: Set(customer_name),
        customer_email: Set(customer_email),
        tax_rate: Set(tax_rate),
        tax_amount: Set(tax_amount),
        total_amount: Set(total_amount),
        status: Set(status),
        order_date: Set(input.order_date.unwrap_or(now)),
        notes: Set(validation::clean_optional(input.notes)),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| on_unique_violation(e, || Error::DuplicateOrderNumber { order_number }))?;

    insert_lines(&txn, order.id, &lines).await?;
    txn.commit().await?;

    info!(order_id = order.id, lines = lines.len(), %total_amount, "Sales order created");
    get_order(db, user_id, order.id).await
}

/// Applies a partial update to a sales order.
///
/// Supplying `items` replaces every line: previously committed quantities go
/// back on the shelf and the new ones are taken, all in one transaction.
///
/// # Errors
/// Same as [`create_order`], plus `NotFound` for a missing order.
#[instrument(skip(db, patch))]
pub async fn update_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
    mut patch: SalesOrderPatch,
) -> Result<SalesOrderDetail> {
    patch.customer_email = validation::clean_optional(patch.customer_email);
    let mut errors = validation::field_errors(&patch, patch.items.as_deref().unwrap_or_default());
    if patch.items.as_ref().is_some_and(Vec::is_empty) && patch.total_amount.is_none() {
        errors.push(FieldError::new("totalAmount", "is required when the order has no items"));
    }
    if !errors.is_empty() {
        return Err(Error::Validation { errors });
    }
    let status = patch.status.as_deref().map(parse_status).transpose()?;

    let existing = get_header(db, user_id, order_id).await?;
    let new_number = patch.order_number.map(|n| n.trim().to_string());
    if let Some(number) = &new_number {
        if *number != existing.order_number
            && order_number_taken(db, user_id, number, Some(order_id)).await?
        {
            return Err(Error::DuplicateOrderNumber {
                order_number: number.clone(),
            });
        }
    }

    let txn = db.begin().await?;
    let tax_rate = patch.tax_rate.unwrap_or(existing.tax_rate);
    let mut record: sales_order::ActiveModel = existing.clone().into();

    if let Some(customer_id) = patch.customer_id {
        let customer = customer::get_customer(&txn, user_id, customer_id).await?;
        record.customer_id = Set(Some(customer_id));
        record.customer_name = Set(patch.customer_name.take().unwrap_or(customer.name));
        record.customer_email = Set(patch.customer_email.take().or(customer.email));
    }
    if let Some(name) = patch.customer_name {
        record.customer_name = Set(name.trim().to_string());
    }
    if patch.customer_email.is_some() {
        record.customer_email = Set(patch.customer_email);
    }

    let current_lines = SalesOrderItem::find()
        .filter(sales_order_item::Column::SalesOrderId.eq(order_id))
        .all(&txn)
        .await?;

    let line_pairs: Option<Vec<(i32, Decimal)>> = if let Some(items) = patch.items {
        // Put the old quantities back before taking the new ones.
        for line in &current_lines {
            inventory::shift_stock(&txn, user_id, line.inventory_id, line.quantity).await?;
        }
        SalesOrderItem::delete_many()
            .filter(sales_order_item::Column::SalesOrderId.eq(order_id))
            .exec(&txn)
            .await?;

        let lines = price_lines(&txn, user_id, items).await?;
        take_stock(&txn, user_id, &lines).await?;
        insert_lines(&txn, order_id, &lines).await?;
        Some(lines.iter().map(|l| (l.quantity, l.unit_price)).collect())
    } else if current_lines.is_empty() {
        None
    } else {
        Some(
            current_lines
                .iter()
                .map(|l| (l.quantity, l.unit_price))
                .collect(),
        )
    };

    match line_pairs {
        Some(pairs) if !pairs.is_empty() => {
            let totals = OrderTotals::from_lines(pairs, Some(tax_rate))?;
            record.tax_amount = Set(totals.tax);
            record.total_amount = Set(totals.total);
        }
        _ => {
            record.tax_amount = Set(Decimal::ZERO);
            if let Some(total) = patch.total_amount {
                record.total_amount = Set(validation::to_cents(total));
            }
        }
    }
    record.tax_rate = Set(tax_rate);

    if let Some(number) = new_number.clone() {
        record.order_number = Set(number);
    }
    if let Some(status) = status {
        record.status = Set(status);
    }
    if let Some(date) = patch.order_date {
        record.order_date = Set(date);
    }
    if patch.notes.is_some() {
        record.notes = Set(validation::clean_optional(patch.notes));
    }
    record.updated_at = Set(Utc::now());

    record.update(&txn).await.map_err(|e| {
        on_unique_violation(e, || Error::DuplicateOrderNumber {
            order_number: new_number.unwrap_or(existing.order_number),
        })
    })?;
    txn.commit().await?;

    info!("Sales order updated");
    get_order(db, user_id, order_id).await
}

/// Deletes a sales order and its lines. Stock is not returned.
///
/// # Errors
/// `NotFound` if the order is missing or owned by someone else.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, user_id: i64, order_id: i64) -> Result<()> {
    get_header(db, user_id, order_id).await?;

    let txn = db.begin().await?;
    SalesOrderItem::delete_many()
        .filter(sales_order_item::Column::SalesOrderId.eq(order_id))
        .exec(&txn)
        .await?;
    SalesOrder::delete_by_id(order_id).exec(&txn).await?;
    txn.commit().await?;

    info!("Sales order deleted");
    Ok(())
}

/// Lists every sales order of `user_id`, newest first.
pub async fn list_orders(db: &DatabaseConnection, user_id: i64) -> Result<Vec<SalesOrderDetail>> {
    let orders = SalesOrder::find()
        .filter(sales_order::Column::UserId.eq(user_id))
        .order_by_desc(sales_order::Column::CreatedAt)
        .order_by_desc(sales_order::Column::Id)
        .all(db)
        .await?;
    hydrate(db, orders).await
}

/// Lists orders in exactly `status`, newest first.
///
/// # Errors
/// `InvalidStatus` if `status` is not a sales order status.
pub async fn list_by_status(
    db: &DatabaseConnection,
    user_id: i64,
    status: &str,
) -> Result<Vec<SalesOrderDetail>> {
    let status = parse_status(status)?;
    let orders = SalesOrder::find()
        .filter(sales_order::Column::UserId.eq(user_id))
        .filter(sales_order::Column::Status.eq(status))
        .order_by_desc(sales_order::Column::CreatedAt)
        .order_by_desc(sales_order::Column::Id)
        .all(db)
        .await?;
    debug!(count = orders.len(), status = status.as_str(), "Sales orders by status");
    hydrate(db, orders).await
}

/// Lists orders whose order date falls within `[start, end]`, latest date first.
///
/// # Errors
/// `Validation` if `start` is after `end`.
pub async fn list_in_date_range(
    db: &DatabaseConnection,
    user_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<SalesOrderDetail>> {
    if start > end {
        return Err(Error::invalid_field("start", "must not be after end"));
    }
    let orders = SalesOrder::find()
        .filter(sales_order::Column::UserId.eq(user_id))
        .filter(sales_order::Column::OrderDate.between(start, end))
        .order_by_desc(sales_order::Column::OrderDate)
        .order_by_desc(sales_order::Column::Id)
        .all(db)
        .await?;
    hydrate(db, orders).await
}
