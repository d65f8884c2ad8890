//! Purchase order business logic - orders placed with suppliers.
//!
//! Purchase orders never move stock; receiving goods is recorded by adjusting
//! the inventory item directly. An order is overdue once its expected delivery
//! has passed while it is still not `RECEIVED`.

use crate::{
    core::{
        inventory, on_unique_violation,
        pricing::{self, OrderTotals},
        supplier, validation,
    },
    entities::{
        InventoryItem, PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus, Supplier,
        inventory_item, purchase_order, purchase_order_item, supplier as supplier_entity,
    },
    errors::{Error, FieldError, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};
use validator::Validate;

const ENTITY: &str = "Purchase order";

/// One requested line of a purchase order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineInput {
    /// Catalog item being ordered
    pub inventory_id: i64,
    /// Units ordered
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: i32,
    /// Defaults to the catalog price of the item
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "crate::core::validation::money"))]
    pub cost_per_unit: Option<Decimal>,
}

/// Payload for creating a purchase order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseOrder {
    /// Purchase order number, unique per owner
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub po_number: String,
    /// Linked supplier record
    #[serde(default)]
    pub supplier_id: Option<i64>,
    /// Supplier name shown on the order
    #[serde(default)]
    pub supplier_name: Option<String>,
    /// Supplier contact email
    #[serde(default)]
    #[validate(email)]
    pub supplier_email: Option<String>,
    /// Required when `items` is empty, ignored otherwise
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "crate::core::validation::money"))]
    pub total_amount: Option<Decimal>,
    /// Status name such as `PENDING`
    #[serde(default)]
    pub status: Option<String>,
    /// Defaults to now
    #[serde(default, deserialize_with = "crate::core::validation::flexible_date::deserialize")]
    pub order_date: Option<DateTime<Utc>>,
    /// Required
    #[serde(default, deserialize_with = "crate::core::validation::flexible_date::deserialize")]
    pub expected_delivery: Option<DateTime<Utc>>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Order lines
    #[serde(default)]
    pub items: Vec<PurchaseLineInput>,
}

/// Partial update of a purchase order. `items`, when present, replaces every line.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderPatch {
    /// Purchase order number, unique per owner
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub po_number: Option<String>,
    /// Linked supplier record
    pub supplier_id: Option<i64>,
    /// Supplier name shown on the order
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub supplier_name: Option<String>,
    /// Supplier contact email
    #[validate(email)]
    pub supplier_email: Option<String>,
    /// Applies only when the order ends up with no lines
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "crate::core::validation::money"))]
    pub total_amount: Option<Decimal>,
    /// Status name such as `PENDING`
    pub status: Option<String>,
    /// New order date
    #[serde(default, deserialize_with = "crate::core::validation::flexible_date::deserialize")]
    pub order_date: Option<DateTime<Utc>>,
    /// When the goods are due
    #[serde(default, deserialize_with = "crate::core::validation::flexible_date::deserialize")]
    pub expected_delivery: Option<DateTime<Utc>>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Replacement lines
    pub items: Option<Vec<PurchaseLineInput>>,
}

/// A stored line with its catalog item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLine {
    /// The stored line
    #[serde(flatten)]
    pub item: purchase_order_item::Model,
    /// Catalog item, if it still exists
    pub inventory: Option<inventory_item::Model>,
}

/// A purchase order with its lines and supplier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDetail {
    /// Order header
    #[serde(flatten)]
    pub order: purchase_order::Model,
    /// Order lines
    pub items: Vec<PurchaseOrderLine>,
    /// Linked supplier, if any
    pub supplier: Option<supplier_entity::Model>,
}

/// Parses a status name such as `"APPROVED"`.
pub fn parse_status(raw: &str) -> Result<PurchaseOrderStatus> {
    raw.trim().parse()
}

async fn cost_lines<C>(
    conn: &C,
    user_id: i64,
    lines: Vec<PurchaseLineInput>,
) -> Result<Vec<(i64, i32, Decimal)>>
where
    C: ConnectionTrait,
{
    let mut costed = Vec::with_capacity(lines.len());
    for line in lines {
        let item = inventory::get_item(conn, user_id, line.inventory_id).await?;
        let cost = line
            .cost_per_unit
            .map_or(item.unit_price, validation::to_cents);
        costed.push((item.id, line.quantity, cost));
    }
    Ok(costed)
}

async fn insert_lines<C>(conn: &C, order_id: i64, lines: &[(i64, i32, Decimal)]) -> Result<()>
where
    C: ConnectionTrait,
{
    for &(inventory_id, quantity, cost_per_unit) in lines {
        purchase_order_item::ActiveModel {
            purchase_order_id: Set(order_id),
            inventory_id: Set(inventory_id),
            quantity: Set(quantity),
            cost_per_unit: Set(cost_per_unit),
            total_cost: Set(pricing::line_total(quantity, cost_per_unit)?),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn po_number_taken(
    db: &DatabaseConnection,
    user_id: i64,
    po_number: &str,
    except_id: Option<i64>,
) -> Result<bool> {
    let mut query = PurchaseOrder::find()
        .filter(purchase_order::Column::UserId.eq(user_id))
        .filter(purchase_order::Column::PoNumber.eq(po_number));
    if let Some(id) = except_id {
        query = query.filter(purchase_order::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

/// Finds a purchase order header owned by `user_id`.
pub async fn find_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
) -> Result<Option<purchase_order::Model>> {
    PurchaseOrder::find_by_id(order_id)
        .filter(purchase_order::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn get_header(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
) -> Result<purchase_order::Model> {
    find_order(db, user_id, order_id).await?.ok_or(Error::NotFound {
        entity: ENTITY,
        id: order_id,
    })
}

async fn hydrate(
    db: &DatabaseConnection,
    orders: Vec<purchase_order::Model>,
) -> Result<Vec<PurchaseOrderDetail>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let lines = PurchaseOrderItem::find()
        .filter(purchase_order_item::Column::PurchaseOrderId.is_in(order_ids))
        .order_by_asc(purchase_order_item::Column::Id)
        .all(db)
        .await?;

    let inventory_ids: Vec<i64> = lines.iter().map(|l| l.inventory_id).collect();
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

    let supplier_ids: Vec<i64> = orders.iter().filter_map(|o| o.supplier_id).collect();
    let suppliers: HashMap<i64, supplier_entity::Model> = if supplier_ids.is_empty() {
        HashMap::new()
    } else {
        Supplier::find()
            .filter(supplier_entity::Column::Id.is_in(supplier_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect()
    };

    let mut by_order: HashMap<i64, Vec<PurchaseOrderLine>> = HashMap::new();
    for item in lines {
        by_order
            .entry(item.purchase_order_id)
            .or_default()
            .push(PurchaseOrderLine {
                inventory: inventory.get(&item.inventory_id).cloned(),
                item,
            });
    }

    Ok(orders
        .into_iter()
        .map(|order| PurchaseOrderDetail {
            items: by_order.remove(&order.id).unwrap_or_default(),
            supplier: order.supplier_id.and_then(|id| suppliers.get(&id).cloned()),
            order,
        })
        .collect())
}

/// Retrieves a purchase order with its lines and supplier.
pub async fn get_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
) -> Result<PurchaseOrderDetail> {
    let header = get_header(db, user_id, order_id).await?;
    hydrate(db, vec![header]).await?.pop().ok_or(Error::NotFound {
        entity: ENTITY,
        id: order_id,
    })
}

/// Creates a purchase order and its lines in one transaction.
///
/// # Errors
/// - `Validation` for malformed fields, a missing supplier name or expected
///   delivery, or a missing total on an order without lines
/// - `InvalidStatus` for an unknown status name
/// - `DuplicatePoNumber` if the owner already used this PO number
/// - `NotFound` if the supplier or any line item is not the owner's
#[instrument(skip(db, input), fields(po_number = %input.po_number))]
pub async fn create_order(
    db: &DatabaseConnection,
    user_id: i64,
    mut input: NewPurchaseOrder,
) -> Result<PurchaseOrderDetail> {
    input.supplier_email = validation::clean_optional(input.supplier_email);
    input.supplier_name = validation::clean_optional(input.supplier_name);

    let mut errors: Vec<FieldError> = validation::field_errors(&input, &input.items);
    if input.supplier_id.is_none() && input.supplier_name.is_none() {
        errors.push(FieldError::new("supplierName", "is required when no supplier is selected"));
    }
    if input.expected_delivery.is_none() {
        errors.push(FieldError::new("expectedDelivery", "is required"));
    }
    if input.items.is_empty() && input.total_amount.is_none() {
        errors.push(FieldError::new("totalAmount", "is required when the order has no items"));
    }
    let Some(expected_delivery) = input.expected_delivery else {
        return Err(Error::Validation { errors });
    };
    if !errors.is_empty() {
        return Err(Error::Validation { errors });
    }
    let status = input
        .status
        .as_deref()
        .map_or(Ok(PurchaseOrderStatus::Pending), parse_status)?;

    let po_number = input.po_number.trim().to_string();
    if po_number_taken(db, user_id, &po_number, None).await? {
        return Err(Error::DuplicatePoNumber { po_number });
    }

    let txn = db.begin().await?;

    let (supplier_name, supplier_email) = if let Some(supplier_id) = input.supplier_id {
        let supplier = supplier::get_supplier(&txn, user_id, supplier_id).await?;
        (
            input.supplier_name.unwrap_or(supplier.name),
            input.supplier_email.or(supplier.email),
        )
    } else {
        (input.supplier_name.unwrap_or_default(), input.supplier_email)
    };

    let lines = cost_lines(&txn, user_id, input.items).await?;
    let total_amount = if lines.is_empty() {
        validation::to_cents(input.total_amount.unwrap_or_default())
    } else {
        OrderTotals::from_lines(lines.iter().map(|&(_, q, c)| (q, c)), None)?.total
    };

    let now = Utc::now();
    let order = purchase_order::ActiveModel {
        po_number: Set(po_number.clone()),
        supplier_id: Set(input.supplier_id),
        supplier_name: Set(supplier_name),
        supplier_email: Set(supplier_email),
        total_amount: Set(total_amount),
        status: Set(status),
        order_date: Set(input.order_date.unwrap_or(now)),
        expected_delivery: Set(expected_delivery),
        notes: Set(validation::clean_optional(input.notes)),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| on_unique_violation(e, || Error::DuplicatePoNumber { po_number }))?;

    insert_lines(&txn, order.id, &lines).await?;
    txn.commit().await?;

    info!(order_id = order.id, %total_amount, "Purchase order created");
    get_order(db, user_id, order.id).await
}

/// Applies a partial update to a purchase order; `items` replaces every line.
#[instrument(skip(db, patch))]
pub async fn update_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
    mut patch: PurchaseOrderPatch,
) -> Result<PurchaseOrderDetail> {
    patch.supplier_email = validation::clean_optional(patch.supplier_email);
    let mut errors = validation::field_errors(&patch, patch.items.as_deref().unwrap_or_default());
    if patch.items.as_ref().is_some_and(Vec::is_empty) && patch.total_amount.is_none() {
        errors.push(FieldError::new("totalAmount", "is required when the order has no items"));
    }
    if !errors.is_empty() {
        return Err(Error::Validation { errors });
    }
    let status = patch.status.as_deref().map(parse_status).transpose()?;

    let existing = get_header(db, user_id, order_id).await?;
    let new_number = patch.po_number.map(|n| n.trim().to_string());
    if let Some(number) = &new_number {
        if *number != existing.po_number
            && po_number_taken(db, user_id, number, Some(order_id)).await?
        {
            return Err(Error::DuplicatePoNumber {
                po_number: number.clone(),
            });
        }
    }

    let txn = db.begin().await?;
    let mut record: purchase_order::ActiveModel = existing.clone().into();

    if let Some(supplier_id) = patch.supplier_id {
        let supplier = supplier::get_supplier(&txn, user_id, supplier_id).await?;
        record.supplier_id = Set(Some(supplier_id));
        record.supplier_name = Set(patch.supplier_name.take().unwrap_or(supplier.name));
        record.supplier_email = Set(patch.supplier_email.take().or(supplier.email));
    }
    if let Some(name) = patch.supplier_name {
        record.supplier_name = Set(name.trim().to_string());
    }
    if patch.supplier_email.is_some() {
        record.supplier_email = Set(patch.supplier_email);
    }

    let has_lines = if let Some(items) = patch.items {
        PurchaseOrderItem::delete_many()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
            .exec(&txn)
            .await?;
        let lines = cost_lines(&txn, user_id, items).await?;
        insert_lines(&txn, order_id, &lines).await?;
        if !lines.is_empty() {
            let totals = OrderTotals::from_lines(lines.iter().map(|&(_, q, c)| (q, c)), None)?;
            record.total_amount = Set(totals.total);
        }
        !lines.is_empty()
    } else {
        PurchaseOrderItem::find()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
            .count(&txn)
            .await?
            > 0
    };
    if !has_lines {
        if let Some(total) = patch.total_amount {
            record.total_amount = Set(validation::to_cents(total));
        }
    }

    if let Some(number) = new_number.clone() {
        record.po_number = Set(number);
    }
    if let Some(status) = status {
        record.status = Set(status);
    }
    if let Some(date) = patch.order_date {
        record.order_date = Set(date);
    }
    if let Some(date) = patch.expected_delivery {
        record.expected_delivery = Set(date);
    }
    if patch.notes.is_some() {
        record.notes = Set(validation::clean_optional(patch.notes));
    }
    record.updated_at = Set(Utc::now());

    record.update(&txn).await.map_err(|e| {
        on_unique_violation(e, || Error::DuplicatePoNumber {
            po_number: new_number.unwrap_or(existing.po_number),
        })
    })?;
    txn.commit().await?;

    info!("Purchase order updated");
    get_order(db, user_id, order_id).await
}

/// Deletes a purchase order and its lines.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, user_id: i64, order_id: i64) -> Result<()> {
    get_header(db, user_id, order_id).await?;

    let txn = db.begin().await?;
    PurchaseOrderItem::delete_many()
        .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
        .exec(&txn)
        .await?;
    PurchaseOrder::delete_by_id(order_id).exec(&txn).await?;
    txn.commit().await?;

    info!("Purchase order deleted");
    Ok(())
}

/// Lists every purchase order of `user_id`, newest first.
pub async fn list_orders(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<PurchaseOrderDetail>> {
    let orders = PurchaseOrder::find()
        .filter(purchase_order::Column::UserId.eq(user_id))
        .order_by_desc(purchase_order::Column::CreatedAt)
        .order_by_desc(purchase_order::Column::Id)
        .all(db)
        .await?;
    hydrate(db, orders).await
}

/// Lists orders in exactly `status`, newest first.
pub async fn list_by_status(
    db: &DatabaseConnection,
    user_id: i64,
    status: &str,
) -> Result<Vec<PurchaseOrderDetail>> {
    let status = parse_status(status)?;
    let orders = PurchaseOrder::find()
        .filter(purchase_order::Column::UserId.eq(user_id))
        .filter(purchase_order::Column::Status.eq(status))
        .order_by_desc(purchase_order::Column::CreatedAt)
        .order_by_desc(purchase_order::Column::Id)
        .all(db)
        .await?;
    hydrate(db, orders).await
}

/// Lists orders dated within `[start, end]`, latest date first.
pub async fn list_in_date_range(
    db: &DatabaseConnection,
    user_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<PurchaseOrderDetail>> {
    if start > end {
        return Err(Error::invalid_field("start", "must not be after end"));
    }
    let orders = PurchaseOrder::find()
        .filter(purchase_order::Column::UserId.eq(user_id))
        .filter(purchase_order::Column::OrderDate.between(start, end))
        .order_by_desc(purchase_order::Column::OrderDate)
        .order_by_desc(purchase_order::Column::Id)
        .all(db)
        .await?;
    hydrate(db, orders).await
}

/// Lists orders past their expected delivery that are not yet received,
/// most overdue first.
pub async fn list_overdue(
    db: &DatabaseConnection,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<Vec<PurchaseOrderDetail>> {
    let orders = PurchaseOrder::find()
        .filter(purchase_order::Column::UserId.eq(user_id))
        .filter(purchase_order::Column::ExpectedDelivery.lt(now))
        .filter(purchase_order::Column::Status.ne(PurchaseOrderStatus::Received))
        .order_by_asc(purchase_order::Column::ExpectedDelivery)
        .order_by_asc(purchase_order::Column::Id)
        .all(db)
        .await?;
    debug!(count = orders.len(), "Overdue purchase orders loaded");
    hydrate(db, orders).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::{TimeDelta, TimeZone};
    use rust_decimal_macros::dec;

    fn new_po(number: &str, expected_delivery: DateTime<Utc>) -> NewPurchaseOrder {
        NewPurchaseOrder {
            po_number: number.to_string(),
            supplier_id: None,
            supplier_name: Some("Acme".to_string()),
            supplier_email: None,
            total_amount: Some(dec!(100)),
            status: None,
            order_date: None,
            expected_delivery: Some(expected_delivery),
            notes: None,
            items: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_with_lines_and_supplier() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let acme = create_test_supplier(&db, user.id, "Acme").await?;
        let item = create_test_item(&db, user.id, "WID-001", 0).await?;

        let mut input = new_po("PO-1", Utc::now() + TimeDelta::days(7));
        input.supplier_name = None;
        input.supplier_id = Some(acme.id);
        input.items = vec![PurchaseLineInput {
            inventory_id: item.id,
            quantity: 4,
            cost_per_unit: Some(dec!(2.25)),
        }];

        let order = create_order(&db, user.id, input).await?;
        assert_eq!(order.order.supplier_name, "Acme");
        assert_eq!(order.order.total_amount, dec!(9.00));
        assert_eq!(order.order.status, PurchaseOrderStatus::Pending);
        assert_eq!(order.supplier.as_ref().unwrap().id, acme.id);
        assert_eq!(order.items[0].item.total_cost, dec!(9.00));

        // Purchase orders do not move stock
        assert_eq!(inventory::get_item(&db, user.id, item.id).await?.quantity, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_expected_delivery_required() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let mut input = new_po("PO-1", Utc::now());
        input.expected_delivery = None;

        let Err(Error::Validation { errors }) = create_order(&db, user.id, input).await else {
            panic!("expected validation error");
        };
        assert!(errors.iter().any(|e| e.field == "expectedDelivery"));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_po_number() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        create_order(&db, user.id, new_po("PO-1", Utc::now())).await?;
        let again = create_order(&db, user.id, new_po("PO-1", Utc::now())).await;
        assert!(matches!(again, Err(Error::DuplicatePoNumber { po_number }) if po_number == "PO-1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_overdue_excludes_received_and_future() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        let late = create_order(&db, user.id, new_po("PO-LATE", now - TimeDelta::days(3))).await?;
        let later = create_order(&db, user.id, new_po("PO-LATER", now - TimeDelta::days(10))).await?;
        let mut received = new_po("PO-RECEIVED", now - TimeDelta::days(5));
        received.status = Some("RECEIVED".to_string());
        create_order(&db, user.id, received).await?;
        create_order(&db, user.id, new_po("PO-FUTURE", now + TimeDelta::days(1))).await?;

        let overdue = list_overdue(&db, user.id, now).await?;
        let ids: Vec<i64> = overdue.iter().map(|o| o.order.id).collect();
        assert_eq!(ids, vec![later.order.id, late.order.id]);

        // Cancelled orders that are late still count
        let patch = PurchaseOrderPatch {
            status: Some("CANCELLED".to_string()),
            ..Default::default()
        };
        update_order(&db, user.id, late.order.id, patch).await?;
        assert_eq!(list_overdue(&db, user.id, now).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_items_and_total() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let item = create_test_item(&db, user.id, "WID-001", 0).await?;
        let order = create_order(&db, user.id, new_po("PO-1", Utc::now())).await?;
        assert_eq!(order.order.total_amount, dec!(100));

        let patch = PurchaseOrderPatch {
            items: Some(vec![PurchaseLineInput {
                inventory_id: item.id,
                quantity: 3,
                cost_per_unit: None,
            }]),
            total_amount: Some(dec!(1)),
            status: Some("APPROVED".to_string()),
            ..Default::default()
        };
        let updated = update_order(&db, user.id, order.order.id, patch).await?;
        assert_eq!(updated.items.len(), 1);
        // Catalog price of the test item is 10.00
        assert_eq!(updated.order.total_amount, dec!(30.00));
        assert_eq!(updated.order.status, PurchaseOrderStatus::Approved);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_filter_and_tenant_scope() -> Result<()> {
        let (db, alice) = setup_with_user().await?;
        let bob = create_test_user(&db, "bob@example.com").await?;
        let order = create_order(&db, alice.id, new_po("PO-1", Utc::now())).await?;

        assert_eq!(list_by_status(&db, alice.id, "PENDING").await?.len(), 1);
        assert!(list_by_status(&db, alice.id, "APPROVED").await?.is_empty());
        assert!(matches!(
            list_by_status(&db, alice.id, "SHIPPED").await,
            Err(Error::InvalidStatus { .. })
        ));

        assert!(list_orders(&db, bob.id).await?.is_empty());
        let patch = PurchaseOrderPatch::default();
        assert!(matches!(
            update_order(&db, bob.id, order.order.id, patch).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            delete_order(&db, bob.id, order.order.id).await,
            Err(Error::NotFound { .. })
        ));

        delete_order(&db, alice.id, order.order.id).await?;
        assert!(find_order(&db, alice.id, order.order.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_clearing_items_requires_total() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let item = create_test_item(&db, user.id, "WID-001", 0).await?;

        let mut input = new_po("PO-1", Utc::now() + TimeDelta::days(7));
        input.items = vec![PurchaseLineInput {
            inventory_id: item.id,
            quantity: 3,
            cost_per_unit: Some(dec!(10.00)),
        }];
        let order = create_order(&db, user.id, input).await?;
        assert_eq!(order.order.total_amount, dec!(30.00));

        let patch = PurchaseOrderPatch {
            items: Some(Vec::new()),
            ..Default::default()
        };
        let Err(Error::Validation { errors }) = update_order(&db, user.id, order.order.id, patch).await
        else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].field, "totalAmount");
        assert_eq!(get_order(&db, user.id, order.order.id).await?.items.len(), 1);

        let patch = PurchaseOrderPatch {
            items: Some(Vec::new()),
            total_amount: Some(dec!(12.50)),
            ..Default::default()
        };
        let cleared = update_order(&db, user.id, order.order.id, patch).await?;
        assert!(cleared.items.is_empty());
        assert_eq!(cleared.order.total_amount, dec!(12.50));
        Ok(())
    }

    #[tokio::test]
    async fn test_oversized_cost_is_rejected() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let item = create_test_item(&db, user.id, "WID-001", 0).await?;

        let mut input = new_po("PO-1", Utc::now() + TimeDelta::days(7));
        input.items = vec![PurchaseLineInput {
            inventory_id: item.id,
            quantity: 1000,
            cost_per_unit: Some(dec!(10000000000000000000000000000)),
        }];
        let result = create_order(&db, user.id, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(list_orders(&db, user.id).await?.is_empty());
        Ok(())
    }
}
