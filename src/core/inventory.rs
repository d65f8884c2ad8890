//! Inventory business logic - the per-user product catalog and its stock levels.
//!
//! SKUs are unique per owner (exact, case-sensitive match after trimming). Stock
//! never goes negative: every decrement is a conditional update that only
//! succeeds while enough units are on hand, so two concurrent orders for the
//! same SKU cannot both take the last unit.

use crate::{
    core::{on_unique_violation, supplier, validation},
    entities::{
        InventoryItem, PurchaseOrderItem, SalesOrderItem, inventory_item, purchase_order_item,
        sales_order_item,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Category assigned when none is supplied.
pub const DEFAULT_CATEGORY: &str = "Other";

const ENTITY: &str = "Inventory item";

/// Payload for creating a catalog item.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    /// Display name
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub product_name: String,
    /// Stock keeping unit
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub sku: String,
    /// Free-text category, defaults to [`DEFAULT_CATEGORY`]
    #[serde(default)]
    pub category: Option<String>,
    /// Units on hand
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
    /// Selling price per unit
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "crate::core::validation::money"))]
    pub unit_price: Decimal,
    /// Low-stock threshold
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub reorder_level: i32,
    /// Supplier the item is bought from
    #[serde(default)]
    pub supplier_id: Option<i64>,
}

/// Partial update of a catalog item; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPatch {
    /// Product display name
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub product_name: Option<String>,
    /// Stock keeping unit, unique per owner
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub sku: Option<String>,
    /// Catalog category
    pub category: Option<String>,
    /// Units on hand
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: Option<i32>,
    /// Catalog price per unit
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "crate::core::validation::money"))]
    pub unit_price: Option<Decimal>,
    /// Alert threshold for low stock
    #[validate(range(min = 0, message = "must not be negative"))]
    pub reorder_level: Option<i32>,
    /// `null` detaches the supplier
    #[serde(default, deserialize_with = "crate::core::validation::double_option")]
    pub supplier_id: Option<Option<i64>>,
}

/// Signed stock movement for a single item.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StockAdjustment {
    /// Units to add (positive) or remove (negative)
    pub delta: i32,
}

fn category_or_default(category: Option<String>) -> String {
    validation::clean_optional(category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

/// Finds an item owned by `user_id`.
pub async fn find_item<C>(conn: &C, user_id: i64, item_id: i64) -> Result<Option<inventory_item::Model>>
where
    C: ConnectionTrait,
{
    InventoryItem::find_by_id(item_id)
        .filter(inventory_item::Column::UserId.eq(user_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Retrieves an item owned by `user_id`, failing with `NotFound` otherwise.
pub async fn get_item<C>(conn: &C, user_id: i64, item_id: i64) -> Result<inventory_item::Model>
where
    C: ConnectionTrait,
{
    find_item(conn, user_id, item_id)
        .await?
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: item_id,
        })
}

async fn sku_taken(
    db: &DatabaseConnection,
    user_id: i64,
    sku: &str,
    except_id: Option<i64>,
) -> Result<bool> {
    let mut query = InventoryItem::find()
        .filter(inventory_item::Column::UserId.eq(user_id))
        .filter(inventory_item::Column::Sku.eq(sku));
    if let Some(id) = except_id {
        query = query.filter(inventory_item::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

/// Creates a catalog item for `user_id`.
///
/// # Errors
/// - `Validation` for blank names, negative quantities, or bad prices
/// - `DuplicateSku` if the owner already has an item with this SKU
/// - `NotFound` if `supplier_id` does not name one of the owner's suppliers
#[instrument(skip(db, input), fields(sku = %input.sku))]
pub async fn create_item(
    db: &DatabaseConnection,
    user_id: i64,
    input: NewInventoryItem,
) -> Result<inventory_item::Model> {
    input.validate()?;

    let sku = input.sku.trim().to_string();
    if sku_taken(db, user_id, &sku, None).await? {
        return Err(Error::DuplicateSku { sku });
    }
    if let Some(supplier_id) = input.supplier_id {
        supplier::get_supplier(db, user_id, supplier_id).await?;
    }

    let now = Utc::now();
    let item = inventory_item::ActiveModel {
        product_name: Set(input.product_name.trim().to_string()),
        sku: Set(sku.clone()),
        category: Set(category_or_default(input.category)),
        quantity: Set(input.quantity),
        unit_price: Set(validation::to_cents(input.unit_price)),
        reorder_level: Set(input.reorder_level),
        supplier_id: Set(input.supplier_id),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| on_unique_violation(e, || Error::DuplicateSku { sku }))?;

    info!(item_id = item.id, "Inventory item created");
    Ok(item)
}

/// Applies a partial update to an item owned by `user_id`.
///
/// # Errors
/// - `NotFound` if the item is missing or owned by someone else
/// - `DuplicateSku` if the SKU changes to one the owner already uses
#[instrument(skip(db, patch))]
pub async fn update_item(
    db: &DatabaseConnection,
    user_id: i64,
    item_id: i64,
    patch: InventoryPatch,
) -> Result<inventory_item::Model> {
    patch.validate()?;
    let existing = get_item(db, user_id, item_id).await?;

    let new_sku = patch.sku.map(|s| s.trim().to_string());
    if let Some(sku) = &new_sku {
        if *sku != existing.sku && sku_taken(db, user_id, sku, Some(item_id)).await? {
            return Err(Error::DuplicateSku { sku: sku.clone() });
        }
    }
    if let Some(Some(supplier_id)) = patch.supplier_id {
        supplier::get_supplier(db, user_id, supplier_id).await?;
    }

    let mut item: inventory_item::ActiveModel = existing.into();
    if let Some(name) = patch.product_name {
        item.product_name = Set(name.trim().to_string());
    }
    if let Some(sku) = new_sku.clone() {
        item.sku = Set(sku);
    }
    if patch.category.is_some() {
        item.category = Set(category_or_default(patch.category));
    }
    if let Some(quantity) = patch.quantity {
        item.quantity = Set(quantity);
    }
    if let Some(price) = patch.unit_price {
        item.unit_price = Set(validation::to_cents(price));
    }
    if let Some(level) = patch.reorder_level {
        item.reorder_level = Set(level);
    }
    if let Some(supplier_id) = patch.supplier_id {
        item.supplier_id = Set(supplier_id);
    }
    item.updated_at = Set(Utc::now());

    let updated = item.update(db).await.map_err(|e| {
        on_unique_violation(e, || Error::DuplicateSku {
            sku: new_sku.unwrap_or_default(),
        })
    })?;
    info!("Inventory item updated");
    Ok(updated)
}

/// Deletes an item that no order line references.
///
/// # Errors
/// - `NotFound` if the item is missing or owned by someone else
/// - `InventoryInUse` if any sales or purchase order line points at it
#[instrument(skip(db))]
pub async fn delete_item(db: &DatabaseConnection, user_id: i64, item_id: i64) -> Result<()> {
    let item = get_item(db, user_id, item_id).await?;

    let sold = SalesOrderItem::find()
        .filter(sales_order_item::Column::InventoryId.eq(item_id))
        .count(db)
        .await?;
    let bought = PurchaseOrderItem::find()
        .filter(purchase_order_item::Column::InventoryId.eq(item_id))
        .count(db)
        .await?;
    if sold + bought > 0 {
        return Err(Error::InventoryInUse { sku: item.sku });
    }

    InventoryItem::delete_by_id(item_id).exec(db).await?;
    info!("Inventory item deleted");
    Ok(())
}

/// Lists every item of `user_id`, newest first.
pub async fn list_items(db: &DatabaseConnection, user_id: i64) -> Result<Vec<inventory_item::Model>> {
    InventoryItem::find()
        .filter(inventory_item::Column::UserId.eq(user_id))
        .order_by_desc(inventory_item::Column::CreatedAt)
        .order_by_desc(inventory_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists items at or below their reorder level, lowest stock first.
pub async fn list_low_stock(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<inventory_item::Model>> {
    let items = InventoryItem::find()
        .filter(inventory_item::Column::UserId.eq(user_id))
        .filter(
            Expr::col(inventory_item::Column::Quantity)
                .lte(Expr::col(inventory_item::Column::ReorderLevel)),
        )
        .order_by_asc(inventory_item::Column::Quantity)
        .order_by_asc(inventory_item::Column::Id)
        .all(db)
        .await?;
    debug!(count = items.len(), "Low-stock items loaded");
    Ok(items)
}

/// Lists items whose category matches exactly, newest first.
pub async fn list_by_category(
    db: &DatabaseConnection,
    user_id: i64,
    category: &str,
) -> Result<Vec<inventory_item::Model>> {
    InventoryItem::find()
        .filter(inventory_item::Column::UserId.eq(user_id))
        .filter(inventory_item::Column::Category.eq(category))
        .order_by_desc(inventory_item::Column::CreatedAt)
        .order_by_desc(inventory_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves stock by `delta` units in one conditional statement.
///
/// Returns `false` without writing when a decrement would go below zero.
pub(crate) async fn shift_stock<C>(conn: &C, user_id: i64, item_id: i64, delta: i32) -> Result<bool>
where
    C: ConnectionTrait,
{
    let mut update = InventoryItem::update_many()
        .col_expr(
            inventory_item::Column::Quantity,
            Expr::col(inventory_item::Column::Quantity).add(delta),
        )
        .col_expr(inventory_item::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(inventory_item::Column::Id.eq(item_id))
        .filter(inventory_item::Column::UserId.eq(user_id));
    if delta < 0 {
        let Some(needed) = delta.checked_neg() else {
            return Ok(false);
        };
        update = update.filter(inventory_item::Column::Quantity.gte(needed));
    }
    let result = update.exec(conn).await?;
    Ok(result.rows_affected > 0)
}

/// Adds or removes stock for an item.
///
/// # Errors
/// - `NotFound` if the item is missing or owned by someone else
/// - `InsufficientStock` if a removal exceeds the units on hand
#[instrument(skip(db))]
pub async fn adjust_stock(
    db: &DatabaseConnection,
    user_id: i64,
    item_id: i64,
    adjustment: StockAdjustment,
) -> Result<inventory_item::Model> {
    let item = get_item(db, user_id, item_id).await?;
    if adjustment.delta.checked_neg().is_none()
        || item.quantity.checked_add(adjustment.delta).is_none()
    {
        return Err(Error::invalid_field("delta", "is out of range"));
    }

    if !shift_stock(db, user_id, item_id, adjustment.delta).await? {
        // Re-read so the error reports what is actually on hand now.
        let current = get_item(db, user_id, item_id).await?;
        return Err(Error::InsufficientStock {
            sku: current.sku,
            available: current.quantity,
            requested: adjustment.delta.saturating_neg(),
        });
    }

    info!(delta = adjustment.delta, "Stock adjusted");
    get_item(db, user_id, item_id).await
}
