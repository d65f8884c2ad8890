//! Supplier business logic - the per-user directory of vendors.
//!
//! Names are unique per owner. A supplier still referenced by inventory items or
//! purchase orders is never removed; deleting it deactivates it instead so the
//! references stay valid.

use crate::{
    core::{
        DeleteOutcome, SEARCH_LIMIT, StatusChange, contains_pattern, on_unique_violation,
        validation,
    },
    entities::{InventoryItem, PurchaseOrder, Supplier, inventory_item, purchase_order, supplier},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    Condition, QueryOrder, QuerySelect, Set,
    prelude::*,
    sea_query::{Expr, Func, LikeExpr},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use validator::Validate;

const ENTITY: &str = "Supplier";

/// Number of purchase orders included in [`SupplierDetail`].
pub const RECENT_ORDERS: u64 = 5;

/// Payload for creating a supplier.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    /// Display name
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub name: String,
    /// Contact email
    #[validate(email)]
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// Postal code
    pub zip_code: Option<String>,
    /// Person to ask for
    pub contact_person: Option<String>,
    /// Company website
    pub website: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Defaults to true
    pub is_active: Option<bool>,
}

/// Partial update of a supplier; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    /// Display name
    #[validate(custom(function = "crate::core::validation::not_blank"))]
    pub name: Option<String>,
    /// Contact email
    #[validate(email)]
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// Postal code
    pub zip_code: Option<String>,
    /// Person to ask for
    pub contact_person: Option<String>,
    /// Company website
    pub website: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Whether the partner is still in use
    pub is_active: Option<bool>,
}

/// Inventory line shown on the supplier detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockedItem {
    /// Item id
    pub id: i64,
    /// Product display name
    pub product_name: String,
    /// Stock keeping unit, unique per owner
    pub sku: String,
    /// Units on hand
    pub quantity: i32,
}

impl From<inventory_item::Model> for StockedItem {
    fn from(item: inventory_item::Model) -> Self {
        Self {
            id: item.id,
            product_name: item.product_name,
            sku: item.sku,
            quantity: item.quantity,
        }
    }
}

/// A supplier with the items it stocks and its most recent purchase orders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDetail {
    /// Supplier record
    #[serde(flatten)]
    pub supplier: supplier::Model,
    /// Items this supplier provides
    pub inventory_items: Vec<StockedItem>,
    /// Orders placed with this supplier
    pub purchase_orders: Vec<purchase_order::Model>,
}

/// Finds a supplier owned by `user_id`.
pub async fn find_supplier<C>(conn: &C, user_id: i64, supplier_id: i64) -> Result<Option<supplier::Model>>
where
    C: ConnectionTrait,
{
    Supplier::find_by_id(supplier_id)
        .filter(supplier::Column::UserId.eq(user_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Retrieves a supplier owned by `user_id`, failing with `NotFound` otherwise.
pub async fn get_supplier<C>(conn: &C, user_id: i64, supplier_id: i64) -> Result<supplier::Model>
where
    C: ConnectionTrait,
{
    find_supplier(conn, user_id, supplier_id)
        .await?
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: supplier_id,
        })
}

async fn name_taken(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
    except_id: Option<i64>,
) -> Result<bool> {
    let mut query = Supplier::find()
        .filter(supplier::Column::UserId.eq(user_id))
        .filter(supplier::Column::Name.eq(name));
    if let Some(id) = except_id {
        query = query.filter(supplier::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

fn duplicate(name: String) -> Error {
    Error::DuplicateName {
        entity: ENTITY,
        name,
    }
}

/// Creates a supplier for `user_id`.
///
/// # Errors
/// - `Validation` for a blank name or malformed email
/// - `DuplicateName` if the owner already has a supplier with this name
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_supplier(
    db: &DatabaseConnection,
    user_id: i64,
    mut input: NewSupplier,
) -> Result<supplier::Model> {
    input.email = validation::clean_optional(input.email);
    input.validate()?;

    let name = input.name.trim().to_string();
    if name_taken(db, user_id, &name, None).await? {
        return Err(duplicate(name));
    }

    let now = Utc::now();
    let created = supplier::ActiveModel {
        name: Set(name.clone()),
        email: Set(input.email),
        phone: Set(validation::clean_optional(input.phone)),
        address: Set(validation::clean_optional(input.address)),
        city: Set(validation::clean_optional(input.city)),
        state: Set(validation::clean_optional(input.state)),
        zip_code: Set(validation::clean_optional(input.zip_code)),
        contact_person: Set(validation::clean_optional(input.contact_person)),
        website: Set(validation::clean_optional(input.website)),
        notes: Set(validation::clean_optional(input.notes)),
        is_active: Set(input.is_active.unwrap_or(true)),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| on_unique_violation(e, || duplicate(name)))?;

    info!(supplier_id = created.id, "Supplier created");
    Ok(created)
}

/// Applies a partial update to a supplier owned by `user_id`.
///
/// # Errors
/// - `NotFound` if the supplier is missing or owned by someone else
/// - `DuplicateName` if the name changes to one the owner already uses
#[instrument(skip(db, patch))]
pub async fn update_supplier(
    db: &DatabaseConnection,
    user_id: i64,
    supplier_id: i64,
    mut patch: SupplierPatch,
) -> Result<supplier::Model> {
    patch.email = validation::clean_optional(patch.email);
    patch.validate()?;
    let existing = get_supplier(db, user_id, supplier_id).await?;

    let new_name = patch.name.map(|n| n.trim().to_string());
    if let Some(name) = &new_name {
        if *name != existing.name && name_taken(db, user_id, name, Some(supplier_id)).await? {
            return Err(duplicate(name.clone()));
        }
    }

    let mut record: supplier::ActiveModel = existing.into();
    if let Some(name) = new_name.clone() {
        record.name = Set(name);
    }
    if patch.email.is_some() {
        record.email = Set(patch.email);
    }
    if patch.phone.is_some() {
        record.phone = Set(validation::clean_optional(patch.phone));
    }
    if patch.address.is_some() {
        record.address = Set(validation::clean_optional(patch.address));
    }
    if patch.city.is_some() {
        record.city = Set(validation::clean_optional(patch.city));
    }
    if patch.state.is_some() {
        record.state = Set(validation::clean_optional(patch.state));
    }
    if patch.zip_code.is_some() {
        record.zip_code = Set(validation::clean_optional(patch.zip_code));
    }
    if patch.contact_person.is_some() {
        record.contact_person = Set(validation::clean_optional(patch.contact_person));
    }
    if patch.website.is_some() {
        record.website = Set(validation::clean_optional(patch.website));
    }
    if patch.notes.is_some() {
        record.notes = Set(validation::clean_optional(patch.notes));
    }
    if let Some(active) = patch.is_active {
        record.is_active = Set(active);
    }
    record.updated_at = Set(Utc::now());

    let updated = record
        .update(db)
        .await
        .map_err(|e| on_unique_violation(e, || duplicate(new_name.unwrap_or_default())))?;
    info!("Supplier updated");
    Ok(updated)
}

async fn is_referenced(db: &DatabaseConnection, supplier_id: i64) -> Result<bool> {
    let items = InventoryItem::find()
        .filter(inventory_item::Column::SupplierId.eq(supplier_id))
        .count(db)
        .await?;
    if items > 0 {
        return Ok(true);
    }
    let orders = PurchaseOrder::find()
        .filter(purchase_order::Column::SupplierId.eq(supplier_id))
        .count(db)
        .await?;
    Ok(orders > 0)
}

/// Deletes a supplier, or deactivates it when inventory items or purchase
/// orders still reference it.
///
/// # Errors
/// `NotFound` if the supplier is missing or owned by someone else.
#[instrument(skip(db))]
pub async fn delete_supplier(
    db: &DatabaseConnection,
    user_id: i64,
    supplier_id: i64,
) -> Result<DeleteOutcome<supplier::Model>> {
    let existing = get_supplier(db, user_id, supplier_id).await?;

    if is_referenced(db, supplier_id).await? {
        let deactivated = write_status(db, existing, false).await?;
        info!("Supplier is referenced; deactivated instead of deleted");
        return Ok(DeleteOutcome::Deactivated(deactivated));
    }

    Supplier::delete_by_id(supplier_id).exec(db).await?;
    info!("Supplier deleted");
    Ok(DeleteOutcome::Deleted)
}

async fn write_status(
    db: &DatabaseConnection,
    existing: supplier::Model,
    is_active: bool,
) -> Result<supplier::Model> {
    let mut record: supplier::ActiveModel = existing.into();
    record.is_active = Set(is_active);
    record.updated_at = Set(Utc::now());
    record.update(db).await.map_err(Into::into)
}

/// Flips the active flag.
pub async fn toggle_status(
    db: &DatabaseConnection,
    user_id: i64,
    supplier_id: i64,
) -> Result<supplier::Model> {
    let existing = get_supplier(db, user_id, supplier_id).await?;
    let flipped = !existing.is_active;
    write_status(db, existing, flipped).await
}

/// Sets the active flag to an explicit value.
pub async fn set_status(
    db: &DatabaseConnection,
    user_id: i64,
    supplier_id: i64,
    change: StatusChange,
) -> Result<supplier::Model> {
    let existing = get_supplier(db, user_id, supplier_id).await?;
    write_status(db, existing, change.is_active).await
}

/// Loads a supplier together with its stocked items and latest purchase orders.
pub async fn get_supplier_detail(
    db: &DatabaseConnection,
    user_id: i64,
    supplier_id: i64,
) -> Result<SupplierDetail> {
    let supplier = get_supplier(db, user_id, supplier_id).await?;

    let inventory_items = supplier
        .find_related(InventoryItem)
        .filter(inventory_item::Column::UserId.eq(user_id))
        .order_by_asc(inventory_item::Column::ProductName)
        .all(db)
        .await?
        .into_iter()
        .map(StockedItem::from)
        .collect();
    let purchase_orders = supplier
        .find_related(PurchaseOrder)
        .filter(purchase_order::Column::UserId.eq(user_id))
        .order_by_desc(purchase_order::Column::OrderDate)
        .order_by_desc(purchase_order::Column::Id)
        .limit(RECENT_ORDERS)
        .all(db)
        .await?;

    Ok(SupplierDetail {
        supplier,
        inventory_items,
        purchase_orders,
    })
}

/// Lists all suppliers of `user_id` by name.
pub async fn list_suppliers(db: &DatabaseConnection, user_id: i64) -> Result<Vec<supplier::Model>> {
    Supplier::find()
        .filter(supplier::Column::UserId.eq(user_id))
        .order_by_asc(supplier::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists active suppliers of `user_id` by name.
pub async fn list_active_suppliers(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<supplier::Model>> {
    Supplier::find()
        .filter(supplier::Column::UserId.eq(user_id))
        .filter(supplier::Column::IsActive.eq(true))
        .order_by_asc(supplier::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Case-insensitive substring search over name, email, contact person and phone.
///
/// Returns at most [`SEARCH_LIMIT`] suppliers ordered by name.
pub async fn search_suppliers(
    db: &DatabaseConnection,
    user_id: i64,
    term: &str,
) -> Result<Vec<supplier::Model>> {
    if term.trim().is_empty() {
        return Ok(Vec::new());
    }
    let pattern = contains_pattern(term);
    let matches = |column: supplier::Column| {
        Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern.clone()).escape('\\'))
    };

    let found = Supplier::find()
        .filter(supplier::Column::UserId.eq(user_id))
        .filter(
            Condition::any()
                .add(matches(supplier::Column::Name))
                .add(matches(supplier::Column::Email))
                .add(matches(supplier::Column::ContactPerson))
                .add(matches(supplier::Column::Phone)),
        )
        .order_by_asc(supplier::Column::Name)
        .limit(SEARCH_LIMIT)
        .all(db)
        .await?;
    debug!(count = found.len(), "Supplier search finished");
    Ok(found)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn new_supplier(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            contact_person: None,
            website: None,
            notes: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_create_supplier_defaults_active() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let mut input = new_supplier("  Acme Parts ");
        input.email = Some(String::new());

        let created = create_supplier(&db, user.id, input).await?;
        assert_eq!(created.name, "Acme Parts");
        assert!(created.is_active);
        assert_eq!(created.email, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_name_per_owner() -> Result<()> {
        let (db, alice) = setup_with_user().await?;
        let bob = create_test_user(&db, "bob@example.com").await?;

        create_supplier(&db, alice.id, new_supplier("Acme")).await?;
        let again = create_supplier(&db, alice.id, new_supplier("Acme")).await;
        assert!(matches!(again, Err(Error::DuplicateName { .. })));

        create_supplier(&db, bob.id, new_supplier("Acme")).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rename_excludes_self() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let acme = create_supplier(&db, user.id, new_supplier("Acme")).await?;
        create_supplier(&db, user.id, new_supplier("Globex")).await?;

        let clash = SupplierPatch {
            name: Some("Globex".to_string()),
            ..Default::default()
        };
        let result = update_supplier(&db, user.id, acme.id, clash).await;
        assert!(matches!(result, Err(Error::DuplicateName { .. })));

        let same = SupplierPatch {
            name: Some("Acme".to_string()),
            city: Some("Springfield".to_string()),
            ..Default::default()
        };
        let updated = update_supplier(&db, user.id, acme.id, same).await?;
        assert_eq!(updated.city.as_deref(), Some("Springfield"));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unreferenced_supplier() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let acme = create_supplier(&db, user.id, new_supplier("Acme")).await?;

        assert_eq!(delete_supplier(&db, user.id, acme.id).await?, DeleteOutcome::Deleted);
        let lookup = get_supplier(&db, user.id, acme.id).await;
        assert!(matches!(lookup, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_referenced_supplier_deactivates() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let acme = create_supplier(&db, user.id, new_supplier("Acme")).await?;
        let item = create_test_item(&db, user.id, "WID-001", 5).await?;
        let patch = crate::core::inventory::InventoryPatch {
            supplier_id: Some(Some(acme.id)),
            ..Default::default()
        };
        crate::core::inventory::update_item(&db, user.id, item.id, patch).await?;

        let outcome = delete_supplier(&db, user.id, acme.id).await?;
        let DeleteOutcome::Deactivated(supplier) = outcome else {
            panic!("expected deactivation");
        };
        assert!(!supplier.is_active);
        assert!(!get_supplier(&db, user.id, acme.id).await?.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_flag() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let acme = create_supplier(&db, user.id, new_supplier("Acme")).await?;

        let once = toggle_status(&db, user.id, acme.id).await?;
        assert!(!once.is_active);
        let twice = toggle_status(&db, user.id, acme.id).await?;
        assert!(twice.is_active);

        let explicit = set_status(&db, user.id, acme.id, StatusChange { is_active: false }).await?;
        assert!(!explicit.is_active);
        assert!(list_active_suppliers(&db, user.id).await?.is_empty());
        assert_eq!(list_suppliers(&db, user.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_capped() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let bob = create_test_user(&db, "bob@example.com").await?;

        for i in 0..12 {
            create_supplier(&db, user.id, new_supplier(&format!("Widget Co {i:02}"))).await?;
        }
        let mut contact = new_supplier("Zeta");
        contact.contact_person = Some("Wanda WIDGETSON".to_string());
        create_supplier(&db, user.id, contact).await?;
        create_supplier(&db, bob.id, new_supplier("Widget Bob")).await?;

        let found = search_suppliers(&db, user.id, "widget").await?;
        assert_eq!(found.len(), 10);
        assert_eq!(found[0].name, "Widget Co 00");
        assert!(found.iter().all(|s| s.user_id == user.id));

        let by_contact = search_suppliers(&db, user.id, "widgetson").await?;
        assert_eq!(by_contact.len(), 1);
        assert_eq!(by_contact[0].name, "Zeta");

        assert!(search_suppliers(&db, user.id, "100%").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_detail_lists_stocked_items() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let acme = create_supplier(&db, user.id, new_supplier("Acme")).await?;
        let item = create_test_item(&db, user.id, "WID-001", 5).await?;
        let patch = crate::core::inventory::InventoryPatch {
            supplier_id: Some(Some(acme.id)),
            ..Default::default()
        };
        crate::core::inventory::update_item(&db, user.id, item.id, patch).await?;

        let detail = get_supplier_detail(&db, user.id, acme.id).await?;
        assert_eq!(detail.supplier.id, acme.id);
        assert_eq!(detail.inventory_items.len(), 1);
        assert_eq!(detail.inventory_items[0].sku, "WID-001");
        assert!(detail.purchase_orders.is_empty());
        Ok(())
    }
}
