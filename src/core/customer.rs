//! Customer business logic - the per-user directory of buyers.
//!
//! Mirrors the supplier directory: names are unique per owner, and a customer
//! that sales orders still point at is deactivated rather than deleted.

use crate::{
    core::{
        DeleteOutcome, SEARCH_LIMIT, StatusChange, contains_pattern, on_unique_violation,
        validation,
    },
    entities::{Customer, SalesOrder, customer, sales_order},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    Condition, QueryOrder, QuerySelect, Set,
    prelude::*,
    sea_query::{Expr, Func, LikeExpr},
};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use validator::Validate;

const ENTITY: &str = "Customer";

/// Payload for creating a customer.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
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
    /// Kind of business, e.g. retail
    pub company_type: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Whether the partner is still in use
    pub is_active: Option<bool>,
}

/// Partial update of a customer.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
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
    /// Kind of business, e.g. retail
    pub company_type: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Whether the partner is still in use
    pub is_active: Option<bool>,
}

/// Finds a customer owned by `user_id`.
pub async fn find_customer<C>(conn: &C, user_id: i64, customer_id: i64) -> Result<Option<customer::Model>>
where
    C: ConnectionTrait,
{
    Customer::find_by_id(customer_id)
        .filter(customer::Column::UserId.eq(user_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Retrieves a customer owned by `user_id`, failing with `NotFound` otherwise.
pub async fn get_customer<C>(conn: &C, user_id: i64, customer_id: i64) -> Result<customer::Model>
where
    C: ConnectionTrait,
{
    find_customer(conn, user_id, customer_id)
        .await?
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: customer_id,
        })
}

async fn name_taken(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
    except_id: Option<i64>,
) -> Result<bool> {
    let mut query = Customer::find()
        .filter(customer::Column::UserId.eq(user_id))
        .filter(customer::Column::Name.eq(name));
    if let Some(id) = except_id {
        query = query.filter(customer::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

fn duplicate(name: String) -> Error {
    Error::DuplicateName {
        entity: ENTITY,
        name,
    }
}

/// Creates a customer for `user_id`.
///
/// # Errors
/// - `Validation` for a blank name or malformed email
/// - `DuplicateName` if the owner already has a customer with this name
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_customer(
    db: &DatabaseConnection,
    user_id: i64,
    mut input: NewCustomer,
) -> Result<customer::Model> {
    input.email = validation::clean_optional(input.email);
    input.validate()?;

    let name = input.name.trim().to_string();
    if name_taken(db, user_id, &name, None).await? {
        return Err(duplicate(name));
    }

    let now = Utc::now();
    let created = customer::ActiveModel {
        name: Set(name.clone()),
        email: Set(input.email),
        phone: Set(validation::clean_optional(input.phone)),
        address: Set(validation::clean_optional(input.address)),
        city: Set(validation::clean_optional(input.city)),
        state: Set(validation::clean_optional(input.state)),
        zip_code: Set(validation::clean_optional(input.zip_code)),
        contact_person: Set(validation::clean_optional(input.contact_person)),
        company_type: Set(validation::clean_optional(input.company_type)),
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

    info!(customer_id = created.id, "Customer created");
    Ok(created)
}

/// Applies a partial update to a customer owned by `user_id`.
///
/// # Errors
/// - `NotFound` if the customer is missing or owned by someone else
/// - `DuplicateName` if the name changes to one the owner already uses
#[instrument(skip(db, patch))]
pub async fn update_customer(
    db: &DatabaseConnection,
    user_id: i64,
    customer_id: i64,
    mut patch: CustomerPatch,
) -> Result<customer::Model> {
    patch.email = validation::clean_optional(patch.email);
    patch.validate()?;
    let existing = get_customer(db, user_id, customer_id).await?;

    let new_name = patch.name.map(|n| n.trim().to_string());
    if let Some(name) = &new_name {
        if *name != existing.name && name_taken(db, user_id, name, Some(customer_id)).await? {
            return Err(duplicate(name.clone()));
        }
    }

    let mut record: customer::ActiveModel = existing.into();
    if let Some(name) = new_name.clone() {
        record.name = Set(name);
    }
    if patch.email.is_some() {
        record.email = Set(patch.email);
    }
    // Optional text fields: present means replace, blank clears.
    macro_rules! replace_text {
        ($($field:ident),+) => {
            $(
                if patch.$field.is_some() {
                    record.$field = Set(validation::clean_optional(patch.$field));
                }
            )+
        };
    }
    replace_text!(phone, address, city, state, zip_code, contact_person, company_type, notes);
    if let Some(active) = patch.is_active {
        record.is_active = Set(active);
    }
    record.updated_at = Set(Utc::now());

    let updated = record
        .update(db)
        .await
        .map_err(|e| on_unique_violation(e, || duplicate(new_name.unwrap_or_default())))?;
    info!("Customer updated");
    Ok(updated)
}

async fn write_status(
    db: &DatabaseConnection,
    existing: customer::Model,
    is_active: bool,
) -> Result<customer::Model> {
    let mut record: customer::ActiveModel = existing.into();
    record.is_active = Set(is_active);
    record.updated_at = Set(Utc::now());
    record.update(db).await.map_err(Into::into)
}

/// Deletes a customer, or deactivates it when sales orders reference it.
///
/// # Errors
/// `NotFound` if the customer is missing or owned by someone else.
#[instrument(skip(db))]
pub async fn delete_customer(
    db: &DatabaseConnection,
    user_id: i64,
    customer_id: i64,
) -> Result<DeleteOutcome<customer::Model>> {
    let existing = get_customer(db, user_id, customer_id).await?;

    let orders = SalesOrder::find()
        .filter(sales_order::Column::CustomerId.eq(customer_id))
        .count(db)
        .await?;
    if orders > 0 {
        let deactivated = write_status(db, existing, false).await?;
        info!(orders, "Customer has sales orders; deactivated instead of deleted");
        return Ok(DeleteOutcome::Deactivated(deactivated));
    }

    Customer::delete_by_id(customer_id).exec(db).await?;
    info!("Customer deleted");
    Ok(DeleteOutcome::Deleted)
}

/// Flips the active flag.
pub async fn toggle_status(
    db: &DatabaseConnection,
    user_id: i64,
    customer_id: i64,
) -> Result<customer::Model> {
    let existing = get_customer(db, user_id, customer_id).await?;
    let flipped = !existing.is_active;
    write_status(db, existing, flipped).await
}

/// Sets the active flag to an explicit value.
pub async fn set_status(
    db: &DatabaseConnection,
    user_id: i64,
    customer_id: i64,
    change: StatusChange,
) -> Result<customer::Model> {
    let existing = get_customer(db, user_id, customer_id).await?;
    write_status(db, existing, change.is_active).await
}

/// Lists all customers of `user_id` by name.
pub async fn list_customers(db: &DatabaseConnection, user_id: i64) -> Result<Vec<customer::Model>> {
    Customer::find()
        .filter(customer::Column::UserId.eq(user_id))
        .order_by_asc(customer::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists active customers of `user_id` by name.
pub async fn list_active_customers(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<customer::Model>> {
    Customer::find()
        .filter(customer::Column::UserId.eq(user_id))
        .filter(customer::Column::IsActive.eq(true))
        .order_by_asc(customer::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Case-insensitive substring search over name, email, contact person and phone,
/// capped at [`SEARCH_LIMIT`] rows ordered by name.
pub async fn search_customers(
    db: &DatabaseConnection,
    user_id: i64,
    term: &str,
) -> Result<Vec<customer::Model>> {
    if term.trim().is_empty() {
        return Ok(Vec::new());
    }
    let pattern = contains_pattern(term);
    let like = |column: customer::Column| {
        Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern.clone()).escape('\\'))
    };

    let found = Customer::find()
        .filter(customer::Column::UserId.eq(user_id))
        .filter(
            Condition::any()
                .add(like(customer::Column::Name))
                .add(like(customer::Column::Email))
                .add(like(customer::Column::ContactPerson))
                .add(like(customer::Column::Phone)),
        )
        .order_by_asc(customer::Column::Name)
        .limit(SEARCH_LIMIT)
        .all(db)
        .await?;
    debug!(count = found.len(), "Customer search finished");
    Ok(found)
}
