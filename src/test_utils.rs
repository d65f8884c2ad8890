//! Shared test utilities for `stockroom`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{customer, inventory, supplier},
    entities,
    errors::Result,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};

/// Signing secret used by every test token issuer.
pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

/// Lowest cost bcrypt accepts, so hashing does not slow the suite down.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a user row directly, skipping password hashing.
///
/// The stored hash is not a valid bcrypt string, so these users cannot log in.
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<entities::user::Model> {
    let now = Utc::now();
    let user = entities::user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        name: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

/// Sets up a complete test environment with one user.
/// Returns (db, user) for common test scenarios.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "alice@example.com").await?;
    Ok((db, user))
}

/// Creates a catalog item with sensible defaults.
///
/// # Defaults
/// * `product_name`: `"Item <sku>"`
/// * `category`: `"Other"`
/// * `unit_price`: 10.00
/// * `reorder_level`: 0
pub async fn create_test_item(
    db: &DatabaseConnection,
    user_id: i64,
    sku: &str,
    quantity: i32,
) -> Result<entities::inventory_item::Model> {
    create_custom_item(db, user_id, sku, quantity, 0, Decimal::new(1000, 2)).await
}

/// Creates a catalog item with a custom reorder level and price.
pub async fn create_custom_item(
    db: &DatabaseConnection,
    user_id: i64,
    sku: &str,
    quantity: i32,
    reorder_level: i32,
    unit_price: Decimal,
) -> Result<entities::inventory_item::Model> {
    let input = inventory::NewInventoryItem {
        product_name: format!("Item {sku}"),
        sku: sku.to_string(),
        category: None,
        quantity,
        unit_price,
        reorder_level,
        supplier_id: None,
    };
    inventory::create_item(db, user_id, input).await
}

/// Creates an active supplier with only a name.
pub async fn create_test_supplier(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
) -> Result<entities::supplier::Model> {
    let input = supplier::NewSupplier {
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
    };
    supplier::create_supplier(db, user_id, input).await
}

/// Creates an active customer with only a name.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
) -> Result<entities::customer::Model> {
    let input = customer::NewCustomer {
        name: name.to_string(),
        email: None,
        phone: None,
        address: None,
        city: None,
        state: None,
        zip_code: None,
        contact_person: None,
        company_type: None,
        notes: None,
        is_active: None,
    };
    customer::create_customer(db, user_id, input).await
}
