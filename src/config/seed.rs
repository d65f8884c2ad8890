//! Demo data seeding from a TOML file.
//!
//! When `SEED_FILE` is set, the file is loaded at start-up and its account,
//! partners, and catalog are created if they do not exist yet. Applying the
//! same file twice changes nothing: every record is matched by its natural key
//! (email, partner name, SKU) and skipped when already present.

use crate::{
    core::{auth, customer, inventory, supplier},
    entities::{Supplier, supplier as supplier_entity},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, prelude::*};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

/// Structure of a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Account that owns everything below
    pub user: SeedUser,
    /// Suppliers to create
    #[serde(default)]
    pub suppliers: Vec<SeedPartner>,
    /// Customers to create
    #[serde(default)]
    pub customers: Vec<SeedPartner>,
    /// Catalog items to create
    #[serde(default)]
    pub inventory: Vec<SeedItem>,
}

/// Seed account credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    /// Login email
    pub email: String,
    /// Plain-text password, hashed on load
    pub password: String,
    /// Display name
    pub name: Option<String>,
}

/// A supplier or customer entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedPartner {
    /// Display name
    pub name: String,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Person to ask for
    pub contact_person: Option<String>,
    /// City
    pub city: Option<String>,
}

/// A catalog entry. `supplier` refers to a supplier by name.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedItem {
    /// Product display name
    pub product_name: String,
    /// Stock keeping unit, unique per owner
    pub sku: String,
    /// Catalog category
    pub category: Option<String>,
    /// Units on hand
    #[serde(default)]
    pub quantity: i32,
    /// Catalog price per unit
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Alert threshold for low stock
    #[serde(default)]
    pub reorder_level: i32,
    /// Name of a seeded supplier to link
    pub supplier: Option<String>,
}

/// What a seeding run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Whether the seed user was new
    pub user_created: bool,
    /// Suppliers inserted
    pub suppliers: usize,
    /// Customers inserted
    pub customers: usize,
    /// Catalog items inserted
    pub items: usize,
}

/// Parses a seed file.
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or is not valid TOML.
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path.as_ref().display()),
    })?;
    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

/// Creates whatever part of `seed` does not exist yet.
#[instrument(skip_all, fields(email = %seed.user.email))]
pub async fn apply_seed(
    db: &DatabaseConnection,
    seed: SeedConfig,
    bcrypt_cost: u32,
    tokens: &auth::TokenIssuer,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let user = if let Some(existing) = auth::get_user_by_email(db, &seed.user.email).await? {
        existing
    } else {
        let input = auth::RegisterInput {
            email: seed.user.email,
            password: seed.user.password,
            name: seed.user.name,
        };
        report.user_created = true;
        auth::register(db, tokens, bcrypt_cost, input).await?.user
    };

    for partner in seed.suppliers {
        let input = supplier::NewSupplier {
            name: partner.name,
            email: partner.email,
            phone: partner.phone,
            address: None,
            city: partner.city,
            state: None,
            zip_code: None,
            contact_person: partner.contact_person,
            website: None,
            notes: None,
            is_active: None,
        };
        match supplier::create_supplier(db, user.id, input).await {
            Ok(_) => report.suppliers += 1,
            Err(Error::DuplicateName { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    for partner in seed.customers {
        let input = customer::NewCustomer {
            name: partner.name,
            email: partner.email,
            phone: partner.phone,
            address: None,
            city: partner.city,
            state: None,
            zip_code: None,
            contact_person: partner.contact_person,
            company_type: None,
            notes: None,
            is_active: None,
        };
        match customer::create_customer(db, user.id, input).await {
            Ok(_) => report.customers += 1,
            Err(Error::DuplicateName { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    for item in seed.inventory {
        let supplier_id = match &item.supplier {
            Some(name) => Supplier::find()
                .filter(supplier_entity::Column::UserId.eq(user.id))
                .filter(supplier_entity::Column::Name.eq(name.as_str()))
                .one(db)
                .await?
                .map(|s| s.id),
            None => None,
        };
        let input = inventory::NewInventoryItem {
            product_name: item.product_name,
            sku: item.sku,
            category: item.category,
            quantity: item.quantity,
            unit_price: item.unit_price,
            reorder_level: item.reorder_level,
            supplier_id,
        };
        match inventory::create_item(db, user.id, input).await {
            Ok(_) => report.items += 1,
            Err(Error::DuplicateSku { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    info!(?report, "Seed applied");
    Ok(report)
}
