//! Database configuration module.
//!
//! Handles the SeaORM connection and creates every table from the entity
//! definitions with `Schema::create_table_from_entity`, so the schema always
//! matches the Rust structs. Composite unique indexes back each per-tenant
//! uniqueness rule; the application-level pre-checks in `core` only exist to
//! produce a friendly error before the database would reject the write.

use crate::entities::{
    Customer, InventoryItem, PurchaseOrder, PurchaseOrderItem, SalesOrder, SalesOrderItem,
    Supplier, User, customer, inventory_item, purchase_order, sales_order, supplier,
};
use crate::errors::Result;
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    IdenStatic, Schema,
    sea_query::{Alias, Index, IndexCreateStatement},
};
use tracing::{debug, info, instrument};

/// Establishes a connection to the database named by `database_url`.
///
/// Works for both `sqlite://` and `postgres://` URLs; the backend is picked by SeaORM.
#[instrument(skip(database_url))]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(backend = ?db.get_database_backend(), "Database connection established");
    Ok(db)
}

/// Creates all tables and unique indexes if they do not exist yet.
///
/// Tables are created parents-first so foreign keys always point at an existing table.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut tables = vec![
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Supplier),
        schema.create_table_from_entity(Customer),
        schema.create_table_from_entity(InventoryItem),
        schema.create_table_from_entity(SalesOrder),
        schema.create_table_from_entity(SalesOrderItem),
        schema.create_table_from_entity(PurchaseOrder),
        schema.create_table_from_entity(PurchaseOrderItem),
    ];
    for table in &mut tables {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    for index in unique_indexes() {
        db.execute(builder.build(&index)).await?;
    }

    debug!("Database tables and unique indexes ensured");
    Ok(())
}

fn tenant_unique_index<E, C>(entity: E, column: C) -> IndexCreateStatement
where
    E: EntityTrait,
    C: ColumnTrait,
{
    // Every tenant-owned table names its owner column `user_id`.
    Index::create()
        .name(format!("idx_{}_user_{}", entity.table_name(), column.as_str()))
        .table(entity)
        .col(Alias::new("user_id"))
        .col(column)
        .unique()
        .if_not_exists()
        .to_owned()
}

fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        tenant_unique_index(InventoryItem, inventory_item::Column::Sku),
        tenant_unique_index(Supplier, supplier::Column::Name),
        tenant_unique_index(Customer, customer::Column::Name),
        tenant_unique_index(SalesOrder, sales_order::Column::OrderNumber),
        tenant_unique_index(PurchaseOrder, purchase_order::Column::PoNumber),
    ]
}
