//! SeaORM migrations
//!
//! Two migrators exist because the data is split in two places:
//!
//! - [`Migrator`] owns the shared `tenants` registry and records its history in
//!   `upkeep_registry_migrations`.
//! - [`TenantMigrator`] owns the maintenance tables and runs once per tenant
//!   inside that tenant's scope, so its `seaql_migrations` history lives next
//!   to the tables it created.
//!
//! On SQLite there is only one namespace and both migrators run against it.

use sea_orm_migration::prelude::*;

pub mod m20251001_000001_tenant_registry;
pub mod m20251001_000002_maintenance_schema;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20251001_000001_tenant_registry::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("upkeep_registry_migrations").into_iden()
    }
}

pub struct TenantMigrator;

#[async_trait::async_trait]
impl MigratorTrait for TenantMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20251001_000002_maintenance_schema::Migration)]
    }
}

/// Column helpers shared by the migrations.
///
/// PostgreSQL gets native `uuid`/`timestamptz`; other backends store them as text.
pub(crate) fn id_column(manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
    let mut col = ColumnDef::new(column);
    match manager.get_database_backend() {
        sea_orm::DatabaseBackend::Postgres => col.uuid().not_null(),
        _ => col.string().not_null(),
    };
    col
}

pub(crate) fn nullable_id_column(manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
    let mut col = ColumnDef::new(column);
    match manager.get_database_backend() {
        sea_orm::DatabaseBackend::Postgres => col.uuid(),
        _ => col.string(),
    };
    col
}

pub(crate) fn timestamp_column(manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
    let mut col = ColumnDef::new(column);
    match manager.get_database_backend() {
        sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone().not_null(),
        _ => col.string().not_null(),
    };
    col
}

pub(crate) fn nullable_timestamp_column(
    manager: &SchemaManager,
    column: impl IntoIden,
) -> ColumnDef {
    let mut col = ColumnDef::new(column);
    match manager.get_database_backend() {
        sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone(),
        _ => col.string(),
    };
    col
}

pub(crate) fn id_list_column(column: impl IntoIden) -> ColumnDef {
    let mut col = ColumnDef::new(column);
    col.json_binary().not_null();
    col
}
