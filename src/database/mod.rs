//! SeaORM-based database layer
//!
//! Supports PostgreSQL (one schema per tenant) and SQLite (single namespace,
//! used for development and tests).

use anyhow::{Context, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaOrmDatabase, DatabaseBackend,
    DatabaseConnection, Statement,
};
use sea_orm_migration::MigratorTrait;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

pub mod migrations;
pub mod repositories;
pub mod tenant;

pub use tenant::TenantContext;

use migrations::{Migrator, TenantMigrator};
use repositories::TenantRegistry;

/// Database connection manager
#[derive(Clone)]
pub struct Database {
    pub connection: Arc<DatabaseConnection>,
    pub backend: DatabaseBackend,
    pub database_type: DatabaseType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    SQLite,
    PostgreSQL,
}

impl Database {
    /// Connect using the configured pool settings
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_type = Self::detect_database_type(&config.url)?;
        let backend = match database_type {
            DatabaseType::SQLite => DatabaseBackend::Sqlite,
            DatabaseType::PostgreSQL => DatabaseBackend::Postgres,
        };

        info!("Connecting to {} database", database_type.as_str());

        let connection_url = match database_type {
            DatabaseType::SQLite => Self::ensure_sqlite_auto_creation(&config.url)?,
            DatabaseType::PostgreSQL => config.url.clone(),
        };

        let mut connect_options = ConnectOptions::new(&connection_url);
        connect_options
            .max_connections(config.max_connections.max(1))
            .min_connections(1)
            .connect_timeout(Duration::from_secs(5))
            .acquire_timeout(config.acquire_timeout()?)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        // Every pooled connection to `:memory:` would be a separate database
        if database_type == DatabaseType::SQLite && Self::is_sqlite_memory(&connection_url) {
            connect_options.max_connections(1);
        }

        let connection = match SeaOrmDatabase::connect(connect_options).await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Database connection failed: {:?}", e);
                let mut source = e.source();
                let mut level = 0;
                while let Some(err) = source {
                    tracing::error!("  Level {}: {}", level, err);
                    source = err.source();
                    level += 1;
                }
                return Err(anyhow::anyhow!(
                    "Failed to connect to {} database: {}",
                    database_type.as_str(),
                    e
                ));
            }
        };

        debug!("Database connection established successfully");

        Ok(Self {
            connection: Arc::new(connection),
            backend,
            database_type,
        })
    }

    fn detect_database_type(url: &str) -> Result<DatabaseType> {
        if url.starts_with("sqlite:") {
            Ok(DatabaseType::SQLite)
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Ok(DatabaseType::PostgreSQL)
        } else {
            anyhow::bail!("Unsupported database URL format: {}", url);
        }
    }

    fn is_sqlite_memory(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }

    /// Ensure a file-backed SQLite URL creates the database file if needed
    fn ensure_sqlite_auto_creation(url: &str) -> Result<String> {
        if url.contains("mode=") || Self::is_sqlite_memory(url) {
            return Ok(url.to_string());
        }

        let file_path = if let Some(path) = url.strip_prefix("sqlite://") {
            path
        } else if let Some(path) = url.strip_prefix("sqlite:") {
            path
        } else {
            anyhow::bail!("Invalid SQLite URL format: {}", url);
        };
        let file_path = file_path.split('?').next().unwrap_or(file_path);

        let path = std::path::Path::new(file_path);
        if path.exists() {
            return Ok(url.to_string());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create directory for SQLite database: {}",
                        parent.display()
                    )
                })?;
                info!("Created directory for SQLite database: {}", parent.display());
            }
        }

        let auto_create_url = if url.contains('?') {
            format!("{url}&mode=rwc")
        } else {
            format!("{url}?mode=rwc")
        };
        debug!("Enabled SQLite auto-creation: {}", auto_create_url);
        Ok(auto_create_url)
    }

    /// Run the registry migrations, then the tenant migrations.
    ///
    /// On PostgreSQL every active tenant's schema is created if missing and
    /// migrated inside its own scoped transaction. On SQLite the tenant
    /// tables live next to the registry and are migrated once.
    pub async fn migrate(&self, registry: &dyn TenantRegistry) -> Result<()> {
        info!(
            "Running registry migrations for {}",
            self.database_type.as_str()
        );
        Migrator::up(&*self.connection, None)
            .await
            .context("Failed to run registry migrations")?;

        match self.database_type {
            DatabaseType::SQLite => {
                TenantMigrator::up(&*self.connection, None)
                    .await
                    .context("Failed to run maintenance migrations")?;
            }
            DatabaseType::PostgreSQL => {
                let tenants = registry
                    .active_tenants()
                    .await
                    .context("Failed to list tenants for migration")?;
                for tenant in tenants {
                    self.migrate_tenant(&tenant).await?;
                }
            }
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    async fn migrate_tenant(&self, tenant: &TenantContext) -> Result<()> {
        info!("Migrating tenant schema '{}'", tenant);

        // DDL cannot take the schema as a parameter; TenantContext only
        // admits plain lower-case identifiers.
        self.connection
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", tenant.schema()),
            ))
            .await
            .with_context(|| format!("Failed to create schema '{tenant}'"))?;

        let txn = tenant.begin(&*self.connection).await?;
        TenantMigrator::up(&txn, None)
            .await
            .with_context(|| format!("Failed to migrate tenant '{tenant}'"))?;
        txn.commit().await?;
        Ok(())
    }

    pub fn connection(&self) -> Arc<DatabaseConnection> {
        self.connection.clone()
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    pub fn database_type(&self) -> DatabaseType {
        self.database_type
    }
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::SQLite => "SQLite",
            DatabaseType::PostgreSQL => "PostgreSQL",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
