//! Versioned schema migrations shared by the storage backends.
//!
//! Each backend implements [`MigrationManager`] for its database and keeps a
//! list of [`Migration`]s ordered by version. Applied versions are tracked in
//! [`MIGRATION_TABLE`].
use async_trait::async_trait;
use sqlx::Database;
use thiserror::Error;

/// Table recording applied migration versions.
pub const MIGRATION_TABLE: &str = "_otp_migrations";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Migration versions out of order: {previous} is followed by {next}")]
    Ordering { previous: i64, next: i64 },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[async_trait]
pub trait Migration<DB: Database>: Send + Sync {
    /// Execute the migration
    async fn up<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Rollback the migration
    async fn down<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Unique version number for ordering migrations
    fn version(&self) -> i64;

    /// Human readable name of the migration
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    /// Unix timestamp, so every backend stores it the same way.
    pub applied_at: i64,
}

#[async_trait]
pub trait MigrationManager<DB: Database>: Send + Sync {
    fn get_migration_table_name(&self) -> &str {
        MIGRATION_TABLE
    }

    /// Initialize migration tracking table
    async fn initialize(&self) -> Result<()>;

    /// Apply pending migrations
    async fn up(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Rollback migrations
    async fn down(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Get list of applied migrations
    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>>;

    /// Check if specific migration was applied
    async fn is_applied(&self, version: i64) -> Result<bool>;
}

/// Reject migration lists whose versions are not strictly increasing.
pub fn check_order<DB: Database>(migrations: &[Box<dyn Migration<DB>>]) -> Result<()> {
    for pair in migrations.windows(2) {
        let (previous, next) = (pair[0].version(), pair[1].version());
        if next <= previous {
            return Err(MigrationError::Ordering { previous, next });
        }
    }
    Ok(())
}

/// Migrations whose version does not appear in `applied`, in list order.
pub fn pending<'a, DB: Database>(
    migrations: &'a [Box<dyn Migration<DB>>],
    applied: &[MigrationRecord],
) -> Vec<&'a dyn Migration<DB>> {
    migrations
        .iter()
        .filter(|m| !applied.iter().any(|r| r.version == m.version()))
        .map(|m| m.as_ref())
        .collect()
}
