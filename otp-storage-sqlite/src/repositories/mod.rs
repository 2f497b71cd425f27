//! Repository implementations for SQLite storage

pub mod otp;
pub mod user;

use async_trait::async_trait;
use otp_core::{
    Error,
    error::{StorageError, utilities::DatabaseResultExt},
    repositories::{RepositoryProvider, UnitOfWork},
};
use otp_migration::MigrationManager;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::migrations::{self, SqliteMigrationManager};

/// Repository provider implementation for SQLite
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// One message's transaction on a single pooled connection.
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn commit(self) -> Result<(), Error> {
        self.tx.commit().await.map_db_err("Failed to commit OTP")
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    type Unit = SqliteUnitOfWork;

    async fn begin(&self) -> Result<SqliteUnitOfWork, Error> {
        let tx = self.pool.begin().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to acquire database connection");
            Error::Storage(StorageError::Connection(
                "Failed to acquire database connection".to_string(),
            ))
        })?;
        Ok(SqliteUnitOfWork { tx })
    }

    async fn migrate(&self) -> Result<(), Error> {
        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        manager.up(&migrations::all()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(())
    }
}
