//! Repository implementations for PostgreSQL storage

pub mod otp;
pub mod user;

use async_trait::async_trait;
use otp_core::{
    Error,
    error::{StorageError, utilities::DatabaseResultExt},
    repositories::{RepositoryProvider, UnitOfWork},
};
use otp_migration::MigrationManager;
use sqlx::{PgPool, Postgres, Transaction};

use crate::migrations::{self, PostgresMigrationManager};

/// Repository provider implementation for PostgreSQL
pub struct PostgresRepositoryProvider {
    pool: PgPool,
}

impl PostgresRepositoryProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// One message's transaction on a single pooled connection.
///
/// Dropping it without [`UnitOfWork::commit`] rolls back and returns the
/// connection to the pool.
pub struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn commit(self) -> Result<(), Error> {
        self.tx.commit().await.map_db_err("Failed to commit OTP")
    }
}

#[async_trait]
impl RepositoryProvider for PostgresRepositoryProvider {
    type Unit = PostgresUnitOfWork;

    async fn begin(&self) -> Result<PostgresUnitOfWork, Error> {
        let tx = self.pool.begin().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to acquire database connection");
            Error::Storage(StorageError::Connection(
                "Failed to acquire database connection".to_string(),
            ))
        })?;
        Ok(PostgresUnitOfWork { tx })
    }

    async fn migrate(&self) -> Result<(), Error> {
        let manager = PostgresMigrationManager::new(self.pool.clone());
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
            .map_db_err("Database health check failed")?;
        Ok(())
    }
}
