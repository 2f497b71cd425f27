//! SQLite storage backend for the OTP dispatch worker
//!
//! Used for local runs and integration tests. OTP timestamps are stored as
//! unix microseconds so records read back unchanged.
pub mod migrations;
pub mod repositories;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use otp_core::{
    Error, OtpRecord, OtpType, UserId,
    error::{StorageError, utilities::DatabaseResultExt},
};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use repositories::{SqliteRepositoryProvider, SqliteUnitOfWork};

/// Open a pool for `database_url`, creating the database file when missing.
///
/// In-memory databases are private to a connection, so they get a pool of
/// one connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_db_err("Invalid SQLite connection string")?
        .create_if_missing(true);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };

    pool_options.connect_with(options).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to connect to SQLite");
        Error::Storage(StorageError::Connection(
            "Failed to connect to SQLite".to_string(),
        ))
    })
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SqliteOtpCode {
    pub id: String,
    pub user_id: String,
    pub code: String,
    #[sqlx(rename = "type")]
    pub otp_type: String,
    pub expires_at: i64,
    pub created_at: i64,
}

fn from_unix_micros(column: &str, micros: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        Error::Storage(StorageError::Database(format!(
            "Invalid timestamp in {column}"
        )))
    })
}

impl TryFrom<SqliteOtpCode> for OtpRecord {
    type Error = Error;

    fn try_from(row: SqliteOtpCode) -> Result<Self, Self::Error> {
        Ok(OtpRecord::from_storage(
            row.id,
            UserId::from(row.user_id),
            row.code,
            OtpType::from(row.otp_type),
            from_unix_micros("created_at", row.created_at)?,
            from_unix_micros("expires_at", row.expires_at)?,
        ))
    }
}
