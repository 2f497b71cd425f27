use async_trait::async_trait;
use otp_core::{
    Error, OtpRecord, UserId,
    error::{StorageError, utilities::DatabaseResultExt},
    repositories::OtpRepository,
};

use super::SqliteUnitOfWork;
use crate::SqliteOtpCode;

#[async_trait]
impl OtpRepository for SqliteUnitOfWork {
    async fn insert(&mut self, record: &OtpRecord) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO otp_codes (id, user_id, code, type, expires_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(record.id())
        .bind(record.user_id().as_str())
        .bind(record.code().as_str())
        .bind(record.otp_type().as_str())
        .bind(record.expires_at().timestamp_micros())
        .bind(record.created_at().timestamp_micros())
        .execute(&mut *self.tx)
        .await;

        match result {
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                tracing::error!(
                    error = %e,
                    user_id = %record.user_id(),
                    "OTP references unknown user"
                );
                Err(StorageError::Constraint("Unknown user for OTP".to_string()).into())
            }
            other => other.map(|_| ()).map_db_err("Failed to insert OTP"),
        }
    }
}

impl super::SqliteRepositoryProvider {
    /// Every code issued to `user_id`, oldest first.
    pub async fn find_otps_for_user(&self, user_id: &UserId) -> Result<Vec<OtpRecord>, Error> {
        let rows = sqlx::query_as::<_, SqliteOtpCode>(
            r#"
            SELECT id, user_id, code, type, expires_at, created_at
            FROM otp_codes
            WHERE user_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(self.pool())
        .await
        .map_db_err("Failed to fetch OTPs")?;

        rows.into_iter().map(OtpRecord::try_from).collect()
    }
}
