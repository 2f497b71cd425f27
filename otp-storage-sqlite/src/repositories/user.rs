use async_trait::async_trait;
use otp_core::{
    Error, UserId, error::utilities::DatabaseResultExt, repositories::UserRepository,
};

use super::SqliteUnitOfWork;

#[async_trait]
impl UserRepository for SqliteUnitOfWork {
    async fn find_id_by_email(&mut self, email: &str) -> Result<Option<UserId>, Error> {
        let id: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await
            .map_db_err("Failed to look up user")?;

        Ok(id.map(UserId::from))
    }
}
