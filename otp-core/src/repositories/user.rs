use crate::{Error, UserId};
use async_trait::async_trait;

/// Read access to the external user store.
#[async_trait]
pub trait UserRepository: Send {
    /// Resolve an email to a user id; `None` when no user has that email.
    async fn find_id_by_email(&mut self, email: &str) -> Result<Option<UserId>, Error>;
}
