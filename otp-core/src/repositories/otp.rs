use crate::{Error, OtpRecord};
use async_trait::async_trait;

/// Write access to the `otp_codes` table.
#[async_trait]
pub trait OtpRepository: Send {
    /// Insert a single record. Not durable until the owning unit commits.
    async fn insert(&mut self, record: &OtpRecord) -> Result<(), Error>;
}
