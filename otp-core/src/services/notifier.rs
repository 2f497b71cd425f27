use async_trait::async_trait;

use crate::{Error, OtpRecord};

/// Delivers an issued code to its owner.
///
/// Delivery is fire-and-forget: `Ok` means the transport accepted the
/// message, not that it reached the inbox.
#[async_trait]
pub trait OtpNotifier: Send + Sync + 'static {
    async fn send_otp(&self, to: &str, record: &OtpRecord) -> Result<(), Error>;
}
