//! # OTP worker
//!
//! Entry point for the queue trigger. Each invocation carries a batch of
//! records whose bodies look like `{"email": "...", "type": "..."}`. For every
//! record the worker resolves the user, issues a six digit code valid for ten
//! minutes, stores it and emails it. Records fail independently and the
//! trigger always receives `{"statusCode": 200, "body": "All messages processed"}`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use otp_core::{MailerOtpNotifier, OtpDispatchService};
//! use otp_storage_sqlite::SqliteRepositoryProvider;
//!
//! # async fn run() -> Result<(), otp_core::Error> {
//! let pool = otp_storage_sqlite::connect("sqlite::memory:").await?;
//! let service = OtpDispatchService::new(
//!     Arc::new(SqliteRepositoryProvider::new(pool)),
//!     Arc::new(MailerOtpNotifier::from_env()?),
//! );
//!
//! let payload = r#"{"Records":[{"messageId":"m-1","body":"{\"email\":\"a@x.com\"}"}]}"#;
//! let response = otp_worker::handle_event(&service, payload).await?;
//! assert_eq!(response.status_code, 200);
//! # Ok(())
//! # }
//! ```
pub mod event;
pub mod telemetry;

pub use event::{QueueEvent, QueueRecord};
pub use telemetry::{LogFormat, init_tracing};

use otp_core::{BatchResponse, Error, OtpDispatchService, OtpNotifier, RepositoryProvider};

/// Decode a trigger payload, process every record and build the response.
///
/// Only an undecodable envelope is an error; per-record failures are logged
/// and folded into the batch.
pub async fn handle_event<R, N>(
    service: &OtpDispatchService<R, N>,
    payload: &str,
) -> Result<BatchResponse, Error>
where
    R: RepositoryProvider,
    N: OtpNotifier,
{
    let messages = QueueEvent::from_json(payload)?.into_messages();
    let report = service.process_batch(&messages).await;
    Ok(report.into_response())
}
