//! Service layer
//!
//! [`OtpDispatchService`] drives a batch through lookup, issuance, storage and
//! notification. Delivery is abstracted behind [`OtpNotifier`]; the
//! `mailer` feature provides an email implementation on top of `otp-mailer`.

pub mod dispatch;
pub mod mailer;
pub mod notifier;

pub use dispatch::{BatchReport, BatchResponse, MessageOutcome, OtpDispatchService};
pub use notifier::OtpNotifier;

#[cfg(feature = "mailer")]
pub use mailer::MailerOtpNotifier;
