//! Core functionality for the OTP dispatch worker
//!
//! This crate issues one-time passcodes and processes batches of queued
//! requests for them. It owns the domain types ([`OtpRecord`], [`OtpCode`],
//! [`UserId`]), the repository traits storage backends implement, and the
//! [`OtpDispatchService`] that ties lookup, issuance, persistence and
//! notification together.
//!
//! Storage lives in the `otp-storage-*` crates; email delivery is available
//! through the `mailer` feature.
pub mod error;
pub mod id;
pub mod message;
pub mod otp;
pub mod repositories;
pub mod services;
pub mod user;

pub use error::{Error, MessageError, MessageStage};
pub use id::{IdGenerator, OsRngIdGenerator};
pub use message::{InboundMessage, OtpRequest};
pub use otp::{
    DEFAULT_CODE_LENGTH, DEFAULT_VALIDITY, OtpCode, OtpPolicy, OtpRecord, OtpType,
    create_otp_record, generate_code, generate_code_with_rng,
};
pub use repositories::{OtpRepository, RepositoryProvider, UnitOfWork, UserRepository};
pub use services::{
    BatchReport, BatchResponse, MessageOutcome, OtpDispatchService, OtpNotifier,
};
pub use user::UserId;

#[cfg(feature = "mailer")]
pub use services::MailerOtpNotifier;
