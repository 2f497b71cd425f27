//! Repository traits for the data access layer
//!
//! Storage backends hand out one [`UnitOfWork`] per message. It owns a single
//! pooled connection with an open transaction: the user lookup and the OTP
//! insert run on it, [`UnitOfWork::commit`] makes the insert durable, and
//! dropping it without committing rolls back and returns the connection to
//! the pool. Every message therefore gets its own scoped resources however
//! processing ends.

pub mod otp;
pub mod user;

pub use otp::OtpRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

/// Per-message transactional scope.
#[async_trait]
pub trait UnitOfWork: UserRepository + OtpRepository + Sized {
    /// Commit everything written through this unit.
    async fn commit(self) -> Result<(), Error>;
}

/// Provider trait that storage implementations must implement.
///
/// # Example
///
/// ```rust,ignore
/// use otp_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     type Unit = MyUnit;
///     async fn begin(&self) -> Result<MyUnit, Error> { /* ... */ }
///     async fn migrate(&self) -> Result<(), Error> { /* ... */ }
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: Send + Sync + 'static {
    type Unit: UnitOfWork;

    /// Acquire a connection and open a transaction for one message.
    async fn begin(&self) -> Result<Self::Unit, Error>;

    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), Error>;

    /// Health check for the underlying store
    async fn health_check(&self) -> Result<(), Error>;
}
