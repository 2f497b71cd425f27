use crate::{
    Error,
    error::{StorageError, ValidationError},
};

/// Extension trait for mapping driver errors into storage errors.
///
/// The driver error is logged with `context` and replaced by a short
/// `StorageError::Database` so connection details never travel further.
///
/// # Example
///
/// ```rust,ignore
/// use otp_core::error::utilities::DatabaseResultExt;
///
/// query.execute(&mut *tx).await.map_db_err("Failed to insert OTP")?;
/// ```
pub trait DatabaseResultExt<T> {
    fn map_db_err(self, context: &str) -> Result<T, Error>;
}

impl<T, E: std::fmt::Display> DatabaseResultExt<T> for Result<T, E> {
    fn map_db_err(self, context: &str) -> Result<T, Error> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{context}");
            Error::Storage(StorageError::Database(context.to_string()))
        })
    }
}

/// Converts `None` into `ValidationError::MissingField`.
pub trait RequiredFieldExt<T> {
    fn require_field(self, field_name: &str) -> Result<T, ValidationError>;
}

impl<T> RequiredFieldExt<T> for Option<T> {
    fn require_field(self, field_name: &str) -> Result<T, ValidationError> {
        self.ok_or_else(|| ValidationError::MissingField(field_name.to_string()))
    }
}
