pub mod utilities;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(String),
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Failed to build notification: {0}")]
    Build(String),

    #[error("Failed to deliver notification: {0}")]
    Delivery(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidVar { name: String, reason: String },
}

impl Error {
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_generation_error(&self) -> bool {
        matches!(self, Error::Generation(_))
    }

    pub fn is_notification_error(&self) -> bool {
        matches!(self, Error::Notification(_))
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Stage at which a single queue message stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStage {
    Parse,
    Lookup,
    Generate,
    Persist,
    Notify,
}

impl MessageStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStage::Parse => "parse",
            MessageStage::Lookup => "lookup",
            MessageStage::Generate => "generate",
            MessageStage::Persist => "persist",
            MessageStage::Notify => "notify",
        }
    }
}

impl std::fmt::Display for MessageStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one message inside a batch. Never aborts the batch.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Failed to parse message: {0}")]
    Parse(#[source] Error),

    #[error("Failed to look up user: {0}")]
    Lookup(#[source] Error),

    #[error("Failed to generate OTP: {0}")]
    Generation(#[source] Error),

    #[error("Failed to persist OTP: {0}")]
    Persistence(#[source] Error),

    #[error("Failed to send OTP: {0}")]
    Notification(#[source] Error),
}

impl MessageError {
    pub fn stage(&self) -> MessageStage {
        match self {
            MessageError::Parse(_) => MessageStage::Parse,
            MessageError::Lookup(_) => MessageStage::Lookup,
            MessageError::Generation(_) => MessageStage::Generate,
            MessageError::Persistence(_) => MessageStage::Persist,
            MessageError::Notification(_) => MessageStage::Notify,
        }
    }

    pub fn inner(&self) -> &Error {
        match self {
            MessageError::Parse(e)
            | MessageError::Lookup(e)
            | MessageError::Generation(e)
            | MessageError::Persistence(e)
            | MessageError::Notification(e) => e,
        }
    }
}
