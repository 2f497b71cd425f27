//! Batch processing of OTP requests
//!
//! Each message moves through `Received → Parsed → UserResolved → OtpCreated →
//! Persisted → Notified`. An unknown email ends it as skipped; any error ends
//! it as failed. Neither stops the batch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::{
    OtpPolicy, OtpRecord, UserId,
    error::MessageError,
    id::{IdGenerator, OsRngIdGenerator},
    message::InboundMessage,
    repositories::{OtpRepository, RepositoryProvider, UnitOfWork, UserRepository},
    services::OtpNotifier,
};

/// Body returned to the invoking trigger once every message was attempted.
pub const BATCH_RESPONSE_BODY: &str = "All messages processed";

/// How a single message ended.
#[derive(Debug)]
pub enum MessageOutcome {
    /// Code persisted and handed to the notifier.
    Delivered { otp_id: String, user_id: UserId },
    /// No user owns the email. Not a failure.
    Skipped { email: String },
    /// Processing stopped early. A `Notification` failure leaves the record persisted.
    Failed {
        email: Option<String>,
        error: MessageError,
    },
}

impl MessageOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, MessageOutcome::Delivered { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, MessageOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MessageOutcome::Failed { .. })
    }
}

/// Outcomes of one batch, in delivery order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<MessageOutcome>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_delivered()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MessageError> {
        self.outcomes.iter().filter_map(|o| match o {
            MessageOutcome::Failed { error, .. } => Some(error),
            _ => None,
        })
    }

    /// The trigger response. Always a success once the batch was attempted.
    pub fn into_response(self) -> BatchResponse {
        BatchResponse::default()
    }
}

/// Response handed back to the queue trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl Default for BatchResponse {
    fn default() -> Self {
        Self {
            status_code: 200,
            body: BATCH_RESPONSE_BODY.to_string(),
        }
    }
}

/// Issues, stores and sends a passcode for every queued request.
pub struct OtpDispatchService<R: RepositoryProvider, N: OtpNotifier> {
    repositories: Arc<R>,
    notifier: Arc<N>,
    policy: OtpPolicy,
    ids: Arc<dyn IdGenerator>,
}

impl<R: RepositoryProvider, N: OtpNotifier> OtpDispatchService<R, N> {
    pub fn new(repositories: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            repositories,
            notifier,
            policy: OtpPolicy::default(),
            ids: Arc::new(OsRngIdGenerator),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_policy(mut self, policy: OtpPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &OtpPolicy {
        &self.policy
    }

    /// Process every message in order. Never fails and never stops early.
    pub async fn process_batch(&self, messages: &[InboundMessage]) -> BatchReport {
        tracing::info!(count = messages.len(), "Processing OTP batch");

        let mut report = BatchReport {
            outcomes: Vec::with_capacity(messages.len()),
        };
        for message in messages {
            report.outcomes.push(self.process_message(message).await);
        }

        tracing::info!(
            delivered = report.delivered(),
            skipped = report.skipped(),
            failed = report.failed(),
            "OTP batch processed"
        );
        report
    }

    /// Process a single message, converting every error into an outcome.
    pub async fn process_message(&self, message: &InboundMessage) -> MessageOutcome {
        let span = tracing::info_span!("otp_message", message_id = %message.log_id());
        async {
            let request = match message.parse() {
                Ok(request) => request,
                Err(e) => {
                    tracing::error!(error = %e, "Discarding malformed message");
                    return MessageOutcome::Failed {
                        email: None,
                        error: MessageError::Parse(e),
                    };
                }
            };

            match self.issue(&request.email, request.otp_type_or_default()).await {
                Ok(Some(record)) => MessageOutcome::Delivered {
                    otp_id: record.id().to_string(),
                    user_id: record.user_id().clone(),
                },
                Ok(None) => MessageOutcome::Skipped {
                    email: request.email,
                },
                Err(error) => {
                    tracing::error!(
                        email = %request.email,
                        stage = %error.stage(),
                        error = %error,
                        "Error processing OTP request"
                    );
                    MessageOutcome::Failed {
                        email: Some(request.email),
                        error,
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Resolve, create, persist and notify. `Ok(None)` when the user is unknown.
    async fn issue(
        &self,
        email: &str,
        otp_type: crate::OtpType,
    ) -> Result<Option<OtpRecord>, MessageError> {
        let record = {
            let mut unit = self
                .repositories
                .begin()
                .await
                .map_err(MessageError::Lookup)?;

            let Some(user_id) = unit
                .find_id_by_email(email)
                .await
                .map_err(MessageError::Lookup)?
            else {
                tracing::info!(email = %email, "User not found for email");
                return Ok(None);
            };

            let record =
                OtpRecord::create_with(user_id, otp_type, &self.policy, self.ids.as_ref())
                    .map_err(MessageError::Generation)?;

            unit.insert(&record)
                .await
                .map_err(MessageError::Persistence)?;
            unit.commit().await.map_err(MessageError::Persistence)?;

            tracing::info!(
                user_id = %record.user_id(),
                otp_id = %record.id(),
                "OTP stored"
            );
            record
        };

        // The unit is gone by now, so the connection is back in the pool
        // while the mail transport runs.
        self.notifier
            .send_otp(email, &record)
            .await
            .map_err(MessageError::Notification)?;

        tracing::info!(email = %email, otp_id = %record.id(), "OTP sent");
        Ok(Some(record))
    }
}
