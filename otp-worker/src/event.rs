//! The queue trigger payload.
use otp_core::{Error, InboundMessage, error::ValidationError};
use serde::{Deserialize, Serialize};

/// A batch as delivered by the queue trigger.
///
/// ```json
/// {"Records": [{"messageId": "059f36b4", "body": "{\"email\":\"a@x.com\"}"}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<QueueRecord>,
}

/// One queue record. Attributes other than the id and body are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRecord {
    #[serde(rename = "messageId", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub body: String,
}

impl QueueEvent {
    /// Decode the event envelope. Record bodies are left untouched so each
    /// one can fail on its own later.
    pub fn from_json(payload: &str) -> Result<Self, Error> {
        serde_json::from_str(payload).map_err(|e| {
            ValidationError::MalformedPayload(format!("Invalid queue event: {e}")).into()
        })
    }

    pub fn into_messages(self) -> Vec<InboundMessage> {
        self.records.into_iter().map(InboundMessage::from).collect()
    }
}

impl From<QueueRecord> for InboundMessage {
    fn from(record: QueueRecord) -> Self {
        InboundMessage::new(record.message_id, record.body)
    }
}
