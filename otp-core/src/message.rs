//! Inbound queue messages and the request they carry.
use serde::{Deserialize, Serialize};

use crate::{
    Error, OtpType,
    error::{ValidationError, utilities::RequiredFieldExt},
};

/// One raw message as delivered by the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: Option<String>,
    pub body: String,
}

impl InboundMessage {
    pub fn new(message_id: Option<String>, body: impl Into<String>) -> Self {
        Self {
            message_id,
            body: body.into(),
        }
    }

    /// Identifier used in logs; falls back to `-` when the queue supplied none.
    pub fn log_id(&self) -> &str {
        self.message_id.as_deref().unwrap_or("-")
    }

    /// Decode the body into an [`OtpRequest`].
    pub fn parse(&self) -> Result<OtpRequest, Error> {
        OtpRequest::from_json(&self.body)
    }
}

impl From<&str> for InboundMessage {
    fn from(body: &str) -> Self {
        Self::new(None, body)
    }
}

impl From<String> for InboundMessage {
    fn from(body: String) -> Self {
        Self::new(None, body)
    }
}

#[derive(Deserialize)]
struct RawOtpRequest {
    email: Option<String>,
    #[serde(rename = "type")]
    otp_type: Option<OtpType>,
}

/// A request to issue a code to the user owning `email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpRequest {
    pub email: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub otp_type: Option<OtpType>,
}

impl OtpRequest {
    pub fn from_json(body: &str) -> Result<Self, Error> {
        let raw: RawOtpRequest = serde_json::from_str(body)
            .map_err(|e| ValidationError::MalformedPayload(e.to_string()))?;

        let email = raw
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .require_field("email")?;

        Ok(Self {
            email,
            otp_type: raw.otp_type,
        })
    }

    pub fn otp_type_or_default(&self) -> OtpType {
        self.otp_type.clone().unwrap_or_default()
    }
}
