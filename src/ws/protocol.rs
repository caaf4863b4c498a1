//! Wire frames for the real-time channel
//!
//! Each frame is a JSON object discriminated by a `type` field. Inbound
//! and outbound frames are closed tagged enums so dispatch is exhaustive
//! and new kinds cannot be silently mishandled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::AccountId;

/// Client → server frames
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// Handshake carrying an identity token
    #[serde(rename = "AUTH")]
    Auth { token: Option<String> },

    /// Directed message to another identity
    #[serde(rename = "SEND")]
    Send { payload: Option<SendPayload> },
}

/// Payload of a `SEND` frame. Fields stay optional through parsing so
/// the router can report exactly which one is missing.
#[derive(Debug, PartialEq, Deserialize)]
pub struct SendPayload {
    #[serde(rename = "toIdentity")]
    pub to_identity: Option<AccountId>,
    /// May be the empty string, but must be present
    pub text: Option<String>,
}

/// Server → client frames
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    #[serde(rename = "AUTH_SUCCESS")]
    AuthSuccess { payload: AuthSuccessPayload },

    #[serde(rename = "AUTH_FAIL")]
    AuthFail { payload: NoticePayload },

    #[serde(rename = "INCOMING_MESSAGE")]
    IncomingMessage { payload: IncomingMessagePayload },

    #[serde(rename = "MESSAGE_SENT")]
    MessageSent { payload: MessageSentPayload },

    #[serde(rename = "RECIPIENT_OFFLINE")]
    RecipientOffline { payload: RecipientOfflinePayload },

    #[serde(rename = "ERROR")]
    Error { payload: NoticePayload },
}

#[derive(Debug, Serialize)]
pub struct AuthSuccessPayload {
    pub identity: AccountId,
}

#[derive(Debug, Serialize)]
pub struct NoticePayload {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessagePayload {
    pub from_identity: AccountId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSentPayload {
    pub to_identity: AccountId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientOfflinePayload {
    pub to_identity: AccountId,
}

impl ServerFrame {
    pub fn auth_success(identity: AccountId) -> Self {
        Self::AuthSuccess {
            payload: AuthSuccessPayload { identity },
        }
    }

    pub fn auth_fail(message: impl Into<String>) -> Self {
        Self::AuthFail {
            payload: NoticePayload {
                message: message.into(),
            },
        }
    }

    pub fn incoming_message(
        from_identity: AccountId,
        text: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::IncomingMessage {
            payload: IncomingMessagePayload {
                from_identity,
                text,
                timestamp,
            },
        }
    }

    pub fn message_sent(to_identity: AccountId, text: String, timestamp: DateTime<Utc>) -> Self {
        Self::MessageSent {
            payload: MessageSentPayload {
                to_identity,
                text,
                timestamp,
            },
        }
    }

    pub fn recipient_offline(to_identity: AccountId) -> Self {
        Self::RecipientOffline {
            payload: RecipientOfflinePayload { to_identity },
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            payload: NoticePayload {
                message: message.into(),
            },
        }
    }
}

/// Why an inbound frame could not be dispatched
#[derive(Debug, PartialEq, Eq)]
pub enum FrameParseError {
    /// Not JSON, no `type` discriminator, or a recognized type with an
    /// unusable payload shape
    Invalid,
    /// Parseable frame with an unrecognized `type`
    UnknownType(String),
}

/// Parse an inbound text frame into a [`ClientFrame`].
pub fn parse_client_frame(text: &str) -> Result<ClientFrame, FrameParseError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| FrameParseError::Invalid)?;

    match serde_json::from_value::<ClientFrame>(value.clone()) {
        Ok(frame) => Ok(frame),
        Err(_) => match value.get("type").and_then(|t| t.as_str()) {
            Some(kind) if !matches!(kind, "AUTH" | "SEND") => {
                Err(FrameParseError::UnknownType(kind.to_string()))
            }
            _ => Err(FrameParseError::Invalid),
        },
    }
}
