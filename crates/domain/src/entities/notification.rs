//! Inbound mailbox change notification
//!
//! The push envelope is a JSON object whose `message.data` field carries a
//! base64-encoded JSON document naming the mailbox that changed:
//!
//! ```json
//! {"message": {"data": "eyJlbWFpbEFkZHJlc3MiOi4uLn0=", "messageId": "1"}}
//! ```

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE},
};
use serde::Deserialize;

use crate::errors::DomainError;

/// Parsed push notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Mailbox address exactly as received
    pub email_address: String,
    /// Mailbox history cursor, numeric ids are rendered as strings
    pub history_id: Option<String>,
    /// Push message id
    pub message_id: Option<String>,
    /// Push publish time as sent by the broker
    pub publish_time: Option<String>,
    /// Envelope bytes the event was parsed from
    pub raw: Vec<u8>,
}

#[derive(Deserialize)]
struct Envelope {
    message: PushMessage,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushMessage {
    data: String,
    #[serde(default, alias = "message_id")]
    message_id: Option<String>,
    #[serde(default, alias = "publish_time")]
    publish_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MailboxChange {
    email_address: String,
    #[serde(default)]
    history_id: Option<HistoryId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryId {
    Text(String),
    Number(u64),
}

impl From<HistoryId> for String {
    fn from(id: HistoryId) -> Self {
        match id {
            HistoryId::Text(text) => text,
            HistoryId::Number(number) => number.to_string(),
        }
    }
}

impl NotificationEvent {
    /// Parse a push envelope
    ///
    /// Fails with [`DomainError::InvalidEnvelope`] when the envelope, the
    /// encoded payload or the mailbox address is missing or malformed, or
    /// when the address is blank.
    pub fn from_envelope(raw: &[u8]) -> Result<Self, DomainError> {
        let envelope: Envelope = serde_json::from_slice(raw)
            .map_err(|e| DomainError::envelope(format!("envelope: {e}")))?;

        let data = envelope.message.data.trim();
        let payload = STANDARD
            .decode(data)
            .or_else(|_| URL_SAFE.decode(data))
            .map_err(|e| DomainError::envelope(format!("message.data: {e}")))?;

        let change: MailboxChange = serde_json::from_slice(&payload)
            .map_err(|e| DomainError::envelope(format!("payload: {e}")))?;

        if change.email_address.trim().is_empty() {
            return Err(DomainError::envelope("emailAddress is blank"));
        }

        Ok(Self {
            email_address: change.email_address,
            history_id: change.history_id.map(String::from),
            message_id: envelope.message.message_id,
            publish_time: envelope.message.publish_time,
            raw: raw.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(payload: &str) -> Vec<u8> {
        let data = STANDARD.encode(payload);
        format!(r#"{{"message":{{"data":"{data}","messageId":"42","publishTime":"2025-03-03T09:00:00Z"}}}}"#)
            .into_bytes()
    }

    #[test]
    fn parses_valid_envelope() {
        let raw = envelope(r#"{"emailAddress":"info@parrocchia.it","historyId":"1234"}"#);
        let event = NotificationEvent::from_envelope(&raw).unwrap();
        assert_eq!(event.email_address, "info@parrocchia.it");
        assert_eq!(event.history_id.as_deref(), Some("1234"));
        assert_eq!(event.message_id.as_deref(), Some("42"));
        assert_eq!(event.publish_time.as_deref(), Some("2025-03-03T09:00:00Z"));
        assert_eq!(event.raw, raw);
    }

    #[test]
    fn numeric_history_id_is_accepted() {
        let raw = envelope(r#"{"emailAddress":"info@parrocchia.it","historyId":98765}"#);
        let event = NotificationEvent::from_envelope(&raw).unwrap();
        assert_eq!(event.history_id.as_deref(), Some("98765"));
    }

    #[test]
    fn history_id_is_optional() {
        let raw = envelope(r#"{"emailAddress":"info@parrocchia.it"}"#);
        assert!(NotificationEvent::from_envelope(&raw).unwrap().history_id.is_none());
    }

    #[test]
    fn url_safe_data_is_accepted() {
        let data = URL_SAFE.encode(r#"{"emailAddress":"info@parrocchia.it","historyId":"??>>"}"#);
        let raw = format!(r#"{{"message":{{"data":"{data}"}}}}"#);
        let event = NotificationEvent::from_envelope(raw.as_bytes()).unwrap();
        assert_eq!(event.history_id.as_deref(), Some("??>>"));
    }

    #[test]
    fn missing_message_is_rejected() {
        let err = NotificationEvent::from_envelope(br#"{"subscription":"x"}"#).unwrap_err();
        assert!(matches!(err, DomainError::InvalidEnvelope(_)));
    }

    #[test]
    fn missing_data_is_rejected() {
        assert!(NotificationEvent::from_envelope(br#"{"message":{}}"#).is_err());
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(NotificationEvent::from_envelope(br#"{"message":{"data":"%%%"}}"#).is_err());
    }

    #[test]
    fn non_json_payload_is_rejected() {
        let data = STANDARD.encode("not json");
        let raw = format!(r#"{{"message":{{"data":"{data}"}}}}"#);
        assert!(NotificationEvent::from_envelope(raw.as_bytes()).is_err());
    }

    #[test]
    fn missing_or_non_string_address_is_rejected() {
        assert!(NotificationEvent::from_envelope(&envelope(r#"{"historyId":"1"}"#)).is_err());
        assert!(NotificationEvent::from_envelope(&envelope(r#"{"emailAddress":7}"#)).is_err());
    }

    #[test]
    fn blank_address_is_rejected() {
        assert!(NotificationEvent::from_envelope(&envelope(r#"{"emailAddress":"  "}"#)).is_err());
    }

    #[test]
    fn non_json_envelope_is_rejected() {
        assert!(NotificationEvent::from_envelope(b"\xff\xfe").is_err());
    }
}
