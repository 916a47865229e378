//! Admission decisions for inbound notifications

use std::fmt;

use serde::{Deserialize, Serialize};

use super::NotificationEvent;

/// Why a notification was admitted or rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionReason {
    /// Admitted
    Ok,
    /// Automated processing is switched off
    Paused,
    /// Inside a suspension window
    Suspended,
    /// Envelope or payload could not be parsed
    InvalidPayload,
    /// Mailbox address is not a valid email address
    InvalidAddress,
    /// Notification is for a mailbox we do not monitor
    UnmonitoredAccount,
}

impl AdmissionReason {
    /// Stable string code
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Paused => "paused",
            Self::Suspended => "suspended",
            Self::InvalidPayload => "invalid_payload",
            Self::InvalidAddress => "invalid_address",
            Self::UnmonitoredAccount => "unmonitored_account",
        }
    }
}

impl fmt::Display for AdmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the admission filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDecision {
    /// Whether downstream processing should run
    pub should_process: bool,
    /// Reason code
    pub reason: AdmissionReason,
    /// Parsed event, when parsing got that far
    pub event: Option<NotificationEvent>,
}

impl AdmissionDecision {
    /// Admit a parsed event
    pub const fn admit(event: NotificationEvent) -> Self {
        Self {
            should_process: true,
            reason: AdmissionReason::Ok,
            event: Some(event),
        }
    }

    /// Reject with a reason
    pub const fn reject(reason: AdmissionReason, event: Option<NotificationEvent>) -> Self {
        Self {
            should_process: false,
            reason,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes() {
        assert_eq!(AdmissionReason::Ok.to_string(), "ok");
        assert_eq!(AdmissionReason::InvalidPayload.as_str(), "invalid_payload");
        assert_eq!(
            serde_json::to_string(&AdmissionReason::UnmonitoredAccount).unwrap(),
            "\"unmonitored_account\""
        );
    }

    #[test]
    fn reject_never_processes() {
        let decision = AdmissionDecision::reject(AdmissionReason::Suspended, None);
        assert!(!decision.should_process);
        assert_eq!(decision.reason, AdmissionReason::Suspended);
    }
}
