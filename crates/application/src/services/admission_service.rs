//! Notification admission service
//!
//! Decides, before any expensive work, whether an inbound push notification
//! should be processed. Never fails and never touches the cache or the row
//! source.

use chrono::{DateTime, Utc};
use domain::{
    AdmissionDecision, AdmissionReason, EmailAddress, NotificationEvent, SuspensionPolicy,
};
use tracing::{debug, info, instrument, warn};

/// Settings for [`AdmissionService`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdmissionSettings {
    /// Only notifications for this mailbox are admitted, when set
    pub monitored_account: Option<EmailAddress>,
    /// Reject everything while set
    pub system_paused: bool,
    /// Calendar used by [`AdmissionService::decide_at`]
    pub suspension: SuspensionPolicy,
}

/// Admission filter for inbound notifications
#[derive(Debug, Clone, Default)]
pub struct AdmissionService {
    settings: AdmissionSettings,
}

impl AdmissionService {
    /// Create a new admission service
    #[must_use]
    pub const fn new(settings: AdmissionSettings) -> Self {
        Self { settings }
    }

    /// Get the service settings
    pub const fn settings(&self) -> &AdmissionSettings {
        &self.settings
    }

    /// Whether the configured calendar suspends processing at `now`
    pub fn is_suspended_at(&self, now: DateTime<Utc>) -> bool {
        self.settings.suspension.is_suspended(now)
    }

    /// Decide using the configured calendar at `now`
    pub fn decide_at(&self, raw_envelope: &[u8], now: DateTime<Utc>) -> AdmissionDecision {
        self.decide(raw_envelope, self.is_suspended_at(now))
    }

    /// Decide whether a notification should be processed
    ///
    /// Checks run in order: manual pause, suspension window, envelope
    /// parsing, address validation, monitored account. The first failing
    /// check names the rejection reason.
    #[instrument(skip(self, raw_envelope), fields(bytes = raw_envelope.len()), level = "debug")]
    pub fn decide(&self, raw_envelope: &[u8], in_suspension_window: bool) -> AdmissionDecision {
        if self.settings.system_paused {
            info!("System paused, notification not processed");
            let event = NotificationEvent::from_envelope(raw_envelope).ok();
            return AdmissionDecision::reject(AdmissionReason::Paused, event);
        }

        if in_suspension_window {
            debug!("Inside suspension window, notification not processed");
            let event = NotificationEvent::from_envelope(raw_envelope).ok();
            return AdmissionDecision::reject(AdmissionReason::Suspended, event);
        }

        let event = match NotificationEvent::from_envelope(raw_envelope) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Rejecting notification with invalid payload");
                return AdmissionDecision::reject(AdmissionReason::InvalidPayload, None);
            },
        };

        let address = match EmailAddress::new(event.email_address.as_str()) {
            Ok(address) => address,
            Err(e) => {
                warn!(address = %event.email_address, error = %e, "Rejecting notification with invalid address");
                return AdmissionDecision::reject(AdmissionReason::InvalidAddress, Some(event));
            },
        };

        if let Some(monitored) = self
            .settings
            .monitored_account
            .as_ref()
            .filter(|monitored| !monitored.matches_raw(&event.email_address))
        {
            warn!(
                address = %address,
                monitored = %monitored,
                "Notification for a different account"
            );
            return AdmissionDecision::reject(AdmissionReason::UnmonitoredAccount, Some(event));
        }

        debug!(
            address = %address,
            history_id = event.history_id.as_deref().unwrap_or(""),
            "Notification admitted"
        );
        AdmissionDecision::admit(event)
    }
}
