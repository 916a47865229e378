//! Email address value object with validation
//!
//! Used for the monitored mailbox and for addresses carried by inbound
//! notifications.
//!
//! # Examples
//!
//! ```
//! use domain::EmailAddress;
//!
//! let email = EmailAddress::new("Segreteria@Parrocchia.IT").unwrap();
//! assert_eq!(email.as_str(), "segreteria@parrocchia.it");
//! assert!(EmailAddress::new("segreteria").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::DomainError;

/// A validated, lower-cased email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(transparent)]
pub struct EmailAddress {
    #[validate(email)]
    value: String,
}

impl EmailAddress {
    /// Create a new email address, validating the format
    ///
    /// Surrounding whitespace is trimmed and the address is lower-cased.
    pub fn new(email: impl Into<String>) -> Result<Self, DomainError> {
        let value = email.into().trim().to_lowercase();

        let candidate = Self { value };
        candidate
            .validate()
            .map_err(|e| DomainError::InvalidEmailAddress(e.to_string()))?;

        Ok(candidate)
    }

    /// Get the email address as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get the local part (before @)
    pub fn local_part(&self) -> &str {
        self.value.split('@').next().unwrap_or("")
    }

    /// Get the domain part (after @)
    ///
    /// ```
    /// use domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("info@parrocchia.it").unwrap();
    /// assert_eq!(email.domain(), "parrocchia.it");
    /// ```
    pub fn domain(&self) -> &str {
        self.value.split('@').nth(1).unwrap_or("")
    }

    /// Compare against a raw, unvalidated address ignoring case and padding
    ///
    /// Folds case the same way [`EmailAddress::new`] does.
    pub fn matches_raw(&self, raw: &str) -> bool {
        self.value == raw.trim().to_lowercase()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_is_accepted() {
        let email = EmailAddress::new("segreteria@parrocchia.it").unwrap();
        assert_eq!(email.as_str(), "segreteria@parrocchia.it");
    }

    #[test]
    fn email_is_normalized() {
        let email = EmailAddress::new("  Don.Marco@Parrocchia.IT ").unwrap();
        assert_eq!(email.as_str(), "don.marco@parrocchia.it");
        assert_eq!(email.local_part(), "don.marco");
        assert_eq!(email.domain(), "parrocchia.it");
    }

    #[test]
    fn invalid_email_is_rejected() {
        assert!(EmailAddress::new("not-an-email").is_err());
        assert!(EmailAddress::new("@nodomain.com").is_err());
        assert!(EmailAddress::new("").is_err());
    }

    #[test]
    fn matches_raw_ignores_case_and_whitespace() {
        let email = EmailAddress::new("segreteria@parrocchia.it").unwrap();
        assert!(email.matches_raw(" SEGRETERIA@parrocchia.it"));
        assert!(!email.matches_raw("altro@parrocchia.it"));
    }

    #[test]
    fn serialization_is_transparent() {
        let email = EmailAddress::new("test@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"test@example.com\"");
        let parsed: EmailAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(email, parsed);
    }

    #[test]
    fn try_from_str() {
        let email: EmailAddress = "test@example.com".try_into().unwrap();
        assert_eq!(email.to_string(), "test@example.com");
    }
}
