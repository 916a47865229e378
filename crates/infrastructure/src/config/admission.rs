//! Admission filter and suspension calendar configuration

use std::collections::BTreeMap;

use application::{AdmissionSettings, ApplicationError};
use chrono::Weekday;
use chrono_tz::Tz;
use domain::{DatePeriod, EmailAddress, HourWindow, MonthDay, SuspensionPolicy};
use serde::{Deserialize, Serialize};

/// Admission filter switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionAppConfig {
    /// Only notifications for this mailbox are processed
    #[serde(default)]
    pub monitored_account: Option<String>,

    /// Global pause switch
    #[serde(default)]
    pub system_paused: bool,
}

/// Period given as `MM-DD` strings; wraps the year end when `start > end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodConfig {
    /// First day, `MM-DD`
    pub start: String,
    /// Last day, `MM-DD`
    pub end: String,
}

/// Suspension calendar
///
/// `windows` maps English weekday names (`monday`, `tue`, ...) to half-open
/// `[start, end)` hour pairs evaluated in `timezone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionAppConfig {
    /// IANA timezone name
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Weekday to suspension windows
    #[serde(default = "default_windows")]
    pub windows: BTreeMap<String, Vec<[u32; 2]>>,

    /// Periods during which replies are never suspended
    #[serde(default = "default_special_periods")]
    pub special_periods: Vec<PeriodConfig>,

    /// Holidays (`MM-DD`) during which replies are never suspended
    #[serde(default = "default_holidays")]
    pub holidays: Vec<String>,
}

fn default_timezone() -> String {
    "Europe/Rome".to_string()
}

fn default_windows() -> BTreeMap<String, Vec<[u32; 2]>> {
    [
        ("monday", [8, 20]),
        ("tuesday", [8, 14]),
        ("wednesday", [8, 17]),
        ("thursday", [8, 14]),
        ("friday", [8, 17]),
    ]
    .into_iter()
    .map(|(day, window)| (day.to_string(), vec![window]))
    .collect()
}

fn default_special_periods() -> Vec<PeriodConfig> {
    [("12-24", "01-06"), ("08-15", "08-30")]
        .into_iter()
        .map(|(start, end)| PeriodConfig {
            start: start.to_string(),
            end: end.to_string(),
        })
        .collect()
}

fn default_holidays() -> Vec<String> {
    ["04-25", "05-01", "08-15", "11-01", "12-08"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for SuspensionAppConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            windows: default_windows(),
            special_periods: default_special_periods(),
            holidays: default_holidays(),
        }
    }
}

fn invalid(message: String) -> ApplicationError {
    ApplicationError::Configuration(message)
}

impl SuspensionAppConfig {
    /// Build the calendar, rejecting unknown timezones, weekdays and dates
    pub fn to_policy(&self) -> Result<SuspensionPolicy, ApplicationError> {
        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|_| invalid(format!("unknown timezone '{}'", self.timezone)))?;

        let mut policy = SuspensionPolicy::new(timezone);

        for (day, windows) in &self.windows {
            let weekday: Weekday = day
                .parse()
                .map_err(|_| invalid(format!("unknown weekday '{day}'")))?;
            for [start, end] in windows {
                let window = HourWindow::new(*start, *end)
                    .map_err(|e| invalid(format!("suspension.windows.{day}: {e}")))?;
                policy = policy.with_window(weekday, window);
            }
        }

        for period in &self.special_periods {
            let start: MonthDay = period
                .start
                .parse()
                .map_err(|e| invalid(format!("suspension.special_periods: {e}")))?;
            let end: MonthDay = period
                .end
                .parse()
                .map_err(|e| invalid(format!("suspension.special_periods: {e}")))?;
            policy = policy.with_special_period(DatePeriod::new(start, end));
        }

        for holiday in &self.holidays {
            let day: MonthDay = holiday
                .parse()
                .map_err(|e| invalid(format!("suspension.holidays: {e}")))?;
            policy = policy.with_holiday(day);
        }

        Ok(policy)
    }
}

impl AdmissionAppConfig {
    /// Filter settings combined with the suspension calendar
    pub fn settings(
        &self,
        suspension: &SuspensionAppConfig,
    ) -> Result<AdmissionSettings, ApplicationError> {
        let monitored_account = self
            .monitored_account
            .as_deref()
            .map(str::trim)
            .filter(|account| !account.is_empty())
            .map(EmailAddress::new)
            .transpose()
            .map_err(|e| invalid(format!("admission.monitored_account: {e}")))?;

        Ok(AdmissionSettings {
            monitored_account,
            system_paused: self.system_paused,
            suspension: suspension.to_policy()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn default_calendar_matches_built_in_policy() {
        let policy = SuspensionAppConfig::default().to_policy().unwrap();
        assert_eq!(policy, SuspensionPolicy::default());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let config = SuspensionAppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..SuspensionAppConfig::default()
        };
        assert!(matches!(
            config.to_policy(),
            Err(ApplicationError::Configuration(msg)) if msg.contains("Mars/Olympus")
        ));
    }

    #[test]
    fn unknown_weekday_is_rejected() {
        let mut config = SuspensionAppConfig::default();
        config.windows.insert("funday".to_string(), vec![[8, 9]]);
        assert!(config.to_policy().is_err());
    }

    #[test]
    fn hours_out_of_range_are_rejected() {
        let mut config = SuspensionAppConfig::default();
        config.windows.insert("saturday".to_string(), vec![[20, 25]]);
        assert!(config.to_policy().is_err());
    }

    #[test]
    fn malformed_holiday_is_rejected() {
        let config = SuspensionAppConfig {
            holidays: vec!["25/04".to_string()],
            ..SuspensionAppConfig::default()
        };
        assert!(config.to_policy().is_err());
    }

    #[test]
    fn short_weekday_names_are_accepted() {
        let config = SuspensionAppConfig {
            timezone: "UTC".to_string(),
            windows: BTreeMap::from([("sat".to_string(), vec![[0, 24]])]),
            special_periods: Vec::new(),
            holidays: Vec::new(),
        };
        let policy = config.to_policy().unwrap();
        // 2025-03-08 is a Saturday
        let saturday = Utc.with_ymd_and_hms(2025, 3, 8, 3, 0, 0).unwrap();
        assert!(policy.is_suspended(saturday));
    }

    #[test]
    fn monitored_account_is_normalized() {
        let config = AdmissionAppConfig {
            monitored_account: Some(" Segreteria@Parrocchia.it ".to_string()),
            system_paused: true,
        };
        let settings = config.settings(&SuspensionAppConfig::default()).unwrap();
        assert_eq!(
            settings.monitored_account.unwrap().as_str(),
            "segreteria@parrocchia.it"
        );
        assert!(settings.system_paused);
    }

    #[test]
    fn blank_monitored_account_means_any() {
        let config = AdmissionAppConfig {
            monitored_account: Some("   ".to_string()),
            system_paused: false,
        };
        let settings = config.settings(&SuspensionAppConfig::default()).unwrap();
        assert!(settings.monitored_account.is_none());
    }

    #[test]
    fn invalid_monitored_account_is_rejected() {
        let config = AdmissionAppConfig {
            monitored_account: Some("not-an-address".to_string()),
            system_paused: false,
        };
        assert!(matches!(
            config.settings(&SuspensionAppConfig::default()),
            Err(ApplicationError::Configuration(_))
        ));
    }
}
