//! Suspension calendar
//!
//! Automated replies are paused while the parish office is staffed. The
//! calendar is a set of weekday hour windows evaluated in a local timezone,
//! with special periods and holidays during which the office is closed and
//! replies are never suspended.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A calendar day without a year, ordered by month then day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Create a month/day pair
    pub fn new(month: u32, day: u32) -> Result<Self, DomainError> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(DomainError::ValidationError(format!(
                "invalid month/day {month:02}-{day:02}"
            )));
        }
        Ok(Self { month, day })
    }

    /// Month/day of a calendar date
    pub fn of(date: &impl Datelike) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Month (1-12)
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Day of month (1-31)
    pub const fn day(&self) -> u32 {
        self.day
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = DomainError;

    /// Parse `MM-DD`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::ValidationError(format!("expected MM-DD, got '{s}'"));
        let (month, day) = s.trim().split_once('-').ok_or_else(invalid)?;
        let month = month.parse().map_err(|_| invalid())?;
        let day = day.parse().map_err(|_| invalid())?;
        Self::new(month, day)
    }
}

/// Inclusive range of calendar days; wraps the year end when `start > end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePeriod {
    /// First day of the period
    pub start: MonthDay,
    /// Last day of the period
    pub end: MonthDay,
}

impl DatePeriod {
    /// Create a period
    pub const fn new(start: MonthDay, end: MonthDay) -> Self {
        Self { start, end }
    }

    /// Whether the day falls inside the period
    pub fn contains(&self, day: MonthDay) -> bool {
        if self.start <= self.end {
            self.start <= day && day <= self.end
        } else {
            day >= self.start || day <= self.end
        }
    }
}

/// Half-open hour range `[start_hour, end_hour)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    start_hour: u32,
    end_hour: u32,
}

impl HourWindow {
    /// Create a window; requires `start_hour < end_hour <= 24`
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, DomainError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(DomainError::ValidationError(format!(
                "invalid hour window {start_hour}-{end_hour}"
            )));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    /// Whether the hour falls inside the window
    pub const fn contains(&self, hour: u32) -> bool {
        self.start_hour <= hour && hour < self.end_hour
    }

    /// Start hour (inclusive)
    pub const fn start_hour(&self) -> u32 {
        self.start_hour
    }

    /// End hour (exclusive)
    pub const fn end_hour(&self) -> u32 {
        self.end_hour
    }
}

/// Weekly suspension calendar in a local timezone
#[derive(Debug, Clone, PartialEq)]
pub struct SuspensionPolicy {
    timezone: Tz,
    windows: [Vec<HourWindow>; 7],
    special_periods: Vec<DatePeriod>,
    holidays: Vec<MonthDay>,
}

impl SuspensionPolicy {
    /// Empty calendar: never suspended
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            windows: Default::default(),
            special_periods: Vec::new(),
            holidays: Vec::new(),
        }
    }

    /// Add a suspension window for a weekday
    #[must_use]
    pub fn with_window(mut self, weekday: Weekday, window: HourWindow) -> Self {
        self.windows[weekday.num_days_from_monday() as usize].push(window);
        self
    }

    /// Add a period during which replies are never suspended
    #[must_use]
    pub fn with_special_period(mut self, period: DatePeriod) -> Self {
        self.special_periods.push(period);
        self
    }

    /// Add a holiday during which replies are never suspended
    #[must_use]
    pub fn with_holiday(mut self, holiday: MonthDay) -> Self {
        self.holidays.push(holiday);
        self
    }

    /// Timezone the calendar is evaluated in
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Windows configured for a weekday
    pub fn windows_for(&self, weekday: Weekday) -> &[HourWindow] {
        &self.windows[weekday.num_days_from_monday() as usize]
    }

    /// Whether the day is a holiday or inside a special period
    pub fn is_exempt(&self, day: MonthDay) -> bool {
        self.holidays.contains(&day) || self.special_periods.iter().any(|p| p.contains(day))
    }

    /// Whether automated processing is suspended at the given instant
    pub fn is_suspended(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&self.timezone);
        if self.is_exempt(MonthDay::of(&local)) {
            return false;
        }
        self.windows_for(local.weekday())
            .iter()
            .any(|window| window.contains(local.hour()))
    }
}

impl Default for SuspensionPolicy {
    /// Office hours of the parish secretariat
    fn default() -> Self {
        let window = |start, end| HourWindow { start_hour: start, end_hour: end };
        let day = |month, day| MonthDay { month, day };

        Self::new(chrono_tz::Europe::Rome)
            .with_window(Weekday::Mon, window(8, 20))
            .with_window(Weekday::Tue, window(8, 14))
            .with_window(Weekday::Wed, window(8, 17))
            .with_window(Weekday::Thu, window(8, 14))
            .with_window(Weekday::Fri, window(8, 17))
            .with_special_period(DatePeriod::new(day(12, 24), day(1, 6)))
            .with_special_period(DatePeriod::new(day(8, 15), day(8, 30)))
            .with_holiday(day(4, 25))
            .with_holiday(day(5, 1))
            .with_holiday(day(8, 15))
            .with_holiday(day(11, 1))
            .with_holiday(day(12, 8))
    }
}
