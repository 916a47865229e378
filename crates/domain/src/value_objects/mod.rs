//! Value Objects - Immutable, identity-less domain primitives

mod email_address;
mod suspension_policy;

pub use email_address::EmailAddress;
pub use suspension_policy::{DatePeriod, HourWindow, MonthDay, SuspensionPolicy};
