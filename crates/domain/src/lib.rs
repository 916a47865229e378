//! Domain layer for the parish auto-reply service
//!
//! Contains the knowledge-base and replacement data model, the inbound
//! notification envelope, admission decisions and the suspension calendar.
//! Everything here is pure: no I/O, no clocks, no logging.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
