//! Application layer - Use cases and orchestration
//!
//! Contains the resource loaders, the notification admission filter and the
//! port definitions they depend on. Infrastructure adapters implement the
//! ports.

pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;

pub use error::{ApplicationError, SourceError};
pub use ports::*;
pub use services::*;
