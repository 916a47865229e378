//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod cache_port;
mod row_source_port;

pub use cache_port::{CachePort, CachePortExt, CacheStats, keys};
#[cfg(test)]
pub use row_source_port::MockRowSourcePort;
pub use row_source_port::{RangeSpec, Row, RowSourcePort};
