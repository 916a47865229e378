//! Testing utilities for infrastructure integration tests.
//!
//! Tests that need Docker are marked `#[ignore]`; run them with
//! `cargo test -- --ignored`.
//!
//! # Example
//!
//! ```ignore
//! use infrastructure::testing::RedisContainer;
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn test_with_redis() {
//!     let redis = RedisContainer::start().await.unwrap();
//!     let config = redis.cache_config("test:", Duration::from_secs(60));
//!     // Container is automatically cleaned up when dropped
//! }
//! ```

mod containers;

pub use containers::{ContainerError, RedisContainer, RedisContainerConfig};
