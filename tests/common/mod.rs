//! Common test utilities and helpers

#![allow(dead_code)] // Not every test file uses every helper

pub mod builders;
pub mod fake_store;

use std::time::Duration;

/// How long tests wait for a worker reply
pub fn test_timeout() -> Duration {
    Duration::from_secs(2)
}
