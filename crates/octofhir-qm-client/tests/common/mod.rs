//! Common test utilities for dashboard testing
//!
//! - In-memory FHIR and analytics backends
//! - Builders for `Parameters` bundles

pub mod bundles;
pub mod mocks;

pub use bundles::*;
pub use mocks::*;
