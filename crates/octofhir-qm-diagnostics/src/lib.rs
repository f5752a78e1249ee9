//! Quality-measure diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the
//! quality-measure crates: structured error codes, the [`QmError`] type and
//! diagnostic reporting for the command-line front end.

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for quality-measure operations
pub type Result<T> = std::result::Result<T, QmError>;
