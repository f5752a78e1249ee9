//! Quality-measure error codes following a structured numbering system
//!
//! Error code ranges:
//! - QM0001-QM0099: Input errors (malformed payloads, unreadable files)
//! - QM0100-QM0199: Configuration errors (URLs, periods, identifiers)
//! - QM0200-QM0299: Network errors (transport, timeouts)
//! - QM0300-QM0399: Remote service errors (non-success status, bad bodies)
//! - QM0400-QM0499: System errors (I/O, internal)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    pub const fn is_input_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    pub const fn is_config_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    pub const fn is_network_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    pub const fn is_remote_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QM{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Input errors (0001-0099)
    map.insert(1, ErrorInfo::new("Invalid JSON payload"));
    map.insert(2, ErrorInfo::new("Not a Parameters resource")
        .with_help("Library/$evaluate responses must have resourceType 'Parameters'"));
    map.insert(3, ErrorInfo::new("Unknown measure"));
    map.insert(4, ErrorInfo::new("Invalid date"));

    // Configuration errors (0100-0199)
    map.insert(100, ErrorInfo::new("Invalid base URL")
        .with_help("Base URLs must use the http or https scheme"));
    map.insert(101, ErrorInfo::new("Invalid measurement period")
        .with_help("The period start must not be after the period end"));
    map.insert(102, ErrorInfo::new("Missing identifier"));
    map.insert(103, ErrorInfo::new("Invalid configuration file"));

    // Network errors (0200-0299)
    map.insert(200, ErrorInfo::new("Request failed"));
    map.insert(201, ErrorInfo::new("Request timed out"));

    // Remote service errors (0300-0399)
    map.insert(300, ErrorInfo::new("Unexpected response status"));
    map.insert(301, ErrorInfo::new("Response body could not be decoded"));
    map.insert(302, ErrorInfo::new("Resource not found"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));

    map
});

// Input errors
pub const QM0001: ErrorCode = ErrorCode::new(1);
pub const QM0002: ErrorCode = ErrorCode::new(2);
pub const QM0003: ErrorCode = ErrorCode::new(3);
pub const QM0004: ErrorCode = ErrorCode::new(4);

// Configuration errors
pub const QM0100: ErrorCode = ErrorCode::new(100);
pub const QM0101: ErrorCode = ErrorCode::new(101);
pub const QM0102: ErrorCode = ErrorCode::new(102);
pub const QM0103: ErrorCode = ErrorCode::new(103);

// Network errors
pub const QM0200: ErrorCode = ErrorCode::new(200);
pub const QM0201: ErrorCode = ErrorCode::new(201);

// Remote service errors
pub const QM0300: ErrorCode = ErrorCode::new(300);
pub const QM0301: ErrorCode = ErrorCode::new(301);
pub const QM0302: ErrorCode = ErrorCode::new(302);

// System errors
pub const QM0400: ErrorCode = ErrorCode::new(400);
pub const QM0401: ErrorCode = ErrorCode::new(401);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(QM0001.to_string(), "QM0001");
        assert_eq!(QM0300.to_string(), "QM0300");
    }

    #[test]
    fn test_error_code_ranges() {
        assert!(QM0002.is_input_error());
        assert!(QM0101.is_config_error());
        assert!(QM0201.is_network_error());
        assert!(QM0302.is_remote_error());
        assert!(QM0401.is_system_error());
        assert!(!QM0401.is_input_error());
    }

    #[test]
    fn test_error_info() {
        assert_eq!(QM0101.info().description, "Invalid measurement period");
        assert!(QM0100.info().help.is_some());
        assert_eq!(ErrorCode::new(999).info().description, "Unknown error");
    }
}
