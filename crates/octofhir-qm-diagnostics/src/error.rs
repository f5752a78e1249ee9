//! Quality-measure error types

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - the operation could not complete
    Error,
    /// Warning - a field degraded but the operation completed
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message with context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            help: None,
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            help: None,
        }
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the diagnostic for a terminal, coloring the severity label
    #[cfg(feature = "colored")]
    pub fn render_colored(&self) -> String {
        use colored::Colorize;

        let label = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().blue().bold(),
        };
        let mut out = format!("{}[{}]: {}", label, self.code, self.message);
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".cyan(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(help) = &self.help {
            write!(f, " ({})", help)?;
        }
        Ok(())
    }
}

/// Main quality-measure error type
#[derive(Debug, Clone, Error)]
pub enum QmError {
    /// Malformed input payload or file
    #[error("{code}: {message}")]
    Input {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Invalid configuration (URLs, periods, identifiers)
    #[error("{code}: {message}")]
    Config {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Transport-level failure talking to a backend
    #[error("{code}: {message}")]
    Network {
        code: ErrorCode,
        message: String,
        url: Option<String>,
    },

    /// A backend answered, but not with something usable
    #[error("{code}: {message}")]
    Remote {
        code: ErrorCode,
        message: String,
        status: Option<u16>,
        url: Option<String>,
    },

    /// System error
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },
}

impl QmError {
    /// Create an input error
    pub fn input(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Input {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error
    pub fn config(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Create a network error
    pub fn network(code: ErrorCode, message: impl Into<String>, url: Option<String>) -> Self {
        Self::Network {
            code,
            message: message.into(),
            url,
        }
    }

    /// Create a remote service error
    pub fn remote(
        code: ErrorCode,
        message: impl Into<String>,
        status: Option<u16>,
        url: Option<String>,
    ) -> Self {
        Self::Remote {
            code,
            message: message.into(),
            status,
            url,
        }
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attach context to input, config and system errors
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        match &mut self {
            Self::Input { context, .. }
            | Self::Config { context, .. }
            | Self::System { context, .. } => *context = Some(ctx.into()),
            Self::Network { .. } | Self::Remote { .. } => {}
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Input { code, .. } => *code,
            Self::Config { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::Remote { code, .. } => *code,
            Self::System { code, .. } => *code,
        }
    }

    /// HTTP status reported by the backend, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Input { code, message, context }
            | Self::Config { code, message, context }
            | Self::System { code, message, context } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                } else if let Some(help) = code.info().help {
                    diag = diag.with_help(help);
                }
                diag
            }
            Self::Network { code, message, url } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(url) = url {
                    diag = diag.with_help(format!("while requesting {}", url));
                }
                diag
            }
            Self::Remote { code, message, status, url } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                match (status, url) {
                    (Some(status), Some(url)) => {
                        diag = diag.with_help(format!("{} returned HTTP {}", url, status));
                    }
                    (None, Some(url)) => {
                        diag = diag.with_help(format!("while reading {}", url));
                    }
                    (Some(status), None) => {
                        diag = diag.with_help(format!("HTTP {}", status));
                    }
                    (None, None) => {}
                }
                diag
            }
        }
    }
}
