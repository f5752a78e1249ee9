//! Quality-measure results for FHIR, ready for display
//!
//! This crate bundles:
//! - Decoding of `Library/$evaluate` `Parameters` values
//! - CMS138 and CMS69 normalization into population buckets and evidence
//! - Hospice and palliative-care evidence extraction
//! - Clause results and highlighting from a quality analytics backend
//! - Concurrent dashboard loading against a FHIR server
//!
//! # Example
//!
//! ```ignore
//! use octofhir_qm::{normalize_cms69, Parameters};
//!
//! let params = Parameters::from_json_str(&std::fs::read_to_string("cms69.json")?)?;
//! let result = normalize_cms69(&params);
//! if result.practitioner_alert {
//!     println!("BMI follow-up missing");
//! }
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_qm_client as client;
pub use octofhir_qm_diagnostics as diagnostics;
pub use octofhir_qm_normalize as normalize;
pub use octofhir_qm_types as types;

// Convenience re-exports
pub use octofhir_qm_client::{Dashboard, DashboardConfig, DashboardSession, Selection};
pub use octofhir_qm_diagnostics::{QmError, Result};
pub use octofhir_qm_normalize::{
    extract_hospice, extract_palliative_care, normalize_cms138, normalize_cms69, MeasureKind,
    NormalizedMeasure,
};
pub use octofhir_qm_types::{decode, DecodedValue, MeasurementPeriod, Parameters};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
