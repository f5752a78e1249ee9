//! Backends for the quality-measure dashboard
//!
//! - [`FhirClient`] talks to a FHIR server (`Library/$evaluate`,
//!   `Measure/$evaluate-measure`, patient and clinical searches)
//! - [`AnalyticsClient`] asks the quality analytics backend for clause
//!   results and highlighting
//! - [`Dashboard`] loads every card for one selection concurrently, and
//!   [`DashboardSession`] drops loads that a newer selection superseded
//!
//! Requests are never retried. The measurement period is resolved once per
//! load and passed to every fetch.

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fhir;
pub mod generation;
pub mod provider;

pub use analytics::{AnalyticsClient, EvaluateOptions, EvaluateRequest};
pub use config::DashboardConfig;
pub use dashboard::{
    CardState, ClinicalData, Dashboard, DashboardSession, DashboardSnapshot, MeasureIds, Refresh,
    Selection,
};
pub use error::{ClientError, Result};
pub use fhir::{bundle_resources, FhirClient};
pub use generation::{Commit, GenerationGuard, Ticket};
pub use provider::{ClinicalResource, FhirServer, QualityAnalytics};
