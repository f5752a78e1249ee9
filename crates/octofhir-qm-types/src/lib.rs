//! Core types for quality-measure responses
//!
//! This crate provides:
//! - The wire model of a FHIR `Parameters` resource as returned by
//!   `Library/$evaluate`
//! - [`DecodedValue`], the closed set of shapes a parameter value can take,
//!   and the total [`decode`] function producing it
//! - [`MeasurementPeriod`], the explicit date range (or real-time sentinel)
//!   a measure is evaluated over

pub mod parameter;
pub mod period;
pub mod value;

pub use parameter::{Parameter, Parameters};
pub use period::{MeasurementPeriod, ResolvedPeriod};
pub use value::{decode, DecodedValue, NamedValue, CQF_IS_EMPTY_LIST_URL, DATA_ABSENT_REASON_URL};
