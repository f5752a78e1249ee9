//! CLI functionality for the `qm` tool
//!
//! This module contains all CLI-related functionality including:
//! - Offline normalization of saved responses
//! - Measure evaluation against a FHIR server
//! - Dashboard loading
//! - Clause results and highlighting
//! - Output formatting

pub mod clauses;
pub mod common;
pub mod dashboard;
pub mod evaluate;
pub mod normalize;
pub mod output;
pub mod patients;
