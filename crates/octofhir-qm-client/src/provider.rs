//! Backend traits
//!
//! The dashboard depends only on these traits, so tests can drive it with
//! in-memory providers.

use async_trait::async_trait;
use octofhir_qm_types::{Parameters, ResolvedPeriod};
use serde_json::Value;
use std::fmt;

use crate::error::Result;

/// Clinical resource types searched per patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClinicalResource {
    Encounter,
    Condition,
    MedicationRequest,
    Observation,
}

impl ClinicalResource {
    pub const ALL: [Self; 4] = [
        Self::Encounter,
        Self::Condition,
        Self::MedicationRequest,
        Self::Observation,
    ];

    pub const fn resource_type(&self) -> &'static str {
        match self {
            Self::Encounter => "Encounter",
            Self::Condition => "Condition",
            Self::MedicationRequest => "MedicationRequest",
            Self::Observation => "Observation",
        }
    }
}

impl fmt::Display for ClinicalResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_type())
    }
}

/// FHIR REST operations used by the dashboard
#[async_trait]
pub trait FhirServer: Send + Sync {
    /// `Library/{id}/$evaluate` for one patient and period
    async fn evaluate_library(
        &self,
        library_id: &str,
        patient_id: &str,
        period: &ResolvedPeriod,
    ) -> Result<Parameters>;

    /// `Measure/{id}/$evaluate-measure`, individual report
    async fn evaluate_measure(
        &self,
        measure_id: &str,
        patient_id: &str,
        period: &ResolvedPeriod,
    ) -> Result<Value>;

    async fn read_patient(&self, patient_id: &str) -> Result<Value>;

    async fn search_patients(&self, count: u32) -> Result<Vec<Value>>;

    /// All resources of `kind` referencing the patient
    async fn search_clinical(&self, kind: ClinicalResource, patient_id: &str) -> Result<Vec<Value>>;
}

/// Clause-level evaluation backend
#[async_trait]
pub trait QualityAnalytics: Send + Sync {
    /// Raw evaluation response; read it with `ClauseReport::from_response`
    async fn evaluate_clauses(
        &self,
        measure_id: &str,
        patient_id: &str,
        period: &ResolvedPeriod,
    ) -> Result<Value>;
}
