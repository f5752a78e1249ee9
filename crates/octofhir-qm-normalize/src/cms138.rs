//! CMS138: Preventive Care and Screening: Tobacco Use: Screening and
//! Cessation Intervention

use octofhir_qm_types::{DecodedValue, Parameters};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::population::{extend_resources, run, MeasureTable, PopulationBuckets};

/// CQL statements whose resources are kept as evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cms138Evidence {
    QualifyingVisit,
    TobaccoScreening,
    CessationCounseling,
    CessationPharmacotherapy,
    ActivePharmacotherapy,
}

impl Cms138Evidence {
    pub const ALL: [Self; 5] = [
        Self::QualifyingVisit,
        Self::TobaccoScreening,
        Self::CessationCounseling,
        Self::CessationPharmacotherapy,
        Self::ActivePharmacotherapy,
    ];

    /// The CQL statement name producing this evidence
    pub const fn statement(&self) -> &'static str {
        match self {
            Self::QualifyingVisit => "Qualifying Visit During Measurement Period",
            Self::TobaccoScreening => "Tobacco Use Screening Performed",
            Self::CessationCounseling => "Tobacco Cessation Counseling Given",
            Self::CessationPharmacotherapy => "Tobacco Cessation Pharmacotherapy Ordered",
            Self::ActivePharmacotherapy => "Active Pharmacotherapy for Tobacco Cessation",
        }
    }

    pub fn from_statement(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.statement() == name)
    }
}

/// Normalized CMS138 result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cms138Result {
    #[serde(flatten)]
    pub populations: PopulationBuckets,
    /// Encounter resources
    pub qualifying_encounters: Vec<Value>,
    /// Observation resources
    pub tobacco_screenings: Vec<Value>,
    /// Procedure resources
    pub cessation_counseling: Vec<Value>,
    /// MedicationRequest resources
    pub cessation_pharmacotherapy: Vec<Value>,
    /// MedicationRequest resources active during the period
    pub active_pharmacotherapy: Vec<Value>,
    /// Some patient score is 0
    pub practitioner_alert: bool,
}

impl Cms138Result {
    pub fn evidence(&self, kind: Cms138Evidence) -> &[Value] {
        match kind {
            Cms138Evidence::QualifyingVisit => &self.qualifying_encounters,
            Cms138Evidence::TobaccoScreening => &self.tobacco_screenings,
            Cms138Evidence::CessationCounseling => &self.cessation_counseling,
            Cms138Evidence::CessationPharmacotherapy => &self.cessation_pharmacotherapy,
            Cms138Evidence::ActivePharmacotherapy => &self.active_pharmacotherapy,
        }
    }

    fn evidence_mut(&mut self, kind: Cms138Evidence) -> &mut Vec<Value> {
        match kind {
            Cms138Evidence::QualifyingVisit => &mut self.qualifying_encounters,
            Cms138Evidence::TobaccoScreening => &mut self.tobacco_screenings,
            Cms138Evidence::CessationCounseling => &mut self.cessation_counseling,
            Cms138Evidence::CessationPharmacotherapy => &mut self.cessation_pharmacotherapy,
            Cms138Evidence::ActivePharmacotherapy => &mut self.active_pharmacotherapy,
        }
    }
}

impl MeasureTable for Cms138Result {
    fn buckets_mut(&mut self) -> &mut PopulationBuckets {
        &mut self.populations
    }

    fn collect_evidence(&mut self, name: &str, value: &DecodedValue) {
        if let Some(kind) = Cms138Evidence::from_statement(name) {
            extend_resources(self.evidence_mut(kind), value);
        }
    }
}

/// Normalize a CMS138 `Library/$evaluate` response
pub fn normalize_cms138(params: &Parameters) -> Cms138Result {
    let mut result = Cms138Result::default();
    run(&mut result, params);
    result.practitioner_alert = result.populations.any_score_is_zero();
    log::debug!(
        "CMS138: {} parameters, {} patient scores, alert={}",
        params.len(),
        result.populations.patient_scores.len(),
        result.practitioner_alert
    );
    result
}
