//! CMS69: Preventive Care and Screening: Body Mass Index (BMI) Screening and
//! Follow-Up Plan

use octofhir_qm_types::{DecodedValue, Parameters};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::population::{extend_resources, run, MeasureTable, PopulationBuckets};
use crate::routing::PopulationRoute;

const DENOMINATOR: &str = "Denominator";
const NUMERATOR: &str = "Numerator";
const DENOMINATOR_EXCLUSIONS: &str = "Denominator Exclusions";
const DENOMINATOR_EXCLUSION: &str = "Denominator Exclusion";
const DENOMINATOR_EXCEPTION: &str = "Denominator Exception";
const DENOMINATOR_EXCEPTIONS: &str = "Denominator Exceptions";
const PATIENT_SCORE: &str = "Patient Score";

/// CQL statements whose resources are kept as evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cms69Evidence {
    QualifyingEncounter,
    Bmi,
    HighBmiInterventions,
    LowBmiInterventions,
    MedicalReasonNotDone,
    PatientReasonNotDone,
}

impl Cms69Evidence {
    pub const ALL: [Self; 6] = [
        Self::QualifyingEncounter,
        Self::Bmi,
        Self::HighBmiInterventions,
        Self::LowBmiInterventions,
        Self::MedicalReasonNotDone,
        Self::PatientReasonNotDone,
    ];

    pub const fn statement(&self) -> &'static str {
        match self {
            Self::QualifyingEncounter => "Qualifying Encounter During Day Of Measurement Period",
            Self::Bmi => "BMI During Measurement Period",
            Self::HighBmiInterventions => "Documented High BMI Interventions",
            Self::LowBmiInterventions => "Documented Low BMI Interventions",
            Self::MedicalReasonNotDone => "Medical Reason For Not Documenting BMI",
            Self::PatientReasonNotDone => "Patient Reason For Not Documenting BMI",
        }
    }

    pub fn from_statement(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.statement() == name)
    }
}

/// Why a BMI was not documented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BmiNotDoneCategory {
    #[serde(rename = "Medical Reason")]
    MedicalReason,
    #[serde(rename = "Patient Reason")]
    PatientReason,
    #[serde(rename = "Unknown Reason")]
    UnknownReason,
}

impl BmiNotDoneCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MedicalReason => "Medical Reason",
            Self::PatientReason => "Patient Reason",
            Self::UnknownReason => "Unknown Reason",
        }
    }
}

impl FromStr for BmiNotDoneCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Medical Reason" => Ok(Self::MedicalReason),
            "Patient Reason" => Ok(Self::PatientReason),
            "Unknown Reason" => Ok(Self::UnknownReason),
            other => Err(format!("unknown BMI not-done category '{}'", other)),
        }
    }
}

impl fmt::Display for BmiNotDoneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CMS69 classification. Measure-specific names are matched exactly and take
/// priority over the shared population routes ("Denominator Exception
/// Banner" is a banner, not a denominator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cms69Route {
    HasNormalBmi,
    IsPregnant,
    HighBmiFollowUpBanner,
    LowBmiFollowUpBanner,
    DenominatorExceptionBanner,
    BmiNotDoneCategory,
    BmiNotDoneReasonDisplay,
    Population(PopulationRoute),
}

impl Cms69Route {
    pub fn classify(name: &str) -> Self {
        match name {
            "Has Normal BMI" => Self::HasNormalBmi,
            "Is Pregnant During Day Of Measurement Period" => Self::IsPregnant,
            "High BMI Follow Up Banner" => Self::HighBmiFollowUpBanner,
            "Low BMI Follow Up Banner" => Self::LowBmiFollowUpBanner,
            "Denominator Exception Banner" => Self::DenominatorExceptionBanner,
            "BMI Not Done Category" => Self::BmiNotDoneCategory,
            "BMI Not Done Reason Display" => Self::BmiNotDoneReasonDisplay,
            other => Self::Population(PopulationRoute::classify(other)),
        }
    }
}

/// Normalized CMS69 result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cms69Result {
    #[serde(flatten)]
    pub populations: PopulationBuckets,

    pub denominator: Option<bool>,
    pub numerator: Option<bool>,
    pub denominator_exclusion: Option<bool>,
    pub denominator_exception: Option<bool>,
    pub patient_score: Option<i64>,

    pub has_normal_bmi: Option<bool>,
    pub is_pregnant: Option<bool>,
    pub high_bmi_follow_up_banner: Option<String>,
    pub low_bmi_follow_up_banner: Option<String>,
    pub denominator_exception_banner: Option<String>,
    pub bmi_not_done_category: Option<BmiNotDoneCategory>,
    pub bmi_not_done_reason_display: Option<String>,

    pub qualifying_encounters: Vec<Value>,
    pub bmi_observations: Vec<Value>,
    pub high_bmi_interventions: Vec<Value>,
    pub low_bmi_interventions: Vec<Value>,
    pub medical_reason_not_done: Vec<Value>,
    pub patient_reason_not_done: Vec<Value>,

    pub practitioner_alert: bool,
}

impl Cms69Result {
    pub fn evidence(&self, kind: Cms69Evidence) -> &[Value] {
        match kind {
            Cms69Evidence::QualifyingEncounter => &self.qualifying_encounters,
            Cms69Evidence::Bmi => &self.bmi_observations,
            Cms69Evidence::HighBmiInterventions => &self.high_bmi_interventions,
            Cms69Evidence::LowBmiInterventions => &self.low_bmi_interventions,
            Cms69Evidence::MedicalReasonNotDone => &self.medical_reason_not_done,
            Cms69Evidence::PatientReasonNotDone => &self.patient_reason_not_done,
        }
    }

    fn evidence_mut(&mut self, kind: Cms69Evidence) -> &mut Vec<Value> {
        match kind {
            Cms69Evidence::QualifyingEncounter => &mut self.qualifying_encounters,
            Cms69Evidence::Bmi => &mut self.bmi_observations,
            Cms69Evidence::HighBmiInterventions => &mut self.high_bmi_interventions,
            Cms69Evidence::LowBmiInterventions => &mut self.low_bmi_interventions,
            Cms69Evidence::MedicalReasonNotDone => &mut self.medical_reason_not_done,
            Cms69Evidence::PatientReasonNotDone => &mut self.patient_reason_not_done,
        }
    }

    fn finish(&mut self) {
        let p = &self.populations;
        self.denominator = p.denominator(DENOMINATOR);
        self.numerator = p.numerator(NUMERATOR);
        self.denominator_exclusion = p
            .exclusion(DENOMINATOR_EXCLUSIONS)
            .or_else(|| p.exclusion(DENOMINATOR_EXCLUSION));
        self.denominator_exception = p
            .denominator(DENOMINATOR_EXCEPTION)
            .or_else(|| p.denominator(DENOMINATOR_EXCEPTIONS));
        self.patient_score = p.patient_score(PATIENT_SCORE);
        self.practitioner_alert = self.patient_score == Some(0);
    }
}

fn text(value: &DecodedValue) -> Option<String> {
    value.as_str().map(str::to_string)
}

impl MeasureTable for Cms69Result {
    fn buckets_mut(&mut self) -> &mut PopulationBuckets {
        &mut self.populations
    }

    fn collect_evidence(&mut self, name: &str, value: &DecodedValue) {
        if let Some(kind) = Cms69Evidence::from_statement(name) {
            extend_resources(self.evidence_mut(kind), value);
        }
    }

    fn record_specific(&mut self, name: &str, value: &DecodedValue) -> bool {
        match Cms69Route::classify(name) {
            Cms69Route::HasNormalBmi => self.has_normal_bmi = value.as_boolean(),
            Cms69Route::IsPregnant => self.is_pregnant = value.as_boolean(),
            Cms69Route::HighBmiFollowUpBanner => self.high_bmi_follow_up_banner = text(value),
            Cms69Route::LowBmiFollowUpBanner => self.low_bmi_follow_up_banner = text(value),
            Cms69Route::DenominatorExceptionBanner => {
                self.denominator_exception_banner = text(value)
            }
            Cms69Route::BmiNotDoneCategory => {
                self.bmi_not_done_category = value.as_str().and_then(|s| match s.parse() {
                    Ok(category) => Some(category),
                    Err(e) => {
                        log::debug!("CMS69: {}", e);
                        None
                    }
                });
            }
            Cms69Route::BmiNotDoneReasonDisplay => self.bmi_not_done_reason_display = text(value),
            Cms69Route::Population(_) => return false,
        }
        true
    }
}

/// Normalize a CMS69 `Library/$evaluate` response
pub fn normalize_cms69(params: &Parameters) -> Cms69Result {
    let mut result = Cms69Result::default();
    run(&mut result, params);
    result.finish();
    log::debug!(
        "CMS69: {} parameters, patient score {:?}, alert={}",
        params.len(),
        result.patient_score,
        result.practitioner_alert
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_qm_types::Parameter;

    #[test]
    fn test_banner_routes_before_denominator() {
        assert_eq!(
            Cms69Route::classify("Denominator Exception Banner"),
            Cms69Route::DenominatorExceptionBanner
        );
        assert_eq!(
            Cms69Route::classify("Denominator Exception"),
            Cms69Route::Population(PopulationRoute::Denominator)
        );
    }

    #[test]
    fn test_not_done_category_closed_set() {
        let params: Parameters = [Parameter::named("BMI Not Done Category").with_string("Medical Reason")]
            .into_iter()
            .collect();
        assert_eq!(
            normalize_cms69(&params).bmi_not_done_category,
            Some(BmiNotDoneCategory::MedicalReason)
        );

        let params: Parameters = [Parameter::named("BMI Not Done Category").with_string("Because")]
            .into_iter()
            .collect();
        let result = normalize_cms69(&params);
        assert_eq!(result.bmi_not_done_category, None);
        assert!(result.populations.other_parameters.is_empty());
    }

    #[test]
    fn test_exception_scalar_reads_denominator_mapping() {
        let params: Parameters = [
            Parameter::named("Denominator Exception").with_boolean(true),
            Parameter::named("Denominator Exclusions").with_boolean(false),
        ]
        .into_iter()
        .collect();
        let result = normalize_cms69(&params);
        assert_eq!(result.denominator_exception, Some(true));
        assert_eq!(result.denominator_exclusion, Some(false));
        assert_eq!(result.denominator, None);
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_value(BmiNotDoneCategory::PatientReason).unwrap();
        assert_eq!(json, serde_json::json!("Patient Reason"));
    }
}
