//! Concurrent dashboard loading
//!
//! One [`Selection`] (patient + measurement period) fans out into
//! independent fetches. Every fetch fills its own [`CardState`]; a failed
//! card never blocks or clears the others.

use futures::future::join_all;
use octofhir_qm_normalize::{
    extract_hospice, extract_palliative_care, normalize_cms138, normalize_cms69, ClauseReport,
    Cms138Result, Cms69Result, EvidenceReport,
};
use octofhir_qm_types::{MeasurementPeriod, ResolvedPeriod};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::analytics::AnalyticsClient;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::fhir::FhirClient;
use crate::generation::{Commit, GenerationGuard};
use crate::provider::{ClinicalResource, FhirServer, QualityAnalytics};

/// What the user picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub patient_id: String,
    pub period: MeasurementPeriod,
}

impl Selection {
    pub fn new(patient_id: impl Into<String>, period: MeasurementPeriod) -> Self {
        Self {
            patient_id: patient_id.into(),
            period,
        }
    }
}

/// Outcome of one independent fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "camelCase")]
pub enum CardState<T> {
    Ready(T),
    Failed(String),
}

impl<T> CardState<T> {
    fn from_result(card: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => {
                log::warn!("{} card failed: {}", card, e);
                Self::Failed(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Failed(message) => Some(message),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalData {
    pub encounters: CardState<Vec<Value>>,
    pub conditions: CardState<Vec<Value>>,
    pub medication_requests: CardState<Vec<Value>>,
    pub observations: CardState<Vec<Value>>,
}

/// Everything shown for one selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub patient_id: String,
    pub period: ResolvedPeriod,
    pub patient: CardState<Value>,
    pub clinical: ClinicalData,
    pub cms138: CardState<Cms138Result>,
    pub cms69: CardState<Cms69Result>,
    pub hospice: CardState<EvidenceReport>,
    pub palliative_care: CardState<EvidenceReport>,
    /// Present only when an analytics backend is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clauses: Option<CardState<ClauseReport>>,
}

impl DashboardSnapshot {
    /// Names of the cards that failed
    pub fn failed_cards(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        let mut check = |name, ok: bool| {
            if !ok {
                failed.push(name);
            }
        };
        check("patient", self.patient.is_ready());
        check("encounters", self.clinical.encounters.is_ready());
        check("conditions", self.clinical.conditions.is_ready());
        check("medicationRequests", self.clinical.medication_requests.is_ready());
        check("observations", self.clinical.observations.is_ready());
        check("cms138", self.cms138.is_ready());
        check("cms69", self.cms69.is_ready());
        check("hospice", self.hospice.is_ready());
        check("palliativeCare", self.palliative_care.is_ready());
        if let Some(clauses) = &self.clauses {
            check("clauses", clauses.is_ready());
        }
        failed
    }
}

/// Library and measure identifiers evaluated for every selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureIds {
    pub cms138_library: String,
    pub cms69_library: String,
    pub hospice_library: String,
    pub palliative_library: String,
    pub analytics_measure_id: String,
}

impl From<&DashboardConfig> for MeasureIds {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            cms138_library: config.cms138_library.clone(),
            cms69_library: config.cms69_library.clone(),
            hospice_library: config.hospice_library.clone(),
            palliative_library: config.palliative_library.clone(),
            analytics_measure_id: config.analytics_measure_id.clone(),
        }
    }
}

pub struct Dashboard {
    fhir: Arc<dyn FhirServer>,
    analytics: Option<Arc<dyn QualityAnalytics>>,
    ids: MeasureIds,
}

impl Dashboard {
    pub fn new(fhir: Arc<dyn FhirServer>, ids: MeasureIds) -> Self {
        Self {
            fhir,
            analytics: None,
            ids,
        }
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn QualityAnalytics>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// HTTP clients for both backends
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        config.validate()?;
        let fhir = FhirClient::from_config(config)?;
        let analytics = AnalyticsClient::from_config(config)?;
        Ok(Self::new(Arc::new(fhir), MeasureIds::from(config)).with_analytics(Arc::new(analytics)))
    }

    pub fn fhir(&self) -> &Arc<dyn FhirServer> {
        &self.fhir
    }

    pub fn ids(&self) -> &MeasureIds {
        &self.ids
    }

    /// Resolve the period against today and load every card
    pub async fn load(&self, selection: &Selection) -> DashboardSnapshot {
        let period = selection.period.resolve_now();
        self.load_resolved(&selection.patient_id, period).await
    }

    pub async fn load_resolved(&self, patient_id: &str, period: ResolvedPeriod) -> DashboardSnapshot {
        log::info!(
            "loading dashboard for patient {} ({} to {})",
            patient_id,
            period.start_param(),
            period.end_param()
        );
        let fhir = self.fhir.as_ref();
        let ids = &self.ids;

        let patient = fhir.read_patient(patient_id);
        let clinical = join_all(
            ClinicalResource::ALL
                .iter()
                .map(|kind| fhir.search_clinical(*kind, patient_id)),
        );
        let cms138 = async {
            fhir.evaluate_library(&ids.cms138_library, patient_id, &period)
                .await
                .map(|params| normalize_cms138(&params))
        };
        let cms69 = async {
            fhir.evaluate_library(&ids.cms69_library, patient_id, &period)
                .await
                .map(|params| normalize_cms69(&params))
        };
        let hospice = async {
            fhir.evaluate_library(&ids.hospice_library, patient_id, &period)
                .await
                .map(|params| extract_hospice(&params))
        };
        let palliative = async {
            fhir.evaluate_library(&ids.palliative_library, patient_id, &period)
                .await
                .map(|params| extract_palliative_care(&params))
        };
        let clauses = async {
            match &self.analytics {
                Some(analytics) => Some(
                    analytics
                        .evaluate_clauses(&ids.analytics_measure_id, patient_id, &period)
                        .await
                        .map(|response| ClauseReport::from_response(&response)),
                ),
                None => None,
            }
        };

        let (patient, clinical, cms138, cms69, hospice, palliative, clauses) =
            tokio::join!(patient, clinical, cms138, cms69, hospice, palliative, clauses);

        let mut clinical = clinical.into_iter();
        let mut next_clinical = |card: &str| match clinical.next() {
            Some(result) => CardState::from_result(card, result),
            None => CardState::Failed(format!("{} search was not issued", card)),
        };

        let snapshot = DashboardSnapshot {
            patient_id: patient_id.to_string(),
            period,
            patient: CardState::from_result("patient", patient),
            clinical: ClinicalData {
                encounters: next_clinical("encounters"),
                conditions: next_clinical("conditions"),
                medication_requests: next_clinical("medicationRequests"),
                observations: next_clinical("observations"),
            },
            cms138: CardState::from_result("cms138", cms138),
            cms69: CardState::from_result("cms69", cms69),
            hospice: CardState::from_result("hospice", hospice),
            palliative_care: CardState::from_result("palliativeCare", palliative),
            clauses: clauses.map(|result| CardState::from_result("clauses", result)),
        };
        log::info!(
            "dashboard for patient {} loaded, {} failed cards",
            patient_id,
            snapshot.failed_cards().len()
        );
        snapshot
    }
}

/// Result of [`DashboardSession::refresh`]
#[derive(Debug, Clone)]
pub enum Refresh {
    Committed(Arc<DashboardSnapshot>),
    /// A newer selection started while this one was loading
    Superseded { generation: u64, latest: u64 },
}

impl Refresh {
    pub fn snapshot(&self) -> Option<&Arc<DashboardSnapshot>> {
        match self {
            Self::Committed(snapshot) => Some(snapshot),
            Self::Superseded { .. } => None,
        }
    }
}

/// A dashboard that only ever shows the newest selection's data
pub struct DashboardSession {
    dashboard: Dashboard,
    guard: GenerationGuard<DashboardSnapshot>,
}

impl DashboardSession {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            guard: GenerationGuard::new(),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub async fn refresh(&self, selection: &Selection) -> Refresh {
        let period = selection.period.resolve_now();
        self.refresh_resolved(&selection.patient_id, period).await
    }

    pub async fn refresh_resolved(&self, patient_id: &str, period: ResolvedPeriod) -> Refresh {
        let ticket = self.guard.begin();
        let snapshot = self.dashboard.load_resolved(patient_id, period).await;
        match self.guard.commit(ticket, snapshot) {
            Commit::Committed(snapshot) => Refresh::Committed(snapshot),
            Commit::Superseded { value, latest } => {
                log::warn!(
                    "discarding dashboard load {} for patient {}, load {} is newer",
                    ticket.generation(),
                    value.patient_id,
                    latest.generation()
                );
                Refresh::Superseded {
                    generation: ticket.generation(),
                    latest: latest.generation(),
                }
            }
        }
    }

    /// Last committed snapshot
    pub fn current(&self) -> Option<Arc<DashboardSnapshot>> {
        self.guard.current()
    }
}
