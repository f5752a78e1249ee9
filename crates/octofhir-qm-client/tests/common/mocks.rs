//! Mock backends with configurable responses
//!
//! Every call is recorded so tests can check which period was sent.

use async_trait::async_trait;
use octofhir_qm_client::{ClientError, ClinicalResource, FhirServer, QualityAnalytics, Result};
use octofhir_qm_types::{Parameters, ResolvedPeriod};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// One recorded request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub target: String,
    pub patient_id: String,
    pub period: Option<ResolvedPeriod>,
}

/// In-memory FHIR server
pub struct MockFhirServer {
    libraries: Arc<RwLock<HashMap<String, Parameters>>>,
    clinical: Arc<RwLock<HashMap<(ClinicalResource, String), Vec<Value>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    calls: Arc<RwLock<Vec<Call>>>,
}

impl MockFhirServer {
    pub fn new() -> Self {
        Self {
            libraries: Arc::new(RwLock::new(HashMap::new())),
            clinical: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            delays: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Configure the `Library/$evaluate` answer for a library
    pub fn set_library(&self, library_id: impl Into<String>, params: Parameters) {
        self.libraries.write().insert(library_id.into(), params);
    }

    pub fn set_clinical(&self, kind: ClinicalResource, patient_id: &str, resources: Vec<Value>) {
        self.clinical
            .write()
            .insert((kind, patient_id.to_string()), resources);
    }

    /// Make every request to `target` (a library id or a resource type)
    /// answer HTTP 500
    pub fn fail(&self, target: impl Into<String>) {
        self.failing.write().insert(target.into());
    }

    /// Delay every request for `patient_id`
    pub fn delay_patient(&self, patient_id: impl Into<String>, delay: Duration) {
        self.delays.write().insert(patient_id.into(), delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.read().clone()
    }

    async fn enter(&self, target: &str, patient_id: &str, period: Option<&ResolvedPeriod>) -> Result<()> {
        self.calls.write().push(Call {
            target: target.to_string(),
            patient_id: patient_id.to_string(),
            period: period.copied(),
        });
        let delay = self.delays.read().get(patient_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.read().contains(target) {
            return Err(ClientError::Status {
                status: 500,
                url: format!("mock://{}", target),
                body: "boom".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockFhirServer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FhirServer for MockFhirServer {
    async fn evaluate_library(
        &self,
        library_id: &str,
        patient_id: &str,
        period: &ResolvedPeriod,
    ) -> Result<Parameters> {
        self.enter(library_id, patient_id, Some(period)).await?;
        Ok(self
            .libraries
            .read()
            .get(library_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn evaluate_measure(
        &self,
        measure_id: &str,
        patient_id: &str,
        period: &ResolvedPeriod,
    ) -> Result<Value> {
        self.enter(measure_id, patient_id, Some(period)).await?;
        Ok(json!({"resourceType": "MeasureReport", "measure": measure_id}))
    }

    async fn read_patient(&self, patient_id: &str) -> Result<Value> {
        self.enter("Patient", patient_id, None).await?;
        Ok(json!({"resourceType": "Patient", "id": patient_id}))
    }

    async fn search_patients(&self, count: u32) -> Result<Vec<Value>> {
        self.enter("Patient?", "", None).await?;
        Ok((0..count.min(3))
            .map(|i| json!({"resourceType": "Patient", "id": format!("p-{}", i)}))
            .collect())
    }

    async fn search_clinical(&self, kind: ClinicalResource, patient_id: &str) -> Result<Vec<Value>> {
        self.enter(kind.resource_type(), patient_id, None).await?;
        Ok(self
            .clinical
            .read()
            .get(&(kind, patient_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Analytics backend answering with a fixed response
pub struct MockAnalytics {
    response: Arc<RwLock<Value>>,
}

impl MockAnalytics {
    pub fn new(response: Value) -> Self {
        Self {
            response: Arc::new(RwLock::new(response)),
        }
    }
}

#[async_trait]
impl QualityAnalytics for MockAnalytics {
    async fn evaluate_clauses(
        &self,
        _measure_id: &str,
        _patient_id: &str,
        _period: &ResolvedPeriod,
    ) -> Result<Value> {
        Ok(self.response.read().clone())
    }
}
