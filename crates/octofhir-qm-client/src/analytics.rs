//! Quality analytics backend client

use async_trait::async_trait;
use octofhir_qm_types::ResolvedPeriod;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::config::{validate_base_url, DashboardConfig};
use crate::error::{ClientError, Result};
use crate::fhir::{build_http_client, read_json};
use crate::provider::QualityAnalytics;

/// Body of `POST /measures/{id}/evaluate`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub patient_ids: Vec<String>,
    pub measurement_period_start: String,
    pub measurement_period_end: String,
    pub options: EvaluateOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateOptions {
    pub include_clause_results: bool,
}

impl EvaluateRequest {
    pub fn for_patient(patient_id: &str, period: &ResolvedPeriod) -> Self {
        Self {
            patient_ids: vec![patient_id.to_string()],
            measurement_period_start: period.start_param(),
            measurement_period_end: period.end_param(),
            options: EvaluateOptions {
                include_clause_results: true,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    base_url: String,
    client: reqwest::Client,
}

impl AnalyticsClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<std::time::Duration>) -> Result<Self> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            client: build_http_client(timeout)?,
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Self::with_timeout(&config.analytics_base_url, config.request_timeout())
    }
}

pub fn evaluate_url(base_url: &str, measure_id: &str) -> Result<Url> {
    let raw = format!("{}/measures/{}/evaluate", base_url, measure_id);
    Url::parse(&raw).map_err(|_| ClientError::Url(raw))
}

#[async_trait]
impl QualityAnalytics for AnalyticsClient {
    async fn evaluate_clauses(
        &self,
        measure_id: &str,
        patient_id: &str,
        period: &ResolvedPeriod,
    ) -> Result<Value> {
        let url = evaluate_url(&self.base_url, measure_id)?;
        let body = EvaluateRequest::for_patient(patient_id, period);
        log::info!("analytics request {} for patient {}", url, patient_id);
        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), e))?;
        read_json(response, url.as_str()).await
    }
}
