//! FHIR REST client

use async_trait::async_trait;
use octofhir_qm_types::{Parameters, ResolvedPeriod};
use reqwest::Url;
use serde_json::Value;

use crate::config::{validate_base_url, DashboardConfig};
use crate::error::{ClientError, Result};
use crate::provider::{ClinicalResource, FhirServer};

const FHIR_JSON: &str = "application/fhir+json";

/// `reqwest`-backed [`FhirServer`]
#[derive(Debug, Clone)]
pub struct FhirClient {
    base_url: String,
    client: reqwest::Client,
}

impl FhirClient {
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
        Self::with_timeout(&config.fhir_base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &Url) -> Result<Value> {
        log::info!("FHIR request {}", url);
        let response = request
            .header(reqwest::header::ACCEPT, FHIR_JSON)
            .send()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), e))?;
        read_json(response, url.as_str()).await
    }
}

pub(crate) fn build_http_client(timeout: Option<std::time::Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ClientError::Config(format!("could not build HTTP client: {}", e)))
}

/// Read a JSON body, mapping non-2xx answers to [`ClientError::Status`]
pub(crate) async fn read_json(response: reqwest::Response, url: &str) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::transport(url, e))?;
    if !status.is_success() {
        log::debug!("{} answered {}", url, status);
        return Err(ClientError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| ClientError::decode(url, e.to_string()))
}

fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let raw = format!("{}/{}", base_url, path);
    Url::parse(&raw).map_err(|_| ClientError::Url(raw))
}

fn with_period(mut url: Url, patient_id: &str, period: &ResolvedPeriod) -> Url {
    url.query_pairs_mut()
        .append_pair("subject", &format!("Patient/{}", patient_id))
        .append_pair("periodStart", &period.start_param())
        .append_pair("periodEnd", &period.end_param());
    url
}

pub fn library_evaluate_url(
    base_url: &str,
    library_id: &str,
    patient_id: &str,
    period: &ResolvedPeriod,
) -> Result<Url> {
    let url = endpoint(base_url, &format!("Library/{}/$evaluate", library_id))?;
    Ok(with_period(url, patient_id, period))
}

pub fn measure_evaluate_url(
    base_url: &str,
    measure_id: &str,
    patient_id: &str,
    period: &ResolvedPeriod,
) -> Result<Url> {
    let url = endpoint(base_url, &format!("Measure/{}/$evaluate-measure", measure_id))?;
    let mut url = with_period(url, patient_id, period);
    url.query_pairs_mut().append_pair("reportType", "individual");
    Ok(url)
}

pub fn patient_url(base_url: &str, patient_id: &str) -> Result<Url> {
    endpoint(base_url, &format!("Patient/{}", patient_id))
}

pub fn patient_search_url(base_url: &str, count: u32) -> Result<Url> {
    let mut url = endpoint(base_url, "Patient")?;
    url.query_pairs_mut().append_pair("_count", &count.to_string());
    Ok(url)
}

pub fn clinical_search_url(base_url: &str, kind: ClinicalResource, patient_id: &str) -> Result<Url> {
    let mut url = endpoint(base_url, kind.resource_type())?;
    url.query_pairs_mut().append_pair("patient", patient_id);
    Ok(url)
}

/// Resources from a searchset `Bundle`; entries without a resource are skipped
pub fn bundle_resources(bundle: &Value) -> Vec<Value> {
    bundle
        .get("entry")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("resource").cloned())
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl FhirServer for FhirClient {
    async fn evaluate_library(
        &self,
        library_id: &str,
        patient_id: &str,
        period: &ResolvedPeriod,
    ) -> Result<Parameters> {
        let url = library_evaluate_url(&self.base_url, library_id, patient_id, period)?;
        let body = self.send(self.client.post(url.clone()), &url).await?;
        Parameters::from_resource(&body).map_err(|e| ClientError::decode(url.as_str(), e.to_string()))
    }

    async fn evaluate_measure(
        &self,
        measure_id: &str,
        patient_id: &str,
        period: &ResolvedPeriod,
    ) -> Result<Value> {
        let url = measure_evaluate_url(&self.base_url, measure_id, patient_id, period)?;
        self.send(self.client.post(url.clone()), &url).await
    }

    async fn read_patient(&self, patient_id: &str) -> Result<Value> {
        let url = patient_url(&self.base_url, patient_id)?;
        self.send(self.client.get(url.clone()), &url).await
    }

    async fn search_patients(&self, count: u32) -> Result<Vec<Value>> {
        let url = patient_search_url(&self.base_url, count)?;
        let bundle = self.send(self.client.get(url.clone()), &url).await?;
        Ok(bundle_resources(&bundle))
    }

    async fn search_clinical(&self, kind: ClinicalResource, patient_id: &str) -> Result<Vec<Value>> {
        let url = clinical_search_url(&self.base_url, kind, patient_id)?;
        let bundle = self.send(self.client.get(url.clone()), &url).await?;
        let resources = bundle_resources(&bundle);
        log::debug!("{} {} resources for patient {}", resources.len(), kind, patient_id);
        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use octofhir_qm_types::MeasurementPeriod;
    use serde_json::json;

    const BASE: &str = "http://localhost:8080/fhir";

    fn period() -> ResolvedPeriod {
        MeasurementPeriod::parse_range("2026-01-01", "2026-12-31")
            .unwrap()
            .resolve(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    #[test]
    fn test_library_url() {
        let url = library_evaluate_url(BASE, "CMS69", "p-1", &period()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/fhir/Library/CMS69/$evaluate?subject=Patient%2Fp-1&periodStart=2026-01-01&periodEnd=2026-12-31"
        );
    }

    #[test]
    fn test_measure_url_is_individual() {
        let url = measure_evaluate_url(BASE, "CMS138", "p-1", &period()).unwrap();
        assert!(url.path().ends_with("/Measure/CMS138/$evaluate-measure"));
        assert_eq!(
            url.query_pairs().last().map(|(k, v)| (k.into_owned(), v.into_owned())),
            Some(("reportType".to_string(), "individual".to_string()))
        );
    }

    #[test]
    fn test_search_urls() {
        assert_eq!(
            patient_search_url(BASE, 25).unwrap().as_str(),
            "http://localhost:8080/fhir/Patient?_count=25"
        );
        assert_eq!(
            clinical_search_url(BASE, ClinicalResource::MedicationRequest, "p-1")
                .unwrap()
                .as_str(),
            "http://localhost:8080/fhir/MedicationRequest?patient=p-1"
        );
        assert_eq!(
            patient_url(BASE, "p-1").unwrap().as_str(),
            "http://localhost:8080/fhir/Patient/p-1"
        );
    }

    #[test]
    fn test_bundle_resources() {
        let bundle = json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": [
                {"resource": {"resourceType": "Encounter", "id": "a"}},
                {"fullUrl": "urn:uuid:no-resource"},
                {"resource": {"resourceType": "Encounter", "id": "b"}}
            ]
        });
        let ids: Vec<_> = bundle_resources(&bundle)
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(bundle_resources(&json!({"resourceType": "Bundle"})).is_empty());
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(FhirClient::new("localhost"), Err(ClientError::Url(_))));
        let client = FhirClient::new("http://localhost:8080/fhir/").unwrap();
        assert_eq!(client.base_url(), BASE);
    }
}
