//! Dashboard configuration
//!
//! Read from a JSON file with camelCase keys; every key is optional.
//! `QM_FHIR_BASE_URL` and `QM_ANALYTICS_BASE_URL` override the file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ClientError, Result};

pub const FHIR_BASE_URL_ENV: &str = "QM_FHIR_BASE_URL";
pub const ANALYTICS_BASE_URL_ENV: &str = "QM_ANALYTICS_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    pub fhir_base_url: String,
    pub analytics_base_url: String,
    pub cms138_library: String,
    pub cms69_library: String,
    pub hospice_library: String,
    pub palliative_library: String,
    pub analytics_measure_id: String,
    pub patient_page_size: u32,
    /// No timeout when absent
    pub request_timeout_secs: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fhir_base_url: "http://localhost:8080/fhir".to_string(),
            analytics_base_url: "http://localhost:3000".to_string(),
            cms138_library: "CMS138FHIRPreventiveTobaccoCessation".to_string(),
            cms69_library: "CMS69FHIRPCSBMIScreenAndFollowUp".to_string(),
            hospice_library: "Hospice".to_string(),
            palliative_library: "PalliativeCare".to_string(),
            analytics_measure_id: "CMS69FHIRPCSBMIScreenAndFollowUp".to_string(),
            patient_page_size: 50,
            request_timeout_secs: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `path` if given, otherwise defaults, then apply environment
    /// overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup; empty values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(FHIR_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            log::debug!("{} overrides fhirBaseUrl", FHIR_BASE_URL_ENV);
            self.fhir_base_url = url;
        }
        if let Some(url) = lookup(ANALYTICS_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            log::debug!("{} overrides analyticsBaseUrl", ANALYTICS_BASE_URL_ENV);
            self.analytics_base_url = url;
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        validate_base_url(&self.fhir_base_url)?;
        validate_base_url(&self.analytics_base_url)?;
        for (key, value) in [
            ("cms138Library", &self.cms138_library),
            ("cms69Library", &self.cms69_library),
            ("hospiceLibrary", &self.hospice_library),
            ("palliativeLibrary", &self.palliative_library),
            ("analyticsMeasureId", &self.analytics_measure_id),
        ] {
            if value.trim().is_empty() {
                return Err(ClientError::Config(format!("{} must not be empty", key)));
            }
        }
        if self.patient_page_size == 0 {
            return Err(ClientError::Config("patientPageSize must be positive".into()));
        }
        Ok(())
    }
}

/// Parse an http(s) base URL, without its trailing slash
pub fn validate_base_url(url: &str) -> Result<String> {
    let parsed = reqwest::Url::parse(url.trim()).map_err(|_| ClientError::Url(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ClientError::Url(url.to_string()));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
