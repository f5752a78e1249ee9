//! Evidence extraction for exclusion libraries
//!
//! Hospice and palliative-care libraries return one boolean flag plus any
//! number of resource-valued statements. Each resource becomes an
//! [`EvidenceItem`] through a per-type extractor; resource types without an
//! extractor are dropped.

mod display;
mod extractors;

use indexmap::IndexMap;
use octofhir_qm_types::Parameters;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

pub use display::{display_date, system_abbrev};
pub use extractors::{extractor_for, Extracted, Extractor, EXTRACTORS};

/// Which flag parameter governs a library's evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidenceProfile {
    pub label: &'static str,
    pub flag_parameter: &'static str,
    /// JSON key the flag serializes under
    pub flag_key: &'static str,
}

impl EvidenceProfile {
    pub const HOSPICE: Self = Self {
        label: "Hospice",
        flag_parameter: "Has Hospice Services",
        flag_key: "hasHospice",
    };

    pub const PALLIATIVE_CARE: Self = Self {
        label: "Palliative Care",
        flag_parameter: "Has Palliative Care in the Measurement Period",
        flag_key: "hasPalliativeCare",
    };
}

/// One display-ready piece of evidence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    /// CQL statement that returned the resource
    pub category: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    /// Raw FHIR date or dateTime
    pub date: Option<String>,
    pub display_date: String,
    pub code: Option<String>,
    pub system: Option<String>,
    pub system_abbrev: String,
    pub display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_details: Option<String>,
}

impl EvidenceItem {
    fn from_resource(category: &str, resource_type: &str, resource: &Value, extract: Extractor) -> Self {
        let Extracted {
            date,
            code,
            system,
            display,
            special_details,
        } = extract(resource);
        Self {
            category: category.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource.get("id").and_then(Value::as_str).map(str::to_string),
            display_date: display_date(date.as_deref()),
            system_abbrev: system_abbrev(system.as_deref()),
            date,
            code,
            system,
            display,
            special_details,
        }
    }
}

/// Evidence for one exclusion library
///
/// Serializes the flag under the profile's key (`hasHospice`,
/// `hasPalliativeCare`).
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceReport {
    pub profile: EvidenceProfile,
    /// Value of the profile's flag parameter; `false` when absent
    pub flag: bool,
    /// All items, newest first
    pub evidence_list: Vec<EvidenceItem>,
    /// Items grouped by statement name, newest first within each group
    pub evidence_by_category: IndexMap<String, Vec<EvidenceItem>>,
}

impl EvidenceReport {
    pub fn new(profile: EvidenceProfile) -> Self {
        Self {
            profile,
            flag: false,
            evidence_list: Vec::new(),
            evidence_by_category: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.evidence_list.is_empty()
    }
}

impl Serialize for EvidenceReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EvidenceReport", 3)?;
        state.serialize_field(self.profile.flag_key, &self.flag)?;
        state.serialize_field("evidenceList", &self.evidence_list)?;
        state.serialize_field("evidenceByCategory", &self.evidence_by_category)?;
        state.end()
    }
}

/// Build the evidence report for a library response
pub fn extract_evidence(profile: EvidenceProfile, params: &Parameters) -> EvidenceReport {
    let mut report = EvidenceReport::new(profile);

    for param in params {
        if param.name == profile.flag_parameter {
            report.flag = param.decode().as_boolean().unwrap_or(false);
            continue;
        }

        let Some(resource) = param.resource.as_ref() else {
            continue;
        };
        let resources: Vec<&Value> = match resource {
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };

        for resource in resources {
            let Some(resource_type) = resource.get("resourceType").and_then(Value::as_str) else {
                continue;
            };
            if resource_type == "Patient" {
                continue;
            }
            match extractor_for(resource_type) {
                Some(extract) => report.evidence_list.push(EvidenceItem::from_resource(
                    &param.name,
                    resource_type,
                    resource,
                    extract,
                )),
                None => log::debug!(
                    "{}: no extractor for {} under '{}'",
                    profile.label,
                    resource_type,
                    param.name
                ),
            }
        }
    }

    // Stable sort keeps bundle order among equal dates; undated items go last
    report.evidence_list.sort_by(|a, b| b.date.cmp(&a.date));

    for item in &report.evidence_list {
        report
            .evidence_by_category
            .entry(item.category.clone())
            .or_default()
            .push(item.clone());
    }

    log::debug!(
        "{}: flag={}, {} evidence items in {} categories",
        profile.label,
        report.flag,
        report.evidence_list.len(),
        report.evidence_by_category.len()
    );
    report
}

pub fn extract_hospice(params: &Parameters) -> EvidenceReport {
    extract_evidence(EvidenceProfile::HOSPICE, params)
}

pub fn extract_palliative_care(params: &Parameters) -> EvidenceReport {
    extract_evidence(EvidenceProfile::PALLIATIVE_CARE, params)
}
