//! Per-resource-type field extraction
//!
//! Each extractor walks a fixed priority chain of JSON pointers per field
//! and takes the first string found.

use serde_json::Value;

/// Fields pulled from one resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub date: Option<String>,
    pub code: Option<String>,
    pub system: Option<String>,
    pub display: String,
    pub special_details: Option<String>,
}

pub type Extractor = fn(&Value) -> Extracted;

/// Registered resource types
pub static EXTRACTORS: &[(&str, Extractor)] = &[
    ("Observation", observation),
    ("ServiceRequest", service_request),
    ("Encounter", encounter),
    ("Procedure", procedure),
    ("Condition", condition),
];

pub fn extractor_for(resource_type: &str) -> Option<Extractor> {
    EXTRACTORS
        .iter()
        .find(|(name, _)| *name == resource_type)
        .map(|(_, extract)| *extract)
}

fn first_str(resource: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .find_map(|p| resource.pointer(p).and_then(Value::as_str))
        .map(str::to_string)
}

/// Code, system and display from a CodeableConcept at `concept`
fn coding(resource: &Value, concept: &str, fallback: &str) -> (Option<String>, Option<String>, String) {
    let code = format!("{}/coding/0/code", concept);
    let system = format!("{}/coding/0/system", concept);
    let display = format!("{}/coding/0/display", concept);
    let text = format!("{}/text", concept);
    (
        first_str(resource, &[code.as_str()]),
        first_str(resource, &[system.as_str()]),
        first_str(resource, &[display.as_str(), text.as_str()])
            .unwrap_or_else(|| fallback.to_string()),
    )
}

fn observation(resource: &Value) -> Extracted {
    let (code, system, display) = coding(resource, "/code", "Unknown observation");
    Extracted {
        date: first_str(resource, &["/effectiveDateTime", "/effectivePeriod/start", "/issued"]),
        code,
        system,
        display,
        special_details: observation_value(resource),
    }
}

fn observation_value(resource: &Value) -> Option<String> {
    if let Some(text) = first_str(
        resource,
        &["/valueCodeableConcept/coding/0/display", "/valueCodeableConcept/text"],
    ) {
        return Some(text);
    }
    if let Some(quantity) = resource.get("valueQuantity") {
        let value = quantity.get("value").and_then(Value::as_f64)?;
        let unit = quantity
            .get("unit")
            .or_else(|| quantity.get("code"))
            .and_then(Value::as_str);
        return Some(match unit {
            Some(unit) => format!("{} {}", value, unit),
            None => value.to_string(),
        });
    }
    first_str(resource, &["/valueString"])
}

fn service_request(resource: &Value) -> Extracted {
    let (code, system, display) = coding(resource, "/code", "Unknown service request");
    let status = first_str(resource, &["/status"]);
    let intent = first_str(resource, &["/intent"]);
    let special_details = match (status, intent) {
        (Some(s), Some(i)) => Some(format!("Status: {}, Intent: {}", s, i)),
        (Some(s), None) => Some(format!("Status: {}", s)),
        (None, Some(i)) => Some(format!("Intent: {}", i)),
        (None, None) => None,
    };
    Extracted {
        date: first_str(
            resource,
            &["/authoredOn", "/occurrenceDateTime", "/occurrencePeriod/start"],
        ),
        code,
        system,
        display,
        special_details,
    }
}

fn encounter(resource: &Value) -> Extracted {
    let (code, system, display) = coding(resource, "/type/0", "Unknown encounter");
    Extracted {
        date: first_str(resource, &["/period/start"]),
        code,
        system,
        display,
        special_details: first_str(
            resource,
            &[
                "/hospitalization/dischargeDisposition/coding/0/display",
                "/hospitalization/dischargeDisposition/text",
            ],
        )
        .map(|d| format!("Discharge: {}", d)),
    }
}

fn procedure(resource: &Value) -> Extracted {
    let (code, system, display) = coding(resource, "/code", "Unknown procedure");
    Extracted {
        date: first_str(resource, &["/performedDateTime", "/performedPeriod/start"]),
        code,
        system,
        display,
        special_details: first_str(resource, &["/status"]).map(|s| format!("Status: {}", s)),
    }
}

fn condition(resource: &Value) -> Extracted {
    let (code, system, display) = coding(resource, "/code", "Unknown condition");
    Extracted {
        date: first_str(
            resource,
            &["/onsetDateTime", "/onsetPeriod/start", "/recordedDate"],
        ),
        code,
        system,
        display,
        special_details: first_str(resource, &["/clinicalStatus/coding/0/code"])
            .map(|s| format!("Clinical status: {}", s)),
    }
}
