//! Canned `Parameters` bundles

use octofhir_qm_types::{Parameter, Parameters};
use serde_json::json;

pub fn cms138_zero_score() -> Parameters {
    [
        Parameter::named("Initial Population").with_boolean(true),
        Parameter::named("Denominator 1").with_boolean(true),
        Parameter::named("Numerator 1").with_boolean(false),
        Parameter::named("Patient Score 1").with_integer(0),
    ]
    .into_iter()
    .collect()
}

pub fn cms69_met() -> Parameters {
    [
        Parameter::named("Initial Population").with_boolean(true),
        Parameter::named("Denominator").with_boolean(true),
        Parameter::named("Numerator").with_boolean(true),
        Parameter::named("Patient Score").with_integer(1),
    ]
    .into_iter()
    .collect()
}

pub fn hospice_flagged() -> Parameters {
    [
        Parameter::named("Has Hospice Services").with_boolean(true),
        Parameter::named("Hospice Encounter").with_resource(json!({
            "resourceType": "Encounter",
            "id": "hospice-enc",
            "period": {"start": "2026-04-02"},
            "type": [{"coding": [{"system": "http://snomed.info/sct", "code": "183919006"}]}]
        })),
    ]
    .into_iter()
    .collect()
}
