//! Patients command implementation

use anyhow::{Context, Result};
use octofhir_qm_client::{FhirClient, FhirServer};
use octofhir_qm_diagnostics::QmError;
use serde_json::Value;
use tabled::{settings::Style, Table, Tabled};

use super::common::{load_config, GlobalOptions};
use super::output;

/// Configuration for patients command
pub struct PatientsConfig {
    /// Overrides `patientPageSize`
    pub count: Option<u32>,
}

/// List patients on the FHIR server
pub async fn patients(config: PatientsConfig, options: &GlobalOptions) -> Result<()> {
    let settings = load_config(options)?;
    let count = config.count.unwrap_or(settings.patient_page_size);
    let client = FhirClient::from_config(&settings).map_err(QmError::from)?;

    let patients = client
        .search_patients(count)
        .await
        .map_err(QmError::from)
        .context("Patient search failed")?;

    if options.verbose {
        eprintln!("Found {} patients", patients.len());
    }

    let value = Value::Array(patients);
    output::print_output(&value, options.format, Some(patient_table(&value)), options.output_file())
}

#[derive(Tabled)]
struct PatientRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Gender")]
    gender: String,
    #[tabled(rename = "Birth date")]
    birth_date: String,
}

/// `given family` of the first name, else its text
pub fn display_name(patient: &Value) -> String {
    let Some(name) = patient.pointer("/name/0") else {
        return "-".to_string();
    };
    let given: Vec<&str> = name
        .get("given")
        .and_then(Value::as_array)
        .map(|given| given.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let family = name.get("family").and_then(Value::as_str);

    let mut parts = given;
    parts.extend(family);
    if parts.is_empty() {
        return name
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("-")
            .to_string();
    }
    parts.join(" ")
}

fn text(patient: &Value, key: &str) -> String {
    patient
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("-")
        .to_string()
}

pub fn patient_table(patients: &Value) -> String {
    let rows: Vec<PatientRow> = patients
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|p| PatientRow {
                    id: text(p, "id"),
                    name: display_name(p),
                    gender: text(p, "gender"),
                    birth_date: text(p, "birthDate"),
                })
                .collect()
        })
        .unwrap_or_default();
    Table::new(rows).with(Style::modern()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"name": [{"given": ["Ada", "M"], "family": "Lovelace"}]}), "Ada M Lovelace")]
    #[case(json!({"name": [{"family": "Turing"}]}), "Turing")]
    #[case(json!({"name": [{"text": "Grace Hopper"}]}), "Grace Hopper")]
    #[case(json!({"id": "x"}), "-")]
    fn test_display_name(#[case] patient: Value, #[case] expected: &str) {
        assert_eq!(display_name(&patient), expected);
    }

    #[test]
    fn test_patient_table() {
        let table = patient_table(&json!([
            {"resourceType": "Patient", "id": "p-1", "gender": "female", "birthDate": "1970-02-03"}
        ]));
        assert!(table.contains("p-1"));
        assert!(table.contains("1970-02-03"));
    }
}
