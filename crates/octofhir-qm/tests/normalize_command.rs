//! `qm normalize` against saved responses

use octofhir_qm::cli::common::GlobalOptions;
use octofhir_qm::cli::normalize::{normalize_file, NormalizeConfig};
use octofhir_qm::cli::output::OutputFormat;
use serde_json::{json, Value};
use std::fs;

fn options(output: &std::path::Path) -> GlobalOptions {
    GlobalOptions {
        verbose: false,
        format: OutputFormat::Json,
        output_file: Some(output.to_path_buf()),
        config_file: None,
    }
}

#[tokio::test]
async fn normalizes_saved_cms69_response() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cms69.json");
    let output = dir.path().join("out.json");
    fs::write(
        &input,
        json!({
            "resourceType": "Parameters",
            "parameter": [
                {"name": "Initial Population", "valueBoolean": true},
                {"name": "Denominator", "valueBoolean": true},
                {"name": "Numerator", "valueBoolean": false},
                {"name": "Patient Score", "valueInteger": 0}
            ]
        })
        .to_string(),
    )
    .unwrap();

    let config = NormalizeConfig {
        file: input,
        measure: "cms69".into(),
    };
    normalize_file(config, &options(&output)).await.unwrap();

    let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["measure"], "cms69");
    assert_eq!(written["result"]["patientScore"], 0);
    assert_eq!(written["result"]["practitionerAlert"], true);
}

#[tokio::test]
async fn rejects_unknown_measure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("params.json");
    fs::write(&input, r#"{"resourceType": "Parameters"}"#).unwrap();

    let config = NormalizeConfig {
        file: input,
        measure: "cms2".into(),
    };
    let err = normalize_file(config, &options(&dir.path().join("out.json")))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("QM0003"));
}

#[tokio::test]
async fn rejects_operation_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("outcome.json");
    fs::write(
        &input,
        json!({
            "resourceType": "OperationOutcome",
            "issue": [{"severity": "error", "diagnostics": "Library not found"}]
        })
        .to_string(),
    )
    .unwrap();

    let config = NormalizeConfig {
        file: input,
        measure: "hospice".into(),
    };
    let err = normalize_file(config, &options(&dir.path().join("out.json")))
        .await
        .unwrap_err();
    let qm = err.downcast_ref::<octofhir_qm::QmError>().unwrap();
    assert_eq!(qm.code(), octofhir_qm::diagnostics::QM0002);
}
