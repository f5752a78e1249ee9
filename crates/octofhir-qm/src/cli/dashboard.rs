//! Dashboard command implementation

use anyhow::{Context, Result};
use octofhir_qm_client::{CardState, Dashboard, DashboardSnapshot, Selection};
use octofhir_qm_diagnostics::QmError;
use tabled::{settings::Style, Table, Tabled};

use super::common::{load_config, GlobalOptions, PeriodArgs};
use super::output;

/// Configuration for dashboard command
pub struct DashboardCommandConfig {
    pub patient: String,
    pub period: PeriodArgs,
}

/// Load every dashboard card for one patient
pub async fn dashboard(config: DashboardCommandConfig, options: &GlobalOptions) -> Result<()> {
    let selection = Selection::new(config.patient, config.period.to_period()?);
    let settings = load_config(options)?;
    let dashboard = Dashboard::from_config(&settings)
        .map_err(QmError::from)
        .context("Failed to set up backends")?;

    if options.verbose {
        eprintln!(
            "Loading dashboard for patient {} ({})",
            selection.patient_id, selection.period
        );
    }

    let snapshot = dashboard.load(&selection).await;
    let value = serde_json::to_value(&snapshot).context("Failed to serialize dashboard")?;
    output::print_output(&value, options.format, Some(card_table(&snapshot)), options.output_file())?;

    let failed = snapshot.failed_cards();
    if !failed.is_empty() {
        eprintln!(
            "{}",
            output::format_warning(&format!("{} card(s) failed: {}", failed.len(), failed.join(", ")))
        );
    }
    Ok(())
}

#[derive(Tabled)]
struct CardRow {
    #[tabled(rename = "Card")]
    card: &'static str,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Summary")]
    summary: String,
}

fn card_row<T>(card: &'static str, state: &CardState<T>, summarize: impl Fn(&T) -> String) -> CardRow {
    match state {
        CardState::Ready(value) => CardRow {
            card,
            status: "ready",
            summary: summarize(value),
        },
        CardState::Failed(message) => CardRow {
            card,
            status: "failed",
            summary: message.clone(),
        },
    }
}

fn count<T>(items: &[T]) -> String {
    format!("{} resources", items.len())
}

fn alert(alert: bool) -> String {
    if alert {
        "practitioner alert".to_string()
    } else {
        "no alert".to_string()
    }
}

/// One row per card
pub fn card_table(snapshot: &DashboardSnapshot) -> String {
    let clinical = &snapshot.clinical;
    let mut rows = vec![
        card_row("Patient", &snapshot.patient, output::format_value),
        card_row("Encounters", &clinical.encounters, |v| count(v)),
        card_row("Conditions", &clinical.conditions, |v| count(v)),
        card_row("Medication requests", &clinical.medication_requests, |v| count(v)),
        card_row("Observations", &clinical.observations, |v| count(v)),
        card_row("CMS138", &snapshot.cms138, |r| alert(r.practitioner_alert)),
        card_row("CMS69", &snapshot.cms69, |r| alert(r.practitioner_alert)),
        card_row("Hospice", &snapshot.hospice, |r| {
            format!("flag {}, {} evidence items", r.flag, r.evidence_list.len())
        }),
        card_row("Palliative care", &snapshot.palliative_care, |r| {
            format!("flag {}, {} evidence items", r.flag, r.evidence_list.len())
        }),
    ];
    if let Some(clauses) = &snapshot.clauses {
        rows.push(card_row("Clauses", clauses, |r| {
            format!("{} clause results", r.clause_results.len())
        }));
    }
    Table::new(rows).with(Style::modern()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use octofhir_qm_client::ClinicalData;
    use octofhir_qm_normalize::{Cms138Result, Cms69Result, EvidenceProfile, EvidenceReport};
    use octofhir_qm_types::MeasurementPeriod;
    use serde_json::json;

    #[test]
    fn test_card_table_shows_failures() {
        let snapshot = DashboardSnapshot {
            patient_id: "p-1".into(),
            period: MeasurementPeriod::RealTime.resolve(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            patient: CardState::Ready(json!({"resourceType": "Patient", "id": "p-1"})),
            clinical: ClinicalData {
                encounters: CardState::Ready(vec![json!({})]),
                conditions: CardState::Failed("HTTP 500".into()),
                medication_requests: CardState::Ready(vec![]),
                observations: CardState::Ready(vec![]),
            },
            cms138: CardState::Ready(Cms138Result::default()),
            cms69: CardState::Ready(Cms69Result {
                practitioner_alert: true,
                ..Default::default()
            }),
            hospice: CardState::Ready(EvidenceReport::new(EvidenceProfile::HOSPICE)),
            palliative_care: CardState::Failed("timeout".into()),
            clauses: None,
        };
        let table = card_table(&snapshot);
        assert!(table.contains("Patient/p-1"));
        assert!(table.contains("HTTP 500"));
        assert!(table.contains("practitioner alert"));
        assert!(table.contains("timeout"));
    }
}
