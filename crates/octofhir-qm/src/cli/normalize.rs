//! Normalize command implementation

use anyhow::{Context, Result};
use octofhir_qm_normalize::{normalize, EvidenceReport, MeasureKind, NormalizedMeasure, PopulationBuckets};
use octofhir_qm_types::Parameters;
use std::fs;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use super::common::GlobalOptions;
use super::output;

/// Configuration for normalize command
pub struct NormalizeConfig {
    pub file: PathBuf,
    pub measure: String,
}

/// Normalize a saved `Library/$evaluate` response
pub async fn normalize_file(config: NormalizeConfig, options: &GlobalOptions) -> Result<()> {
    let kind: MeasureKind = config.measure.parse()?;
    let text = fs::read_to_string(&config.file)
        .with_context(|| format!("Failed to read {}", config.file.display()))?;
    let params = Parameters::from_json_str(&text)
        .with_context(|| format!("Failed to parse {}", config.file.display()))?;

    if options.verbose {
        eprintln!("Normalizing {} parameters as {}", params.len(), kind);
    }

    let result = normalize(kind, &params);
    print_measure(&result, options)
}

pub(crate) fn print_measure(result: &NormalizedMeasure, options: &GlobalOptions) -> Result<()> {
    let value = serde_json::to_value(result).context("Failed to serialize result")?;
    output::print_output(&value, options.format, Some(summary_table(result)), options.output_file())?;
    if result.practitioner_alert() == Some(true) {
        eprintln!(
            "{}",
            output::format_warning("Practitioner alert: a patient score is 0")
        );
    }
    Ok(())
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Population")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn row(name: impl Into<String>, value: impl Into<String>) -> Row {
    Row {
        name: name.into(),
        value: value.into(),
    }
}

fn show<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

fn population_rows(p: &PopulationBuckets, rows: &mut Vec<Row>) {
    rows.push(row("Initial Population", show(p.initial_population)));
    for (name, value) in p.denominators.iter().chain(&p.exclusions).chain(&p.numerators) {
        let value = value.as_ref().map(|c| match c.as_boolean() {
            Some(b) => b.to_string(),
            None => format!("{:?}", c),
        });
        rows.push(row(name.as_str(), show(value)));
    }
    for (name, score) in &p.patient_scores {
        rows.push(row(name.as_str(), show(*score)));
    }
    for action in &p.specific_actions {
        rows.push(row("Action", action.as_str()));
    }
    if let Some(goals) = &p.all_goals_met {
        rows.push(row("All Goals Met", goals.as_str()));
    }
}

fn evidence_rows(report: &EvidenceReport, rows: &mut Vec<Row>) {
    rows.push(row("Flag", report.flag.to_string()));
    for item in &report.evidence_list {
        rows.push(row(
            item.category.as_str(),
            format!(
                "{} | {} | {} {}",
                item.display_date,
                item.display,
                item.system_abbrev,
                item.code.as_deref().unwrap_or("-")
            ),
        ));
    }
}

/// Population and evidence summary for table output
pub fn summary_table(result: &NormalizedMeasure) -> String {
    let mut rows = Vec::new();
    match result {
        NormalizedMeasure::Cms138(r) => {
            population_rows(&r.populations, &mut rows);
            rows.push(row("Qualifying encounters", r.qualifying_encounters.len().to_string()));
            rows.push(row("Tobacco screenings", r.tobacco_screenings.len().to_string()));
            rows.push(row("Practitioner alert", r.practitioner_alert.to_string()));
        }
        NormalizedMeasure::Cms69(r) => {
            population_rows(&r.populations, &mut rows);
            rows.push(row("Has normal BMI", show(r.has_normal_bmi)));
            rows.push(row("BMI not done", show(r.bmi_not_done_category)));
            rows.push(row("BMI observations", r.bmi_observations.len().to_string()));
            rows.push(row("Practitioner alert", r.practitioner_alert.to_string()));
        }
        NormalizedMeasure::Hospice(report) | NormalizedMeasure::PalliativeCare(report) => {
            evidence_rows(report, &mut rows);
        }
    }
    Table::new(rows).with(Style::modern()).to_string()
}
