//! Clauses command implementation

use anyhow::{Context, Result};
use octofhir_qm_client::{AnalyticsClient, QualityAnalytics};
use octofhir_qm_diagnostics::QmError;
use octofhir_qm_normalize::ClauseReport;
use tabled::{settings::Style, Table, Tabled};

use super::common::{load_config, GlobalOptions, PeriodArgs};
use super::output;

/// Configuration for clauses command
pub struct ClausesConfig {
    pub patient: String,
    /// Defaults to `analyticsMeasureId` from the config
    pub measure_id: Option<String>,
    pub period: PeriodArgs,
    /// Print only the cleaned highlighting HTML
    pub html: bool,
}

/// Fetch clause results and highlighting for one patient
pub async fn clauses(config: ClausesConfig, options: &GlobalOptions) -> Result<()> {
    let period = config.period.to_period()?;
    let settings = load_config(options)?;
    let measure_id = config
        .measure_id
        .unwrap_or_else(|| settings.analytics_measure_id.clone());
    let client = AnalyticsClient::from_config(&settings).map_err(QmError::from)?;

    if options.verbose {
        eprintln!(
            "Evaluating clauses of {} for patient {} over {}",
            measure_id, config.patient, period
        );
    }

    let response = client
        .evaluate_clauses(&measure_id, &config.patient, &period.resolve_now())
        .await
        .map_err(QmError::from)
        .with_context(|| format!("Clause evaluation of {} failed", measure_id))?;
    let report = ClauseReport::from_response(&response);

    if config.html {
        let html = report.cleaned_html().unwrap_or_default();
        if html.is_empty() {
            eprintln!("{}", output::format_warning("No highlighting HTML in response"));
        }
        return output::write_output(&html, options.output_file());
    }

    let value = serde_json::to_value(&report).context("Failed to serialize clause results")?;
    output::print_output(&value, options.format, Some(outcome_table(&report)), options.output_file())
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Statement")]
    statement: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Clauses")]
    clauses: usize,
}

/// Per-statement outcome summary
pub fn outcome_table(report: &ClauseReport) -> String {
    let groups = report.by_statement();
    let rows: Vec<OutcomeRow> = report
        .statement_outcomes()
        .into_iter()
        .map(|(statement, outcome)| OutcomeRow {
            statement: statement.to_string(),
            outcome: outcome.to_string(),
            clauses: groups.get(statement).map_or(0, Vec::len),
        })
        .collect();
    Table::new(rows).with(Style::modern()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_table() {
        let report = ClauseReport::from_response(&json!({
            "results": [{"detailedResults": [{"clauseResults": [
                {"statementName": "Denominator", "localId": "1", "final": "TRUE"},
                {"statementName": "Denominator", "localId": "2", "final": "FALSE"},
                {"statementName": "Numerator", "localId": "3", "final": "FALSE"}
            ]}]}]
        }));
        let table = outcome_table(&report);
        assert!(table.contains("Denominator"));
        assert!(table.contains("TRUE"));
        assert!(table.contains("Numerator"));
    }
}
