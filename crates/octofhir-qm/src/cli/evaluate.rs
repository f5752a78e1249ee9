//! Evaluate command implementation

use anyhow::{Context, Result};
use octofhir_qm_client::{DashboardConfig, FhirClient, FhirServer};
use octofhir_qm_diagnostics::QmError;
use octofhir_qm_normalize::{normalize, MeasureKind};

use super::common::{load_config, GlobalOptions, PeriodArgs};
use super::normalize::print_measure;
use super::output;

/// Configuration for evaluate command
pub struct EvaluateConfig {
    pub patient: String,
    pub measure: String,
    pub period: PeriodArgs,
    /// Call `Measure/$evaluate-measure` and print the raw MeasureReport
    pub measure_report: bool,
    /// Measure resource id for `--measure-report`; defaults to the library id
    pub measure_id: Option<String>,
}

impl EvaluateConfig {
    /// Id of the Measure resource `$evaluate-measure` runs against
    pub fn measure_id<'a>(&'a self, library: &'a str) -> &'a str {
        self.measure_id.as_deref().unwrap_or(library)
    }
}

pub fn library_for(kind: MeasureKind, config: &DashboardConfig) -> &str {
    match kind {
        MeasureKind::Cms138 => &config.cms138_library,
        MeasureKind::Cms69 => &config.cms69_library,
        MeasureKind::Hospice => &config.hospice_library,
        MeasureKind::PalliativeCare => &config.palliative_library,
    }
}

/// Evaluate one measure for one patient
pub async fn evaluate(config: EvaluateConfig, options: &GlobalOptions) -> Result<()> {
    let kind: MeasureKind = config.measure.parse()?;
    let period = config.period.to_period()?;
    let resolved = period.resolve_now();
    let settings = load_config(options)?;
    let client = FhirClient::from_config(&settings).map_err(QmError::from)?;
    let library = library_for(kind, &settings);

    if options.verbose {
        eprintln!(
            "Evaluating {} ({}) for patient {} over {}",
            kind,
            library,
            config.patient,
            period
        );
    }

    if config.measure_report {
        let measure_id = config.measure_id(library);
        let report = client
            .evaluate_measure(measure_id, &config.patient, &resolved)
            .await
            .map_err(QmError::from)
            .with_context(|| format!("Measure/{}/$evaluate-measure failed", measure_id))?;
        return output::print_output(&report, options.format, None, options.output_file());
    }

    let params = client
        .evaluate_library(library, &config.patient, &resolved)
        .await
        .map_err(QmError::from)
        .with_context(|| format!("Library/{}/$evaluate failed", library))?;
    print_measure(&normalize(kind, &params), options)
}
