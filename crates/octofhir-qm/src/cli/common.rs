//! Arguments and setup shared by the network commands

use anyhow::{Context, Result};
use clap::Args;
use octofhir_qm_client::DashboardConfig;
use octofhir_qm_types::MeasurementPeriod;
use std::path::{Path, PathBuf};

use super::output::OutputFormat;

/// Measurement period flags
#[derive(Debug, Clone, Default, Args)]
pub struct PeriodArgs {
    /// Period start (YYYY-MM-DD)
    #[arg(long, requires = "period_end", conflicts_with = "real_time")]
    pub period_start: Option<String>,

    /// Period end (YYYY-MM-DD)
    #[arg(long, requires = "period_start", conflicts_with = "real_time")]
    pub period_end: Option<String>,

    /// January 1 of this year through today (the default)
    #[arg(long)]
    pub real_time: bool,
}

impl PeriodArgs {
    pub fn to_period(&self) -> Result<MeasurementPeriod> {
        match (&self.period_start, &self.period_end) {
            (Some(start), Some(end)) if !self.real_time => {
                Ok(MeasurementPeriod::parse_range(start, end)?)
            }
            _ => Ok(MeasurementPeriod::RealTime),
        }
    }
}

/// Options every command receives from the global flags
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub verbose: bool,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

impl GlobalOptions {
    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }
}

/// Load configuration: file (if any), then environment overrides
pub fn load_config(options: &GlobalOptions) -> Result<DashboardConfig> {
    let path = options.config_file.as_deref();
    let config = DashboardConfig::load(path)
        .map_err(octofhir_qm_diagnostics::QmError::from)
        .with_context(|| match path {
            Some(path) => format!("Failed to load config from {}", path.display()),
            None => "Failed to load default config".to_string(),
        })?;
    if options.verbose {
        eprintln!("FHIR server: {}", config.fhir_base_url);
        eprintln!("Analytics backend: {}", config.analytics_base_url);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_defaults_to_real_time() {
        assert_eq!(PeriodArgs::default().to_period().unwrap(), MeasurementPeriod::RealTime);
    }

    #[test]
    fn test_period_range() {
        let args = PeriodArgs {
            period_start: Some("2026-01-01".into()),
            period_end: Some("2026-12-31".into()),
            real_time: false,
        };
        assert_eq!(
            args.to_period().unwrap(),
            MeasurementPeriod::calendar_year(2026).unwrap()
        );
    }

    #[test]
    fn test_inverted_period_is_rejected() {
        let args = PeriodArgs {
            period_start: Some("2026-12-31".into()),
            period_end: Some("2026-01-01".into()),
            real_time: false,
        };
        assert!(args.to_period().is_err());
    }
}
