//! Quality-measure command-line interface

use clap::{Parser, Subcommand};
use octofhir_qm::cli::common::{GlobalOptions, PeriodArgs};
use octofhir_qm::cli::{clauses, dashboard, evaluate, normalize, output, patients};
use std::path::PathBuf;

/// Quality-measure command-line tool
#[derive(Parser)]
#[command(name = "qm")]
#[command(author, version, about = "Quality-measure results from FHIR servers", long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, table, pretty)
    #[arg(short = 'f', long, global = true, default_value = "pretty")]
    format: String,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    /// Dashboard config file (JSON)
    #[arg(short, long, global = true, env = "QM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a saved Library/$evaluate response
    Normalize {
        /// Parameters JSON file
        file: PathBuf,

        /// Measure (cms138, cms69, hospice, palliative)
        #[arg(short, long)]
        measure: String,
    },

    /// Evaluate one measure for a patient
    Evaluate {
        /// Patient id
        #[arg(short, long)]
        patient: String,

        /// Measure (cms138, cms69, hospice, palliative)
        #[arg(short, long)]
        measure: String,

        #[command(flatten)]
        period: PeriodArgs,

        /// Print the raw MeasureReport from $evaluate-measure
        #[arg(long)]
        measure_report: bool,

        /// Measure id for --measure-report (default: the library id)
        #[arg(long, requires = "measure_report")]
        measure_id: Option<String>,
    },

    /// Load every dashboard card for a patient
    Dashboard {
        /// Patient id
        #[arg(short, long)]
        patient: String,

        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Clause results and highlighting from the analytics backend
    Clauses {
        /// Patient id
        #[arg(short, long)]
        patient: String,

        /// Measure id (default: analyticsMeasureId from config)
        #[arg(long)]
        measure_id: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,

        /// Print only the cleaned highlighting HTML
        #[arg(long)]
        html: bool,
    },

    /// List patients
    Patients {
        /// Number of patients (default: patientPageSize from config)
        #[arg(short = 'n', long)]
        count: Option<u32>,
    },
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    init_logging(cli.verbose);

    let options = GlobalOptions {
        verbose: cli.verbose,
        format: output::OutputFormat::from_name(&cli.format),
        output_file: cli.output.clone(),
        config_file: cli.config.clone(),
    };

    let result = match cli.command {
        Commands::Normalize { file, measure } => {
            let config = normalize::NormalizeConfig { file, measure };
            normalize::normalize_file(config, &options).await
        }

        Commands::Evaluate {
            patient,
            measure,
            period,
            measure_report,
            measure_id,
        } => {
            let config = evaluate::EvaluateConfig {
                patient,
                measure,
                period,
                measure_report,
                measure_id,
            };
            evaluate::evaluate(config, &options).await
        }

        Commands::Dashboard { patient, period } => {
            let config = dashboard::DashboardCommandConfig { patient, period };
            dashboard::dashboard(config, &options).await
        }

        Commands::Clauses {
            patient,
            measure_id,
            period,
            html,
        } => {
            let config = clauses::ClausesConfig {
                patient,
                measure_id,
                period,
                html,
            };
            clauses::clauses(config, &options).await
        }

        Commands::Patients { count } => {
            let config = patients::PatientsConfig { count };
            patients::patients(config, &options).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
