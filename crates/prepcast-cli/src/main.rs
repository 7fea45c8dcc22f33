//! prepcast CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "prepcast", version, about = "Exam score, rank and admission forecasting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast score, rank and admission chances for a profile
    Predict {
        /// Profile file (.toml with a [profile] table, or .json)
        #[arg(long)]
        profile: PathBuf,

        /// Telemetry file (.toml with a [telemetry] table, or .json)
        #[arg(long)]
        telemetry: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Directory to save forecast.json (and forecast.html) into
        #[arg(long)]
        output: Option<PathBuf>,

        /// Label stored with the saved forecast
        #[arg(long)]
        label: Option<String>,
    },

    /// Compare two saved forecasts
    Compare {
        /// Baseline forecast JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current forecast JSON
        #[arg(long)]
        current: PathBuf,

        /// Score change (points) that counts as improvement or regression
        #[arg(long, default_value = "5")]
        threshold: f64,

        /// Exit code 1 if the forecast regressed
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate profile, telemetry and config files
    Validate {
        /// Profile file or directory of profiles
        #[arg(long)]
        profile: PathBuf,

        /// Telemetry file
        #[arg(long)]
        telemetry: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Map a score to a rank
    Rank {
        /// Exam score
        #[arg(long)]
        score: u16,

        /// Exam year of the rank table
        #[arg(long)]
        year: Option<u16>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config, profile and telemetry files
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prepcast=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Predict {
            profile,
            telemetry,
            config,
            format,
            output,
            label,
        } => commands::predict::execute(profile, telemetry, config, format, output, label),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Validate {
            profile,
            telemetry,
            config,
        } => commands::validate::execute(profile, telemetry, config),
        Commands::Rank {
            score,
            year,
            config,
        } => commands::rank::execute(score, year, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
