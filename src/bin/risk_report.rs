//! Risk Network Report
//!
//! Runs the full analysis pipeline over a JSON input file and writes the
//! report as pretty JSON.
//!
//! Usage:
//! ```bash
//! cargo run --bin risk_report -- --input demos/supply_chain.json --seed 42
//! ```

use std::fs::File;
use std::io::Write as IoWrite;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use risknet::{AnalysisConfig, AnalysisInput, RiskAnalyzer};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "risk_report")]
#[command(version, about = "Risk network simulation and resilience report", long_about = None)]
struct Cli {
    /// Analysis input: risks, interactions and optional scenario data
    #[arg(short, long)]
    input: PathBuf,

    /// Analysis configuration (JSON); defaults apply to missing sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Monte Carlo seed, overrides the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Monte Carlo trial count, overrides the configuration
    #[arg(long)]
    simulations: Option<usize>,

    /// Output file path; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(n) = cli.simulations {
        config = config.with_num_simulations(n);
    }

    let raw = std::fs::read_to_string(&cli.input)?;
    let input: AnalysisInput = serde_json::from_str(&raw)?;
    info!(
        input = %cli.input.display(),
        risks = input.risks.len(),
        "Loaded analysis input"
    );

    let report = RiskAnalyzer::new(config)?.analyze(&input)?;
    let json = serde_json::to_string_pretty(&report)?;

    match &cli.output {
        Some(path) => {
            let mut file = File::create(path)?;
            writeln!(file, "{json}")?;
            info!(output = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
