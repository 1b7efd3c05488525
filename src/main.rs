use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use waveform_insight::{
    audio::{AnalysisRequest, AudioAnalyzer},
    config::Config,
    profiles::Profile,
};

#[derive(Parser)]
#[command(
    name = "waveform-insight",
    version,
    about = "Analyze decoded audio samples and annotate regions of interest",
    long_about = "Reads an analysis request ({ samples, options }) as JSON, runs amplitude, spectral, pattern and profile analysis, and writes the analysis result as JSON."
)]
struct Cli {
    /// Request JSON file (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Match the built-in profiles when the request supplies none
    #[arg(short, long)]
    builtin_profiles: bool,

    /// Pretty-print the JSON result
    #[arg(short, long)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting waveform-insight v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path).map_err(|e| anyhow::anyhow!(e.user_message()))?
        }
        None => {
            info!("Using default configuration");
            Config {
                profiles: Vec::new(),
                ..Config::default()
            }
        }
    };

    let mut options = config.analysis_options();
    if cli.builtin_profiles && options.profiles.is_empty() {
        options.profiles = Profile::builtin();
    }

    let raw = match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading request from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            buf
        }
    };
    let request: AnalysisRequest = serde_json::from_str(&raw).context("parsing analysis request")?;
    info!("Request: {} samples", request.samples.len());

    let analyzer = AudioAnalyzer::with_options(options);
    let result = analyzer
        .analyze_request(request)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing result to {}", path.display()))?;
            info!("Analysis {} saved to: {:?}", result.id, path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    Ok(())
}
