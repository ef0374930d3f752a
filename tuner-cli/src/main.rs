//! # Tuner - command line front end
//!
//! Analyses one recorded tone and prints its pitch, nearest note, cent
//! deviation and harmonics. `--json` prints the full analysis instead.

mod logging;
mod report;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use tuner_core::{
    AnalysisConfig, AnalysisError, AnalysisResult, AudioSource, FixedNote, PitchAnalyzer, WavSource,
    WindowKind,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Detects the pitch of a recorded tone", long_about = None)]
struct Args {
    /// WAV file to analyse
    #[arg()]
    file_path: PathBuf,
    /// TOML file with analysis settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Window applied before the FFT (rectangular, hamming, hanning, blackman)
    #[arg(long)]
    window: Option<WindowKind>,
    /// Find the fundamental in a centered slice of this many samples
    #[arg(long)]
    sub_window: Option<usize>,
    /// Highest harmonic order to track
    #[arg(long)]
    max_order: Option<u32>,
    /// Interpolate the fundamental between FFT bins
    #[arg(long)]
    refine: bool,
    /// Measure against this note (e.g. "E2") instead of the nearest one
    #[arg(long)]
    target: Option<String>,
    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,
    /// More log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(&args) {
        Ok(analysis_result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&analysis_result)?);
            } else {
                println!("Analyzing: {}", args.file_path.display());
                println!();
                print!("{}", report::render(&analysis_result));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run(args: &Args) -> Result<AnalysisResult, AnalysisError> {
    let config = build_config(args)?;
    let target = args.target.as_deref().map(FixedNote::from_label).transpose()?;
    debug!(?config, ?target, "analysis configuration");

    let buffer = WavSource.load(&args.file_path)?;
    match target {
        Some(target) => PitchAnalyzer::with_catalog(config, target).analyze(&buffer),
        None => PitchAnalyzer::new(config).analyze(&buffer),
    }
}

/// Starts from the config file (or defaults) and applies flag overrides.
fn build_config(args: &Args) -> Result<AnalysisConfig, AnalysisError> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(window) = args.window {
        config.window = window;
    }
    if let Some(size) = args.sub_window {
        config.sub_window = Some(size);
    }
    if let Some(order) = args.max_order {
        config.max_harmonic_order = order;
    }
    if args.refine {
        config.refine_peak = true;
    }
    config.validate()?;
    Ok(config)
}
