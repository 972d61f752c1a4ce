//! snapfen CLI: chess position recognition from an image file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use snapfen::classify::DEFAULT_MODEL_PATH;
use snapfen::{load_rgb_image, DetectConfig, Detector};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "snapfen")]
#[command(about = "Read a chess position (FEN) from a board photo or screenshot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log verbosity (logs go to stderr).
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the position and print the report as JSON.
    Detect(DetectArgs),

    /// Guess whether the board is shown from white's or black's side.
    Orientation(OrientationArgs),

    /// Report which classifier backend would be used.
    Backend(PipelineArgs),
}

#[derive(Debug, Clone, Args)]
struct PipelineArgs {
    /// JSON config file; every section is optional.
    #[arg(long)]
    config: Option<PathBuf>,

    /// ONNX square-classifier model (overrides the config's `model_path`).
    #[arg(long)]
    model: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Board photo or screenshot.
    image: PathBuf,

    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct OrientationArgs {
    /// Board photo or screenshot.
    image: PathBuf,

    /// JSON config file; only the locator section is used.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let result = match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Orientation(args) => run_orientation(&args),
        Commands::Backend(args) => run_backend(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_level: LogLevel) {
    // verbosity comes from RUST_LOG
    snapfen::core::init_tracing(false);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LogLevel) {
    if let Err(e) = snapfen::core::init_with_level(level.into()) {
        eprintln!("warning: logger already installed: {e}");
    }
}

fn load_config(path: Option<&Path>) -> CliResult<DetectConfig> {
    match path {
        Some(p) => DetectConfig::load_json(p).map_err(|e| -> CliError {
            format!("failed to load config {}: {e}", p.display()).into()
        }),
        None => Ok(DetectConfig::default()),
    }
}

/// Config with the model path resolved: `--model`, then the config file,
/// then the conventional location.
fn pipeline_config(args: &PipelineArgs) -> CliResult<DetectConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(model) = &args.model {
        config.model_path = Some(model.clone());
    }
    if config.model_path.is_none() {
        config.model_path = Some(PathBuf::from(DEFAULT_MODEL_PATH));
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T, output: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            log::info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

// ── detect ─────────────────────────────────────────────────────────────

fn run_detect(args: &DetectArgs) -> CliResult<()> {
    let config = pipeline_config(&args.pipeline)?;
    let detector = Detector::from_config(&config);

    let image = load_rgb_image(&args.image)?;
    log::info!(
        "loaded {} ({}x{})",
        args.image.display(),
        image.width(),
        image.height()
    );

    let report = detector.detect(&image)?;
    print_json(&report, args.output.as_deref())
}

// ── orientation ────────────────────────────────────────────────────────

fn run_orientation(args: &OrientationArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let locator = snapfen::board::BoardLocator::new(config.locator);
    let image = load_rgb_image(&args.image)?;
    let estimate = snapfen::board::detect_orientation(&locator.locate(&image));
    print_json(&estimate, None)
}

// ── backend ────────────────────────────────────────────────────────────

fn run_backend(args: &PipelineArgs) -> CliResult<()> {
    let config = pipeline_config(args)?;
    let detector = Detector::from_config(&config);
    print_json(&detector.backend_info(), None)
}
