//! Command-line interface for trucode.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, warn};

use crate::config::Config;
use crate::report;
use crate::suggest::{NoopScorer, RemoteScorer, Scorer};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Static analyzer for Python source files.
///
/// TruCode parses a single Python file, detects a fixed catalogue of
/// code-quality defects and prints actionable improvement suggestions.
/// Findings never fail the invocation; only unreadable input does.
#[derive(Parser)]
#[command(name = "trucode")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the Python file to analyze
    pub path: PathBuf,

    /// Path to a settings YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Enable diagnostic logging of pipeline stages
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable AI-assisted suggestion scoring
    #[arg(long)]
    pub no_ai: bool,
}

/// Run the analysis described by the parsed arguments.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    if cli.format != "pretty" && cli.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            cli.format
        );
        return Ok(EXIT_ERROR);
    }

    let config = load_config(cli)?;

    let source = std::fs::read_to_string(&cli.path)
        .with_context(|| format!("cannot read {}", cli.path.display()))?;

    let scorer = build_scorer(&config, cli.no_ai);
    let analysis = crate::analyze(&source, &config, scorer);

    let path_str = cli.path.to_string_lossy();
    match cli.format.as_str() {
        "json" => report::write_json(&path_str, &analysis)?,
        _ => report::write_pretty(&path_str, &analysis),
    }

    // Findings are the product, not a failure.
    Ok(EXIT_SUCCESS)
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => Config::parse_file(path)
            .with_context(|| format!("reading settings {}", path.display())),
        None => match Config::discover() {
            Some(path) => {
                debug!(path = %path.display(), "using discovered settings file");
                Config::parse_file(&path)
                    .with_context(|| format!("reading settings {}", path.display()))
            }
            None => Ok(Config::default()),
        },
    }
}

/// Choose the scoring collaborator: the HTTP scorer when configured and
/// allowed, the null object otherwise.
fn build_scorer(config: &Config, no_ai: bool) -> Box<dyn Scorer> {
    if no_ai || !config.ai.enabled {
        return Box::new(NoopScorer);
    }
    let Some(endpoint) = &config.ai.endpoint else {
        debug!("no scoring endpoint configured, keeping baseline suggestions");
        return Box::new(NoopScorer);
    };
    match RemoteScorer::new(endpoint.clone(), Duration::from_millis(config.ai.timeout_ms)) {
        Ok(scorer) => Box::new(scorer),
        Err(e) => {
            warn!(error = %e, "failed to set up the scoring client, AI disabled");
            Box::new(NoopScorer)
        }
    }
}
