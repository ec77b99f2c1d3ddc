use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use lvgrid_engine::config::EngineConfig;
use lvgrid_engine::domain::{CableCatalog, IlluminationCatalog, Node, ProjectParams, Seed};
use lvgrid_engine::optimizer::optimize_cables;
use lvgrid_engine::telemetry::init_tracing;
use lvgrid_engine::{EngineError, LvNetworkEngine, NetworkEngine};

#[derive(Parser)]
#[command(author, version, about = "Radial LV network load flow, cable sizing and Monte Carlo risk", long_about = None)]
struct Cli {
    /// TOML file layered over the built-in defaults
    #[arg(long, env = "LVGRID_CONFIG", default_value = "config/default.toml")]
    config: PathBuf,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// One load-flow pass
    Calculate {
        /// Scenario JSON; read from stdin when omitted
        input: Option<PathBuf>,
    },
    /// Upgrade undersized cables and report the new assignment
    Optimize { input: Option<PathBuf> },
    /// Risk of limit violations under load uncertainty
    MonteCarlo {
        input: Option<PathBuf>,
        #[arg(long)]
        iterations: Option<usize>,
        /// Numeric or text seed; runs are reproducible only when set
        #[arg(long)]
        seed: Option<String>,
    },
}

/// Scenario document as exchanged with the host application
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    #[serde(default = "default_scenario_id")]
    scenario_id: String,
    nodes: Vec<Node>,
    #[serde(default)]
    params: ProjectParams,
    cables: Option<CableCatalog>,
    #[serde(alias = "ips")]
    illumination: Option<IlluminationCatalog>,
    iterations: Option<usize>,
    seed: Option<Seed>,
}

fn default_scenario_id() -> String {
    "scenario".to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OptimizeOutput<'a> {
    scenario_id: &'a str,
    #[serde(flatten)]
    outcome: lvgrid_engine::optimizer::OptimizationOutcome,
}

fn read_scenario(input: Option<&PathBuf>) -> Result<Scenario> {
    let raw = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading scenario from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading scenario from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("parsing scenario JSON")
}

fn parse_seed(raw: &str) -> Seed {
    raw.parse::<i64>()
        .map(Seed::Number)
        .unwrap_or_else(|_| Seed::Text(raw.to_string()))
}

/// Generic message for the caller, detail kept in the log and the error chain.
fn engine_failure(err: EngineError) -> anyhow::Error {
    error!(error_type = err.error_type(), %err, "engine call failed");
    anyhow::anyhow!("{}: {err}", err.user_message())
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = EngineConfig::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let engine = LvNetworkEngine::new(cfg);

    let input = match &cli.command {
        Command::Calculate { input } | Command::Optimize { input } | Command::MonteCarlo { input, .. } => {
            input.as_ref()
        }
    };
    let scenario = read_scenario(input)?;
    let cables = scenario.cables.unwrap_or_else(CableCatalog::default_aluminium);
    let illumination = scenario
        .illumination
        .unwrap_or_else(IlluminationCatalog::default_fixtures);

    info!(scenario = %scenario.scenario_id, nodes = scenario.nodes.len(), "scenario loaded");

    match cli.command {
        Command::Calculate { .. } => {
            let result = engine
                .calculate(&scenario.scenario_id, &scenario.nodes, &scenario.params, &cables, &illumination)
                .map_err(engine_failure)?;
            emit(&result, cli.pretty)
        }
        Command::Optimize { .. } => {
            let outcome = optimize_cables(
                &engine,
                &scenario.scenario_id,
                &scenario.nodes,
                &scenario.params,
                &cables,
                &illumination,
            )
            .map_err(engine_failure)?;
            emit(
                &OptimizeOutput { scenario_id: &scenario.scenario_id, outcome },
                cli.pretty,
            )
        }
        Command::MonteCarlo { iterations, seed, .. } => {
            let iterations = iterations
                .or(scenario.iterations)
                .unwrap_or(engine.config().monte_carlo.default_iterations);
            let seed = seed.as_deref().map(parse_seed).or(scenario.seed);
            let result = engine
                .run_monte_carlo(
                    &scenario.nodes,
                    &scenario.params,
                    &cables,
                    &illumination,
                    iterations,
                    seed.as_ref(),
                )
                .map_err(engine_failure)?;
            emit(&result, cli.pretty)
        }
    }
}
