//! woopra-map: map analytics events into Woopra tracking payloads.
//!
//! Reads one JSON event (or an array of events) from a file or stdin and
//! prints the mapped payloads, or the shaped requests, to stdout.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use woopra_core::{parse_events, WoopraSettings};
use woopra_mapper::{DestinationAdaptor, WoopraAdaptor};

#[derive(Parser, Debug)]
#[command(name = "woopra-map")]
#[command(about = "Map identify/track events into Woopra tracking payloads")]
#[command(version)]
struct Cli {
    /// Woopra project domain (overrides config)
    #[arg(long, env = "WOOPRA__DOMAIN")]
    domain: Option<String>,

    /// Idle timeout in milliseconds (overrides config)
    #[arg(long, env = "WOOPRA__TIMEOUT")]
    timeout: Option<u64>,

    /// Settings file (TOML, JSON or YAML) layered under the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read events from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,

    /// Print shaped GET requests instead of payloads
    #[arg(long, default_value_t = false)]
    request: bool,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the mapped output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "woopra_map=info,woopra_mapper=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => WoopraSettings::load_from(path),
        None => WoopraSettings::load(),
    };
    let mut settings = loaded.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load settings, using defaults");
        WoopraSettings::default()
    });

    if let Some(domain) = cli.domain {
        settings.domain = domain;
    }
    if let Some(timeout) = cli.timeout {
        settings.timeout = Some(timeout);
    }

    let adaptor = WoopraAdaptor::new(settings);
    adaptor
        .validate_config()
        .context("Woopra settings are incomplete")?;

    let raw = match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let events = parse_events(&raw)?;
    info!(
        count = events.len(),
        domain = %adaptor.settings().domain,
        request = cli.request,
        "Mapping events"
    );

    let output = if cli.request {
        events
            .iter()
            .map(|event| adaptor.request(event).map(|r| r.to_json()))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        adaptor
            .transform_batch(&events)?
            .into_iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
