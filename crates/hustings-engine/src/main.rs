//! Election engine binary for the Hustings simulation.
//!
//! Loads configuration, runs one election cycle, logs the outcome, and
//! optionally writes the JSON report.
//!
//! # Startup sequence
//!
//! 1. Load configuration from `HUSTINGS_CONFIG` or `hustings-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Run the election on the actor runtime, or in lockstep with `--lockstep`
//! 4. Log the result
//! 5. Write the report if `report.path` is set

use std::path::PathBuf;

use anyhow::Context;
use hustings_core::config::{LoggingConfig, SimulationConfig};
use hustings_core::{ElectionReport, Lockstep, runtime};
use hustings_types::Party;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "HUSTINGS_CONFIG";

/// Config file used when `HUSTINGS_CONFIG` is unset.
const DEFAULT_CONFIG: &str = "hustings-config.yaml";

/// Application entry point.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::var_os(CONFIG_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let config = SimulationConfig::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    init_tracing(&config.logging);

    let lockstep = std::env::args().skip(1).any(|arg| arg == "--lockstep");
    info!(
        config = %path.display(),
        seed = config.seed,
        voters = config.agents.population.voters,
        candidates = config.agents.selection.candidates,
        seats = config.agents.ballot.seats,
        lockstep,
        "hustings-engine starting"
    );

    let report = if lockstep {
        Lockstep::new(&config)?.run_with_report()?
    } else {
        runtime::run(&config).await?
    };
    log_results(&report);

    if let Some(out) = &config.report.path {
        report
            .write_to(out)
            .with_context(|| format!("writing report to {}", out.display()))?;
    }

    info!(run_id = %report.run_id, "hustings-engine shutdown complete");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn log_results(report: &ElectionReport) {
    let r = &report.results;
    info!(
        tick = r.tick,
        population = r.population,
        turnout = %format!("{:.1}%", r.turnout() * 100.0),
        valid = r.valid_votes,
        null = r.null_votes,
        abstentions = r.abstentions,
        eliminated = r.eliminated.len(),
        events = report.events.len(),
        "election closed"
    );
    for party in Party::ALL {
        info!(
            party = party.code(),
            votes = r.votes_for(party),
            seats = r.seats_for(party),
            "party result"
        );
    }
    for elected in &r.elected {
        info!(
            candidate = %elected.candidate,
            party = %elected.party,
            influence = elected.influence,
            reach = elected.reach,
            "elected"
        );
    }
}
