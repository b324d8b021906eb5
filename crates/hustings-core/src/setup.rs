//! Building the cast of a run from its configuration.
//!
//! Both drivers start from the same [`Cast`]: one [`Voter`] per citizen in id
//! order, the media desk, and the authority, all seeded from the run's master
//! seed. The orchestrator is not part of the cast; each driver plays it.

use std::sync::Arc;

use tracing::info;

use hustings_agents::seed::{GRAPH_STREAM, derive_seed};
use hustings_agents::{Authority, MediaDesk, Tunables, Voter, build_citizens};
use hustings_world::{DefaultRules, NetworkProvider, SmallWorld, SupportRules};

use crate::config::SimulationConfig;
use crate::error::SimulationError;

/// Every actor of a run, before any message is exchanged.
pub struct Cast {
    /// Citizens, indexed by id.
    pub voters: Vec<Voter>,
    /// The media desk.
    pub media: MediaDesk,
    /// The electoral authority.
    pub authority: Authority,
    /// Shared tunables.
    pub tunables: Arc<Tunables>,
}

impl Cast {
    /// Number of citizens.
    pub fn population(&self) -> u32 {
        u32::try_from(self.voters.len()).unwrap_or(u32::MAX)
    }
}

/// Build the graph, the citizens, and the actors for `config`.
///
/// # Errors
///
/// Returns [`SimulationError`] if the tunables are invalid or the graph
/// cannot be built for the configured population.
pub fn assemble(config: &SimulationConfig) -> Result<Cast, SimulationError> {
    config.validate()?;
    let tunables = Arc::new(config.agents.clone());
    let population = tunables.population.voters;

    let graph = SmallWorld {
        degree: config.graph.degree,
        rewire_probability: config.graph.rewire_probability,
        seed: derive_seed(config.seed, GRAPH_STREAM),
    }
    .build(population)?;
    let citizens = build_citizens(&tunables, &graph, config.seed)?;

    let rules: Arc<dyn SupportRules> = Arc::new(DefaultRules);
    let voters: Vec<Voter> = citizens
        .into_iter()
        .map(|state| {
            let neighbors = graph.neighbors(state.id).to_vec();
            Voter::new(
                state,
                neighbors,
                Arc::clone(&rules),
                Arc::clone(&tunables),
                config.seed,
            )
        })
        .collect();

    info!(
        seed = config.seed,
        voters = voters.len(),
        edges = graph.edge_count(),
        "cast assembled"
    );

    Ok(Cast {
        voters,
        media: MediaDesk::new(population, Arc::clone(&tunables), config.seed),
        authority: Authority::new(population, Arc::clone(&tunables), config.seed),
        tunables,
    })
}
