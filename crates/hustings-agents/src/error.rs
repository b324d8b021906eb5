//! Error types for the hustings-agents crate.
//!
//! Per-message problems never surface here: an actor that receives something
//! it cannot use drops it. These errors cover construction time only, when a
//! bad configuration or population would make the whole run meaningless.

use hustings_world::WorldError;

/// Errors that can occur while setting up agents.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A tunable is outside its valid range.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The party distribution has no citizens to scale from.
    #[error("party distribution is empty but {voters} voters were requested")]
    EmptyDistribution {
        /// Requested population size.
        voters: u32,
    },

    /// The social graph does not match the population.
    #[error("graph covers {graph} citizens but the population has {population}")]
    GraphMismatch {
        /// Citizens in the graph.
        graph: usize,
        /// Citizens in the population.
        population: u32,
    },

    /// The social graph could not be built.
    #[error("world error: {source}")]
    World {
        /// Underlying graph error.
        #[from]
        source: WorldError,
    },
}
