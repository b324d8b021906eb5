//! Error types for the `hustings-world` crate.

use hustings_types::VoterId;

/// Errors that can occur while building the social graph.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The requested lattice degree does not fit the population.
    #[error("degree {degree} is too large for a population of {population}")]
    DegreeTooLarge {
        /// Requested neighbors per citizen.
        degree: u32,
        /// Number of citizens.
        population: u32,
    },

    /// The rewiring probability is outside `[0, 1]`.
    #[error("rewiring probability {probability} is outside [0, 1]")]
    InvalidRewiring {
        /// The rejected probability.
        probability: f64,
    },

    /// An edge references a citizen outside the population.
    #[error("edge endpoint {voter} is outside a population of {population}")]
    UnknownEndpoint {
        /// The offending endpoint.
        voter: VoterId,
        /// Number of citizens.
        population: u32,
    },
}
