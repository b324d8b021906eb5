//! Error types for the hustings-core crate.
//!
//! Per-message problems are never errors: actors drop what they cannot use
//! and the drivers drop what they cannot decode. [`SimulationError`] covers
//! setup failures and the one hard stop, reaching election day without a
//! final tally.

use hustings_agents::AgentError;
use hustings_world::WorldError;

use crate::clock::ClockError;
use crate::config::ConfigError;

/// Errors that can end a run.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The run ended without a final tally.
    #[error("no final tally produced by election day (tick {election_tick})")]
    NoFinalTally {
        /// The terminal tick.
        election_tick: u64,
    },

    /// Configuration was rejected.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The clock refused to move.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// Citizens or actors could not be built.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// The social graph could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// An actor task panicked or was cancelled.
    #[error("actor task failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}
