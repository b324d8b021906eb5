//! Election clock, configuration, drivers, and reports for Hustings.
//!
//! This crate turns the actors of `hustings-agents` into a run. It owns the
//! tick schedule and the orchestrator, loads `hustings-config.yaml`, and
//! offers two drivers over the same actors: a deterministic lockstep driver
//! for reproducible runs and tests, and a `tokio` runtime with one task per
//! actor.
//!
//! # Modules
//!
//! - [`clock`] -- [`ElectionClock`] and the phase state machine.
//! - [`config`] -- Configuration loading into [`SimulationConfig`].
//! - [`error`] -- [`SimulationError`], including the no-final-tally hard stop.
//! - [`lockstep`] -- The deterministic FIFO driver ([`Lockstep`]).
//! - [`orchestrator`] -- The per-tick plan shared by both drivers.
//! - [`report`] -- [`ElectionReport`] and its JSON codec.
//! - [`runtime`] -- The task-per-actor driver and its [`PostOffice`](runtime::PostOffice).
//! - [`setup`] -- Building the graph, the citizens, and the actors.

pub mod clock;
pub mod config;
pub mod error;
pub mod lockstep;
pub mod orchestrator;
pub mod report;
pub mod runtime;
pub mod setup;

pub use clock::{ClockError, ElectionClock};
pub use config::{ConfigError, SimulationConfig};
pub use error::SimulationError;
pub use lockstep::Lockstep;
pub use orchestrator::{Orchestrator, RunOutcome};
pub use report::{ElectionReport, ReportError};
