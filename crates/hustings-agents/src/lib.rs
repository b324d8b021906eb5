//! Voters, the media desk, and the electoral authority.
//!
//! This crate is the logic layer of the election: everything that operates
//! on actor state without touching I/O. It sits between `hustings-types`
//! (the data and the wire protocol) and `hustings-core` (the drivers that
//! move envelopes between actors).
//!
//! Every actor implements [`Actor`]: it owns its state outright, receives one
//! [`Envelope`](hustings_types::Envelope) at a time, and answers only by
//! putting letters in an [`Outbox`].
//!
//! # Modules
//!
//! - [`authority`] -- Detection, punishment, the ballot box and the count ([`Authority`]).
//! - [`ballot`] -- Election-day turnout, null and party choice ([`VoteOutcome`]).
//! - [`campaign`] -- Campaign economics: prices, budget states, audiences, rewards.
//! - [`candidacy`] -- Candidate scoring and top-N selection.
//! - [`config`] -- Tunables for every actor ([`Tunables`]).
//! - [`digest`] -- Periodic gazette and coverage summaries.
//! - [`error`] -- Construction-time errors ([`AgentError`]).
//! - [`influence`] -- Pre-campaign neighbor influence.
//! - [`mailbox`] -- The [`Actor`] trait and its [`Outbox`].
//! - [`media`] -- The media desk and its campaign accounts ([`MediaDesk`]).
//! - [`memory`] -- Sliding-window memory of campaign impacts.
//! - [`policy`] -- Q-learning and the alternative campaign policies.
//! - [`population`] -- Seeded citizen generation.
//! - [`reputation`] -- Candidate and party reputation.
//! - [`seed`] -- Per-actor RNG streams derived from one master seed.
//! - [`tally`] -- D'Hondt apportionment and seat filling.
//! - [`voter`] -- Citizen state and the [`Voter`] actor.

pub mod authority;
pub mod ballot;
pub mod campaign;
pub mod candidacy;
pub mod config;
pub mod digest;
pub mod error;
pub mod influence;
pub mod mailbox;
pub mod media;
pub mod memory;
pub mod policy;
pub mod population;
pub mod reputation;
pub mod seed;
pub mod tally;
pub mod voter;

pub use authority::{Authority, CandidateRecord, Verdict};
pub use ballot::VoteOutcome;
pub use candidacy::select_candidates;
pub use config::{
    AuthorityConfig, BallotConfig, CampaignConfig, ExposureConfig, InfluenceConfig, PolicyConfig,
    PolicyMode, PopulationConfig, SelectionConfig, Tunables, UnitRange,
};
pub use error::AgentError;
pub use mailbox::{Actor, Letter, Outbox};
pub use media::{CampaignAccount, MediaDesk, RoundOutcome};
pub use memory::CampaignMemory;
pub use population::build_citizens;
pub use reputation::ReputationBook;
pub use voter::{Voter, VoterState};
