//! Shared type definitions for the Hustings election simulation.
//!
//! This crate is the single source of truth for the records and messages
//! every other crate exchanges. It holds no behavior beyond small accessors
//! and the envelope wire codec.
//!
//! # Modules
//!
//! - [`ids`] -- Citizen and run identifiers
//! - [`enums`] -- Parties, news kinds, budget states, phases, media bias
//! - [`structs`] -- Campaign events, ballots, results, digests
//! - [`protocol`] -- Actor addresses and the message envelope

pub mod enums;
pub mod ids;
pub mod protocol;
pub mod structs;

pub use enums::{
    BudgetState, IdeologicalBlock, MediaBias, NewsKind, Party, PartyClass, Phase, UnknownParty,
};
pub use ids::{RunId, VoterId};
pub use protocol::{Address, Envelope, ProtocolError};
pub use structs::{
    BallotChoice, BlockCoverage, CampaignEvent, CandidacyStanding, CandidateProfile,
    CandidateTally, CoverageDigest, ElectedCandidate, ElectionResult, GazetteDigest,
    KeywordCount, NeighborProfile, PartyStanding, PartyTally, SenderReach,
};
