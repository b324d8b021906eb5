//! The world the citizens live in: who they know, and how parties relate.
//!
//! Both pieces are boundary collaborators of the simulation. They are pure
//! (or, for the graph, seeded and built once) and hidden behind traits so a
//! different rule table or graph generator can be plugged in without touching
//! the agents.
//!
//! # Modules
//!
//! - [`error`] -- Error types for graph construction.
//! - [`network`] -- [`NetworkProvider`] and the seeded Watts-Strogatz
//!   [`SmallWorld`] generator producing a read-only [`Adjacency`].
//! - [`rules`] -- [`SupportRules`]: affinity, support update, turnout, and
//!   party-switching rules, with [`DefaultRules`] as the stock table.

pub mod error;
pub mod network;
pub mod rules;

pub use error::WorldError;
pub use network::{Adjacency, NetworkProvider, SmallWorld};
pub use rules::{DefaultRules, SupportRules};
