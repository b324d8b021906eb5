//! The social graph.
//!
//! Generated once at setup and read-only afterwards. Adjacency lists are
//! kept sorted so that iteration order, and therefore every seeded draw made
//! while walking a neighbor list, is reproducible.
//!
//! # Design
//!
//! [`SmallWorld`] is the classic Watts-Strogatz construction: a ring lattice
//! where each citizen knows `degree / 2` citizens on either side, followed by
//! a pass that rewires each lattice edge with probability `rewire_probability`
//! to a uniformly chosen citizen, never creating self-loops or duplicate edges.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use hustings_types::VoterId;

use crate::error::WorldError;

/// Undirected adjacency over a dense population `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    neighbors: Vec<Vec<VoterId>>,
}

impl Adjacency {
    /// A population of `population` citizens with no edges.
    pub fn empty(population: u32) -> Self {
        Self {
            neighbors: (0..population).map(|_| Vec::new()).collect(),
        }
    }

    /// Build from an undirected edge list, ignoring self-loops and duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEndpoint`] if an edge names a citizen
    /// outside `0..population`.
    pub fn from_edges(
        population: u32,
        edges: impl IntoIterator<Item = (VoterId, VoterId)>,
    ) -> Result<Self, WorldError> {
        let mut sets: Vec<BTreeSet<VoterId>> = (0..population).map(|_| BTreeSet::new()).collect();
        for (a, b) in edges {
            for end in [a, b] {
                if end.into_inner() >= population {
                    return Err(WorldError::UnknownEndpoint {
                        voter: end,
                        population,
                    });
                }
            }
            if a == b {
                continue;
            }
            if let Some(set) = sets.get_mut(a.index()) {
                set.insert(b);
            }
            if let Some(set) = sets.get_mut(b.index()) {
                set.insert(a);
            }
        }
        Ok(Self {
            neighbors: sets.into_iter().map(|s| s.into_iter().collect()).collect(),
        })
    }

    /// Number of citizens.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether the graph has no citizens.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Sorted neighbors of `voter`; empty for an unknown citizen.
    pub fn neighbors(&self, voter: VoterId) -> &[VoterId] {
        self.neighbors.get(voter.index()).map_or(&[], Vec::as_slice)
    }

    /// Number of neighbors of `voter`.
    pub fn degree(&self, voter: VoterId) -> u32 {
        u32::try_from(self.neighbors(voter).len()).unwrap_or(u32::MAX)
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Whether `a` and `b` are neighbors.
    pub fn are_neighbors(&self, a: VoterId, b: VoterId) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }
}

/// Anything that can produce the social graph for a population.
pub trait NetworkProvider {
    /// Build the graph over citizens `0..population`.
    ///
    /// # Errors
    ///
    /// Returns a [`WorldError`] if the generator parameters do not fit the population.
    fn build(&self, population: u32) -> Result<Adjacency, WorldError>;
}

/// Seeded Watts-Strogatz small-world generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmallWorld {
    /// Lattice degree before rewiring. Odd values round down to even.
    pub degree: u32,
    /// Probability of rewiring each lattice edge.
    pub rewire_probability: f64,
    /// Seed for the rewiring draws.
    pub seed: u64,
}

impl NetworkProvider for SmallWorld {
    fn build(&self, population: u32) -> Result<Adjacency, WorldError> {
        if !(0.0..=1.0).contains(&self.rewire_probability) {
            return Err(WorldError::InvalidRewiring {
                probability: self.rewire_probability,
            });
        }
        if population == 0 {
            return Ok(Adjacency::empty(0));
        }
        if self.degree >= population {
            return Err(WorldError::DegreeTooLarge {
                degree: self.degree,
                population,
            });
        }

        let half = self.degree / 2;
        let mut sets: Vec<BTreeSet<u32>> = (0..population).map(|_| BTreeSet::new()).collect();
        for u in 0..population {
            for j in 1..=half {
                let v = offset(u, j, population);
                link(&mut sets, u, v);
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut rewired = 0u32;
        for j in 1..=half {
            for u in 0..population {
                let v = offset(u, j, population);
                if !rng.random_bool(self.rewire_probability) {
                    continue;
                }
                let saturated = sets
                    .get(u as usize)
                    .is_none_or(|s| s.len() >= (population as usize).saturating_sub(1));
                if saturated {
                    continue;
                }
                let mut w = rng.random_range(0..population);
                while w == u || sets.get(u as usize).is_some_and(|s| s.contains(&w)) {
                    w = rng.random_range(0..population);
                }
                unlink(&mut sets, u, v);
                link(&mut sets, u, w);
                rewired = rewired.saturating_add(1);
            }
        }

        let adjacency = Adjacency {
            neighbors: sets
                .into_iter()
                .map(|s| s.into_iter().map(VoterId::new).collect())
                .collect(),
        };
        debug!(
            population,
            degree = self.degree,
            rewired,
            edges = adjacency.edge_count(),
            "small-world graph built"
        );
        Ok(adjacency)
    }
}

/// `(u + j) mod n` without overflow.
fn offset(u: u32, j: u32, n: u32) -> u32 {
    let sum = u64::from(u).saturating_add(u64::from(j));
    u32::try_from(sum.checked_rem(u64::from(n)).unwrap_or(0)).unwrap_or(0)
}

fn link(sets: &mut [BTreeSet<u32>], a: u32, b: u32) {
    if let Some(s) = sets.get_mut(a as usize) {
        s.insert(b);
    }
    if let Some(s) = sets.get_mut(b as usize) {
        s.insert(a);
    }
}

fn unlink(sets: &mut [BTreeSet<u32>], a: u32, b: u32) {
    if let Some(s) = sets.get_mut(a as usize) {
        s.remove(&b);
    }
    if let Some(s) = sets.get_mut(b as usize) {
        s.remove(&a);
    }
}
