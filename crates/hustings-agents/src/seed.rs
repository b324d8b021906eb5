//! Seeded randomness.
//!
//! A run has one master seed. Every actor derives its own independent stream
//! from that seed and a stable stream label, so the draws an actor makes do
//! not depend on how its messages interleave with anyone else's. The same
//! seed always yields the same run under the lockstep driver.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hustings_types::{Address, VoterId};

/// Stream label for population construction.
pub const POPULATION_STREAM: u64 = 0xB0_0000_0001;
/// Stream label for the social graph.
pub const GRAPH_STREAM: u64 = 0xB0_0000_0002;
/// Stream label for the media desk.
pub const MEDIA_STREAM: u64 = 0xB0_0000_0003;
/// Stream label for the electoral authority.
pub const AUTHORITY_STREAM: u64 = 0xB0_0000_0004;
/// Stream label for the orchestrator.
pub const ORCHESTRATOR_STREAM: u64 = 0xB0_0000_0005;

/// Stream label of an actor address.
pub fn stream_of(address: Address) -> u64 {
    match address {
        Address::Orchestrator => ORCHESTRATOR_STREAM,
        Address::Media => MEDIA_STREAM,
        Address::Authority => AUTHORITY_STREAM,
        Address::Voter(VoterId(index)) => u64::from(index),
    }
}

/// A fresh RNG for `stream` under `seed`.
///
/// The generator key holds the master seed in its first eight bytes and the
/// stream label in the next eight, so every `(seed, stream)` pair selects a
/// distinct `ChaCha` key.
pub fn stream_rng(seed: u64, stream: u64) -> StdRng {
    let mut key = <StdRng as SeedableRng>::Seed::default();
    for (slot, byte) in key
        .iter_mut()
        .zip(seed.to_le_bytes().into_iter().chain(stream.to_le_bytes()))
    {
        *slot = byte;
    }
    StdRng::from_seed(key)
}

/// A plain `u64` seed for a component that seeds its own generator.
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    stream_rng(seed, stream).random()
}

/// The RNG an actor at `address` owns for the whole run.
pub fn actor_rng(seed: u64, address: Address) -> StdRng {
    stream_rng(seed, stream_of(address))
}
