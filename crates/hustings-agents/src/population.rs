//! Building the citizens.
//!
//! The configured party distribution is scaled to the requested population
//! by largest remainder, shuffled with the population stream, and handed out
//! in id order. Attributes are then drawn citizen by citizen, also in id
//! order, so a seed fixes the whole population.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;

use hustings_types::{Party, VoterId};
use hustings_world::Adjacency;

use crate::config::Tunables;
use crate::error::AgentError;
use crate::memory::CampaignMemory;
use crate::seed::{POPULATION_STREAM, stream_rng};
use crate::voter::VoterState;

/// Scale `counts` to exactly `voters` citizens.
///
/// Each party gets the floor of its proportional share; leftover seats go to
/// the largest remainders, ties to the party listed first.
pub fn apportion(
    counts: &BTreeMap<Party, u32>,
    voters: u32,
) -> Result<Vec<(Party, u32)>, AgentError> {
    let total: u64 = counts.values().map(|&c| u64::from(c)).sum();
    if total == 0 {
        return Err(AgentError::EmptyDistribution { voters });
    }
    let voters_wide = u64::from(voters);

    let mut shares: Vec<(Party, u32, u64)> = Party::ALL
        .into_iter()
        .map(|p| {
            let declared = u64::from(counts.get(&p).copied().unwrap_or(0));
            let scaled = declared.saturating_mul(voters_wide);
            let whole = scaled.checked_div(total).unwrap_or(0);
            let rest = scaled.checked_rem(total).unwrap_or(0);
            (p, u32::try_from(whole).unwrap_or(u32::MAX), rest)
        })
        .collect();

    let assigned: u32 = shares.iter().fold(0u32, |acc, s| acc.saturating_add(s.1));
    let mut leftover = voters.saturating_sub(assigned);
    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = shares.get(a).map_or(0, |s| s.2);
        let rb = shares.get(b).map_or(0, |s| s.2);
        rb.cmp(&ra)
    });
    for i in order {
        if leftover == 0 {
            break;
        }
        if let Some(share) = shares.get_mut(i) {
            share.1 = share.1.saturating_add(1);
            leftover = leftover.saturating_sub(1);
        }
    }
    Ok(shares.into_iter().map(|(p, n, _)| (p, n)).collect())
}

/// Generate every citizen for `graph`.
pub fn build_citizens(
    tunables: &Tunables,
    graph: &Adjacency,
    seed: u64,
) -> Result<Vec<VoterState>, AgentError> {
    let cfg = &tunables.population;
    if graph.len() != usize::try_from(cfg.voters).unwrap_or(usize::MAX) {
        return Err(AgentError::GraphMismatch {
            graph: graph.len(),
            population: cfg.voters,
        });
    }

    let mut parties: Vec<Party> = apportion(&cfg.party_counts, cfg.voters)?
        .into_iter()
        .flat_map(|(p, n)| std::iter::repeat_n(p, usize::try_from(n).unwrap_or(0)))
        .collect();
    let mut rng = stream_rng(seed, POPULATION_STREAM);
    parties.shuffle(&mut rng);

    let citizens = parties
        .into_iter()
        .zip(0..cfg.voters)
        .map(|(party, index)| {
            let id = VoterId::new(index);
            VoterState {
                id,
                party,
                support: cfg.initial_support,
                ideology: f64::from(party.ideology()),
                engagement: cfg.engagement.sample(&mut rng),
                media_trust: cfg.media_trust.sample(&mut rng),
                fatigue: cfg.fatigue.sample(&mut rng),
                involvement: cfg.involvement.sample(&mut rng),
                persuasion: cfg.persuasion.sample(&mut rng),
                msg_count: 0,
                degree: graph.degree(id),
                memory: CampaignMemory::new(tunables.exposure.memory_window),
                is_candidate: false,
                vote: None,
            }
        })
        .collect();
    Ok(citizens)
}
