//! Candidate and party reputation held by the electoral authority.
//!
//! # Invariants
//!
//! - Every score stays in `[0, 1]`.
//! - A detected violation costs the party `party_drop_share` of what it
//!   costs the candidate, so parties are more resilient than individuals.
//! - Lookups for a party or candidate with no record return the configured
//!   neutral default instead of failing.

use std::collections::BTreeMap;

use hustings_types::{Party, PartyStanding, VoterId};
use hustings_world::rules::clamp_unit;

use crate::config::AuthorityConfig;

/// Reputation of `party` in a published standings list, or `default` if it is absent.
pub fn reputation_of(standings: &[PartyStanding], party: Party, default: f64) -> f64 {
    standings
        .iter()
        .find(|s| s.party == party)
        .map_or(default, |s| s.reputation)
}

/// Reputation scores for candidates and parties.
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationBook {
    parties: BTreeMap<Party, f64>,
    candidates: BTreeMap<VoterId, f64>,
    default_party: f64,
    default_candidate: f64,
}

impl ReputationBook {
    /// Every party at the neutral default, no candidates.
    pub fn new(cfg: &AuthorityConfig) -> Self {
        let default_party = clamp_unit(cfg.default_party_reputation);
        Self {
            parties: Party::ALL.into_iter().map(|p| (p, default_party)).collect(),
            candidates: BTreeMap::new(),
            default_party,
            default_candidate: clamp_unit(cfg.default_candidate_reputation),
        }
    }

    /// Start tracking `candidate` at `reputation`. An existing record is kept.
    pub fn enroll(&mut self, candidate: VoterId, reputation: f64) {
        self.candidates
            .entry(candidate)
            .or_insert_with(|| clamp_unit(reputation));
    }

    /// Reputation of `party`.
    pub fn party(&self, party: Party) -> f64 {
        self.parties.get(&party).copied().unwrap_or(self.default_party)
    }

    /// Reputation of `candidate`.
    pub fn candidate(&self, candidate: VoterId) -> f64 {
        self.candidates
            .get(&candidate)
            .copied()
            .unwrap_or(self.default_candidate)
    }

    /// Credit a NEWS filing.
    pub fn reward_news(&mut self, candidate: VoterId, party: Party, cfg: &AuthorityConfig) {
        self.shift(candidate, party, cfg.news_gain, cfg.party_news_gain);
    }

    /// Debit a detected FAKENEWS filing.
    pub fn punish(&mut self, candidate: VoterId, party: Party, cfg: &AuthorityConfig) {
        let drop = cfg.reputation_drop.max(0.0);
        self.shift(candidate, party, -drop, -drop * clamp_unit(cfg.party_drop_share));
    }

    /// Party reputations in [`Party::ALL`] order.
    pub fn standings(&self) -> Vec<PartyStanding> {
        Party::ALL
            .into_iter()
            .map(|party| PartyStanding {
                party,
                reputation: self.party(party),
            })
            .collect()
    }

    fn shift(&mut self, candidate: VoterId, party: Party, personal: f64, collective: f64) {
        let c = self.candidate(candidate);
        self.candidates.insert(candidate, clamp_unit(c + personal));
        let p = self.party(party);
        self.parties.insert(party, clamp_unit(p + collective));
    }
}
