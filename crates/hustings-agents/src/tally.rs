//! Counting ballots and apportioning seats.
//!
//! # D'Hondt
//!
//! Seats are awarded one at a time to the party with the highest quotient
//! `votes / (seats_so_far + 1)`. Quotients are compared exactly by cross
//! multiplication in `u64`, so no float rounding can create or break a tie.
//! Exact ties go to the party listed first; with [`Party::ALL`] order that
//! is an arbitrary but fixed rule. With no votes at all, no seats are given.
//!
//! # Elected candidates
//!
//! Within each party, candidates still in the race are ranked by
//! `0.6 * reputation + 0.4 * reach / max_reach` (stable over ascending id)
//! and the party's seats go to the best of them.

use std::collections::BTreeMap;

use hustings_types::{BallotChoice, CandidateTally, ElectedCandidate, Party, PartyTally, VoterId};

/// Weight of reputation in the influence score.
pub const REPUTATION_WEIGHT: f64 = 0.6;

/// Weight of normalized reach in the influence score.
pub const REACH_WEIGHT: f64 = 0.4;

/// Allocate `seats` among `votes` by D'Hondt; the result is aligned with the input.
pub fn dhondt<K>(votes: &[(K, u32)], seats: u32) -> Vec<u32> {
    let mut won = vec![0u32; votes.len()];
    for _ in 0..seats {
        let mut best: Option<usize> = None;
        for (i, (_, v)) in votes.iter().enumerate() {
            if *v == 0 {
                continue;
            }
            let s = won.get(i).copied().unwrap_or(0);
            let better = match best {
                None => true,
                Some(j) => {
                    let bv = votes.get(j).map_or(0, |(_, bv)| *bv);
                    let bs = won.get(j).copied().unwrap_or(0);
                    // v / (s + 1) > bv / (bs + 1)
                    u64::from(*v).saturating_mul(u64::from(bs).saturating_add(1))
                        > u64::from(bv).saturating_mul(u64::from(s).saturating_add(1))
                }
            };
            if better {
                best = Some(i);
            }
        }
        let Some(winner) = best else { break };
        if let Some(slot) = won.get_mut(winner) {
            *slot = slot.saturating_add(1);
        }
    }
    won
}

/// Aggregated ballots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Count {
    /// Votes per party.
    pub parties: BTreeMap<Party, u32>,
    /// Preference votes per candidate.
    pub candidates: BTreeMap<VoterId, (Party, u32)>,
    /// Ballots that counted for a party.
    pub valid: u32,
    /// Blank or spoiled ballots.
    pub null: u32,
}

impl Count {
    /// Tally a set of ballots.
    pub fn from_ballots<'a>(ballots: impl IntoIterator<Item = &'a BallotChoice>) -> Self {
        let mut count = Self::default();
        for ballot in ballots {
            match *ballot {
                BallotChoice::Null => count.null = count.null.saturating_add(1),
                BallotChoice::List { party } => count.add_party(party),
                BallotChoice::Candidate { party, candidate } => {
                    count.add_party(party);
                    let entry = count.candidates.entry(candidate).or_insert((party, 0));
                    entry.1 = entry.1.saturating_add(1);
                }
            }
        }
        count
    }

    fn add_party(&mut self, party: Party) {
        let v = self.parties.entry(party).or_insert(0);
        *v = v.saturating_add(1);
        self.valid = self.valid.saturating_add(1);
    }

    /// Ballots received, valid and null.
    pub const fn received(&self) -> u32 {
        self.valid.saturating_add(self.null)
    }

    /// Per-party votes and D'Hondt seats in [`Party::ALL`] order.
    pub fn apportion(&self, seats: u32) -> Vec<PartyTally> {
        let votes: Vec<(Party, u32)> = Party::ALL
            .into_iter()
            .map(|p| (p, self.parties.get(&p).copied().unwrap_or(0)))
            .collect();
        let won = dhondt(&votes, seats);
        votes
            .into_iter()
            .zip(won)
            .map(|((party, votes), seats)| PartyTally { party, votes, seats })
            .collect()
    }

    /// Preference votes sorted by candidate id.
    pub fn candidate_tallies(&self) -> Vec<CandidateTally> {
        self.candidates
            .iter()
            .map(|(&candidate, &(party, votes))| CandidateTally {
                candidate,
                party,
                votes,
            })
            .collect()
    }
}

/// A candidate eligible for a seat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contender {
    /// The candidate.
    pub candidate: VoterId,
    /// The candidate's party.
    pub party: Party,
    /// Reputation at the close of the campaign.
    pub reputation: f64,
    /// Total campaign reach.
    pub reach: u64,
}

/// Fill each party's seats with its most influential contenders.
pub fn rank_elected(contenders: &[Contender], seats: &[PartyTally]) -> Vec<ElectedCandidate> {
    let max_reach = contenders.iter().map(|c| c.reach).max().unwrap_or(0);
    let mut sorted: Vec<&Contender> = contenders.iter().collect();
    sorted.sort_by_key(|c| c.candidate);

    let mut elected = Vec::new();
    for tally in seats {
        let mut pool: Vec<ElectedCandidate> = sorted
            .iter()
            .filter(|c| c.party == tally.party)
            .map(|c| ElectedCandidate {
                candidate: c.candidate,
                party: c.party,
                reputation: c.reputation,
                reach: c.reach,
                influence: influence(c.reputation, c.reach, max_reach),
            })
            .collect();
        pool.sort_by(|a, b| b.influence.total_cmp(&a.influence));
        pool.truncate(usize::try_from(tally.seats).unwrap_or(usize::MAX));
        elected.extend(pool);
    }
    elected
}

/// Influence score used to rank candidates within a party.
pub fn influence(reputation: f64, reach: u64, max_reach: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let normalized = if max_reach == 0 {
        0.0
    } else {
        reach as f64 / max_reach as f64
    };
    REPUTATION_WEIGHT.mul_add(reputation, REACH_WEIGHT * normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dhondt_follows_the_quotient_table() {
        // Quotients, best first:
        //   A 100, B 80, A 50, B 40, A 33.3, C 30, B 26.7 | A 25, B 20, C 15
        // The top seven go A, B, A, B, A, C, B.
        let seats = dhondt(&[("A", 100), ("B", 80), ("C", 30)], 7);
        assert_eq!(seats, vec![3, 3, 1]);
        assert_eq!(seats.iter().sum::<u32>(), 7);
    }

    #[test]
    fn dhondt_is_deterministic() {
        let votes = [("A", 100), ("B", 80), ("C", 30)];
        assert_eq!(dhondt(&votes, 7), dhondt(&votes, 7));
    }

    #[test]
    fn dhondt_exact_ties_go_to_the_first_listed() {
        assert_eq!(dhondt(&[("A", 10), ("B", 10)], 1), vec![1, 0]);
        assert_eq!(dhondt(&[("B", 10), ("A", 10)], 1), vec![1, 0]);
        // B's second quotient (10 / 2) ties A's first (5 / 1): A is listed first.
        assert_eq!(dhondt(&[("A", 5), ("B", 10)], 2), vec![1, 1]);
    }

    #[test]
    fn dhondt_without_votes_awards_nothing() {
        assert_eq!(dhondt(&[("A", 0), ("B", 0)], 5), vec![0, 0]);
        assert!(dhondt::<&str>(&[], 5).is_empty());
    }

    #[test]
    fn dhondt_sums_to_seat_total() {
        let votes = [("a", 241), ("b", 374), ("c", 10), ("d", 303), ("e", 31), ("f", 41)];
        for seats in 0..40 {
            assert_eq!(dhondt(&votes, seats).iter().sum::<u32>(), seats);
        }
    }

    #[test]
    fn count_splits_valid_and_null() {
        let ballots = [
            BallotChoice::Null,
            BallotChoice::List { party: Party::Ped },
            BallotChoice::Candidate { party: Party::Ped, candidate: VoterId::new(4) },
            BallotChoice::Candidate { party: Party::Pdd, candidate: VoterId::new(2) },
        ];
        let c = Count::from_ballots(&ballots);
        assert_eq!((c.valid, c.null, c.received()), (3, 1, 4));
        assert_eq!(c.parties.get(&Party::Ped), Some(&2));
        let tallies = c.candidate_tallies();
        assert_eq!(tallies.first().map(|t| t.candidate), Some(VoterId::new(2)));
        let apportioned = c.apportion(3);
        assert_eq!(apportioned.len(), 6);
        assert_eq!(apportioned.iter().map(|t| t.seats).sum::<u32>(), 3);
    }

    #[test]
    fn elected_are_the_most_influential_per_party() {
        let contenders = [
            Contender { candidate: VoterId::new(1), party: Party::Ped, reputation: 0.6, reach: 100 },
            Contender { candidate: VoterId::new(2), party: Party::Ped, reputation: 0.9, reach: 50 },
            Contender { candidate: VoterId::new(3), party: Party::Pdd, reputation: 0.1, reach: 0 },
        ];
        let seats = [
            PartyTally { party: Party::Ped, votes: 10, seats: 1 },
            PartyTally { party: Party::Pdd, votes: 5, seats: 2 },
        ];
        let elected = rank_elected(&contenders, &seats);
        let ids: Vec<u32> = elected.iter().map(|e| e.candidate.into_inner()).collect();
        // 1: 0.36 + 0.4 = 0.76; 2: 0.54 + 0.2 = 0.74
        assert_eq!(ids, vec![1, 3]);
    }
}
