//! Election-day decision for a single citizen.
//!
//! The decision runs in stages, each consuming draws from the citizen's own
//! RNG in a fixed order:
//!
//! 1. Turnout: stay home if the draw is not below the turnout probability.
//! 2. Disengagement: a small chance of staying home anyway, larger when
//!    overload has pushed effective engagement under the threshold.
//! 3. Candidates who came to the polls vote for themselves with high
//!    probability and spoil their ballot otherwise.
//! 4. Null ballot: more likely with fatigue and disengagement, capped.
//! 5. Party: weighted sampling over non-negative party scores; the citizen's
//!    own party when every score is zero.
//! 6. Candidate: the party candidate with the strongest remembered buzz, or
//!    a plain list vote.

use hustings_types::{BallotChoice, Party, PartyStanding};
use hustings_world::SupportRules;
use hustings_world::rules::clamp_unit;

use crate::config::BallotConfig;
use crate::reputation::reputation_of;
use crate::voter::VoterState;

/// What a citizen did at the polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Stayed home. Nothing reaches the authority.
    Abstained,
    /// Handed in a ballot.
    Cast(BallotChoice),
}

impl VoteOutcome {
    /// The ballot, if one was cast.
    pub const fn ballot(self) -> Option<BallotChoice> {
        match self {
            Self::Abstained => None,
            Self::Cast(choice) => Some(choice),
        }
    }
}

/// Engagement after the message-overload penalty.
pub fn effective_engagement(state: &VoterState, cfg: &BallotConfig) -> f64 {
    let over = state.msg_count.saturating_sub(cfg.overload_threshold);
    let penalty = (cfg.overload_penalty * f64::from(over)).min(cfg.overload_penalty_cap);
    clamp_unit(state.engagement - penalty.max(0.0))
}

/// Chance of a null ballot given effective engagement `engagement`.
pub fn null_probability(state: &VoterState, engagement: f64, cfg: &BallotConfig) -> f64 {
    let mut p = cfg.null_fatigue_weight.mul_add(state.fatigue, cfg.null_base);
    if engagement < cfg.disengaged_threshold {
        p += cfg.null_disengaged_bonus;
    }
    clamp_unit(p.min(cfg.null_cap))
}

/// Score of every party from the citizen's point of view, in [`Party::ALL`] order.
pub fn party_scores(
    state: &VoterState,
    reputations: &[PartyStanding],
    default_reputation: f64,
    rules: &dyn SupportRules,
    cfg: &BallotConfig,
) -> [(Party, f64); 6] {
    Party::ALL.map(|party| {
        if cfg.restrict_switching && !rules.can_switch(state.party, party) {
            return (party, 0.0);
        }
        let affinity = rules.affinity(state.party, party);
        let reputation = reputation_of(reputations, party, default_reputation);
        let buzz = state.memory.party_buzz(party).unwrap_or(0.0);
        let score = cfg.memory_weight.mul_add(
            buzz,
            cfg.affinity_weight
                .mul_add(affinity, (1.0 - cfg.affinity_weight) * reputation),
        );
        (party, if score.is_finite() { score.max(0.0) } else { 0.0 })
    })
}

/// Sample a party proportionally to its score, or `fallback` when all are zero.
pub fn weighted_pick(scores: &[(Party, f64)], fallback: Party, rng: &mut impl rand::Rng) -> Party {
    let total: f64 = scores.iter().map(|(_, s)| s).sum();
    if total <= 0.0 || !total.is_finite() {
        return fallback;
    }
    let r = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = fallback;
    for &(party, score) in scores {
        if score <= 0.0 {
            continue;
        }
        cumulative += score;
        last_positive = party;
        if r < cumulative {
            return party;
        }
    }
    last_positive
}

/// Run the full decision for one citizen.
pub fn decide(
    state: &VoterState,
    reputations: &[PartyStanding],
    default_reputation: f64,
    rules: &dyn SupportRules,
    cfg: &BallotConfig,
    rng: &mut impl rand::Rng,
) -> VoteOutcome {
    let turnout = rules.turnout(cfg.turnout_base, state.involvement, state.fatigue);
    if rng.random::<f64>() >= turnout {
        return VoteOutcome::Abstained;
    }

    let engagement = effective_engagement(state, cfg);
    let mut stay_home = cfg.abstain_base;
    if engagement < cfg.disengaged_threshold {
        stay_home += cfg.disengaged_abstain;
    }
    if rng.random::<f64>() < clamp_unit(stay_home) {
        return VoteOutcome::Abstained;
    }

    if state.is_candidate {
        return if rng.random::<f64>() < cfg.self_vote {
            VoteOutcome::Cast(BallotChoice::Candidate {
                party: state.party,
                candidate: state.id,
            })
        } else {
            VoteOutcome::Cast(BallotChoice::Null)
        };
    }

    if rng.random::<f64>() < null_probability(state, engagement, cfg) {
        return VoteOutcome::Cast(BallotChoice::Null);
    }

    let scores = party_scores(state, reputations, default_reputation, rules, cfg);
    let party = weighted_pick(&scores, state.party, rng);
    let choice = state.memory.strongest(party).map_or(
        BallotChoice::List { party },
        |candidate| BallotChoice::Candidate { party, candidate },
    );
    VoteOutcome::Cast(choice)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use hustings_types::VoterId;
    use hustings_world::DefaultRules;

    use super::*;

    #[test]
    fn overload_penalty_is_capped() {
        let cfg = BallotConfig::default();
        let mut s = VoterState::sample(Party::Pdd);
        s.engagement = 0.9;
        s.msg_count = 25;
        assert!((effective_engagement(&s, &cfg) - 0.8).abs() < 1e-12);
        s.msg_count = 500;
        assert!((effective_engagement(&s, &cfg) - 0.5).abs() < 1e-12);
        s.msg_count = 3;
        assert!((effective_engagement(&s, &cfg) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn null_probability_grows_when_disengaged() {
        let cfg = BallotConfig::default();
        let s = VoterState::sample(Party::Pdd);
        let engaged = null_probability(&s, 0.9, &cfg);
        let disengaged = null_probability(&s, 0.1, &cfg);
        assert!((disengaged - engaged - 0.25).abs() < 1e-12);
        let mut tired = VoterState::sample(Party::Pdd);
        tired.fatigue = 1.0;
        assert!(null_probability(&tired, 0.0, &cfg) <= cfg.null_cap);
    }

    #[test]
    fn weighted_pick_defaults_to_own_party_when_all_zero() {
        let mut rng = SmallRng::seed_from_u64(3);
        let scores = Party::ALL.map(|p| (p, 0.0));
        assert_eq!(weighted_pick(&scores, Party::Pde, &mut rng), Party::Pde);
    }

    #[test]
    fn weighted_pick_only_returns_positive_parties() {
        let mut rng = SmallRng::seed_from_u64(3);
        let scores = Party::ALL.map(|p| (p, if p == Party::Pce { 2.0 } else { 0.0 }));
        for _ in 0..100 {
            assert_eq!(weighted_pick(&scores, Party::Ped, &mut rng), Party::Pce);
        }
    }

    #[test]
    fn own_party_scores_highest_without_reputation_gap() {
        let s = VoterState::sample(Party::Ped);
        let scores = party_scores(&s, &[], 0.5, &DefaultRules, &BallotConfig::default());
        let (best, _) = scores
            .iter()
            .copied()
            .fold((Party::Spd, f64::MIN), |acc, x| if x.1 > acc.1 { x } else { acc });
        assert_eq!(best, Party::Ped);
    }

    #[test]
    fn restricted_switching_zeroes_distant_parties() {
        let cfg = BallotConfig {
            restrict_switching: true,
            ..BallotConfig::default()
        };
        let s = VoterState::sample(Party::Ped);
        let scores = party_scores(&s, &[], 0.5, &DefaultRules, &cfg);
        for (party, score) in scores {
            if matches!(party, Party::Pce | Party::Pde | Party::Pee) {
                assert!(score.abs() < f64::EPSILON);
            } else {
                assert!(score > 0.0);
            }
        }
    }

    #[test]
    fn candidates_vote_for_themselves() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut s = VoterState::sample(Party::Pee);
        s.is_candidate = true;
        s.engagement = 1.0;
        let cfg = BallotConfig {
            turnout_base: 10.0,
            abstain_base: 0.0,
            self_vote: 1.0,
            ..BallotConfig::default()
        };
        let out = decide(&s, &[], 0.5, &DefaultRules, &cfg, &mut rng);
        assert_eq!(
            out,
            VoteOutcome::Cast(BallotChoice::Candidate {
                party: Party::Pee,
                candidate: s.id
            })
        );
    }

    #[test]
    fn candidates_can_stay_home() {
        let mut rng = SmallRng::seed_from_u64(13);
        let mut s = VoterState::sample(Party::Pdd);
        s.is_candidate = true;
        let cfg = BallotConfig {
            turnout_base: -10.0,
            self_vote: 1.0,
            ..BallotConfig::default()
        };
        let cast = (0..100)
            .filter(|_| decide(&s, &[], 0.5, &DefaultRules, &cfg, &mut rng) != VoteOutcome::Abstained)
            .count();
        assert_eq!(cast, 0);
    }

    #[test]
    fn candidates_who_show_up_never_vote_for_a_rival() {
        let mut rng = SmallRng::seed_from_u64(17);
        let mut s = VoterState::sample(Party::Ped);
        s.is_candidate = true;
        s.memory.record(VoterId::new(900), Party::Ped, 0.5);
        let cfg = BallotConfig::default();
        for _ in 0..500 {
            let out = decide(&s, &[], 0.5, &DefaultRules, &cfg, &mut rng);
            let own = match out {
                VoteOutcome::Abstained | VoteOutcome::Cast(BallotChoice::Null) => true,
                VoteOutcome::Cast(BallotChoice::Candidate { candidate, .. }) => candidate == s.id,
                VoteOutcome::Cast(BallotChoice::List { .. }) => false,
            };
            assert!(own, "unexpected ballot {out:?}");
        }
    }

    #[test]
    fn zero_turnout_always_abstains() {
        let mut rng = SmallRng::seed_from_u64(5);
        let cfg = BallotConfig {
            turnout_base: -10.0,
            ..BallotConfig::default()
        };
        let s = VoterState::sample(Party::Pdd);
        for _ in 0..50 {
            assert_eq!(
                decide(&s, &[], 0.5, &DefaultRules, &cfg, &mut rng),
                VoteOutcome::Abstained
            );
        }
    }

    #[test]
    fn remembered_candidate_gets_the_preference_vote() {
        let mut rng = SmallRng::seed_from_u64(5);
        let cfg = BallotConfig {
            turnout_base: 10.0,
            abstain_base: 0.0,
            null_base: 0.0,
            null_fatigue_weight: 0.0,
            ..BallotConfig::default()
        };
        let mut s = VoterState::sample(Party::Spd);
        s.engagement = 1.0;
        s.memory.record(VoterId::new(77), Party::Spd, 0.3);
        let mut saw_candidate = false;
        for _ in 0..200 {
            if let VoteOutcome::Cast(BallotChoice::Candidate { candidate, party }) =
                decide(&s, &[], 0.5, &DefaultRules, &cfg, &mut rng)
            {
                assert_eq!(party, Party::Spd);
                assert_eq!(candidate, VoterId::new(77));
                saw_candidate = true;
            }
        }
        assert!(saw_candidate);
    }
}
