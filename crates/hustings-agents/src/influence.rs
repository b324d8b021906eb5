//! Pre-campaign social influence.
//!
//! Each pre-campaign tick a citizen samples a few neighbors, asks each for
//! its current profile, and folds every answer into its own support and
//! ideology. This is the only phase where opinion moves on social proximity
//! alone, before any media exists.
//!
//! # Invariants
//!
//! - Support stays in `[0, 1]`, ideology in `[-2, +2]`.
//! - Fatigue and involvement only go up, and never past 1.

use rand::seq::IndexedRandom;

use hustings_types::{NeighborProfile, VoterId};
use hustings_world::SupportRules;
use hustings_world::rules::clamp_unit;

use crate::config::InfluenceConfig;
use crate::voter::VoterState;

/// Bounds on a citizen's ideology.
pub const IDEOLOGY_BOUND: f64 = 2.0;

/// Pick up to `sample_size` distinct neighbors, all of them if there are fewer.
///
/// The result is sorted so downstream message order does not depend on the
/// sampler's internal order.
pub fn sample_neighbors(
    neighbors: &[VoterId],
    sample_size: u32,
    rng: &mut impl rand::Rng,
) -> Vec<VoterId> {
    let k = usize::try_from(sample_size).unwrap_or(usize::MAX);
    let mut picked: Vec<VoterId> = if neighbors.len() <= k {
        neighbors.to_vec()
    } else {
        neighbors.choose_multiple(rng, k).copied().collect()
    };
    picked.sort_unstable();
    picked
}

/// Involvement boost for a round in which `sampled` neighbors were contacted.
pub fn begin_round(state: &mut VoterState, sampled: usize, cfg: &InfluenceConfig) {
    #[allow(clippy::cast_precision_loss)]
    let boost = cfg.involvement_step * sampled as f64;
    state.involvement = clamp_unit(state.involvement + boost.max(0.0));
}

/// Credibility of a neighbor as a source.
pub fn credibility(neighbor: &NeighborProfile, cfg: &InfluenceConfig) -> f64 {
    clamp_unit(cfg.credibility_weight.mul_add(neighbor.involvement, cfg.credibility_floor))
}

/// Apply one interaction with `neighbor` to `state`.
pub fn interact(
    state: &mut VoterState,
    neighbor: &NeighborProfile,
    rules: &dyn SupportRules,
    cfg: &InfluenceConfig,
) {
    let affinity = rules.affinity(state.party, neighbor.party);
    let tone = if state.party == neighbor.party { 1.0 } else { 0.0 };
    let cred = credibility(neighbor, cfg);
    state.support = rules.update_support(state.support, affinity, tone, cred);

    let pull = neighbor.ideology * neighbor.engagement;
    let drifted = (1.0 - cfg.ideology_drift).mul_add(state.ideology, cfg.ideology_drift * pull);
    if drifted.is_finite() {
        state.ideology = drifted.clamp(-IDEOLOGY_BOUND, IDEOLOGY_BOUND);
    }

    state.fatigue = clamp_unit(state.fatigue + cfg.fatigue_step.max(0.0));
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use hustings_types::Party;
    use hustings_world::DefaultRules;

    use super::*;

    fn profile(party: Party, ideology: f64) -> NeighborProfile {
        NeighborProfile {
            voter: VoterId::new(9),
            party,
            ideology,
            engagement: 1.0,
            involvement: 0.5,
        }
    }

    #[test]
    fn samples_all_when_few_neighbors() {
        let mut rng = SmallRng::seed_from_u64(1);
        let n = [VoterId::new(4), VoterId::new(2)];
        assert_eq!(sample_neighbors(&n, 3, &mut rng), vec![VoterId::new(2), VoterId::new(4)]);
    }

    #[test]
    fn samples_distinct_subset() {
        let mut rng = SmallRng::seed_from_u64(1);
        let n: Vec<VoterId> = (0..6).map(VoterId::new).collect();
        let picked = sample_neighbors(&n, 3, &mut rng);
        assert_eq!(picked.len(), 3);
        assert!(picked.windows(2).all(|w| w.first() < w.last()));
    }

    #[test]
    fn same_party_contact_raises_support() {
        let mut s = VoterState::sample(Party::Pdd);
        let before = s.support;
        interact(&mut s, &profile(Party::Pdd, 1.0), &DefaultRules, &InfluenceConfig::default());
        assert!(s.support > before);
        assert!((s.fatigue - 0.02).abs() < 1e-12);
    }

    #[test]
    fn ideology_drifts_toward_engaged_neighbor_and_stays_bounded() {
        let mut s = VoterState::sample(Party::Ped);
        for _ in 0..200 {
            interact(&mut s, &profile(Party::Pee, -2.0), &DefaultRules, &InfluenceConfig::default());
            assert!((-IDEOLOGY_BOUND..=IDEOLOGY_BOUND).contains(&s.ideology));
            assert!((0.0..=1.0).contains(&s.support));
        }
        assert!(s.ideology < 0.0);
        assert!((s.fatigue - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn involvement_grows_with_sample_count() {
        let mut s = VoterState::sample(Party::Pce);
        let before = s.involvement;
        begin_round(&mut s, 3, &InfluenceConfig::default());
        assert!((s.involvement - before - 0.03).abs() < 1e-12);
    }

    #[test]
    fn credibility_spans_floor_to_one() {
        let cfg = InfluenceConfig::default();
        let mut p = profile(Party::Pce, 0.0);
        p.involvement = 0.0;
        assert!((credibility(&p, &cfg) - 0.4).abs() < 1e-12);
        p.involvement = 1.0;
        assert!((credibility(&p, &cfg) - 1.0).abs() < 1e-12);
    }
}
