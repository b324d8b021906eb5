//! Affinity and support rules.
//!
//! These are the pure functions the rest of the simulation consults when a
//! citizen weighs another party: how close two parties are, how a message
//! moves support, how likely a citizen is to turn out, and whether a citizen
//! would ever cross from one party to another.
//!
//! # Invariants
//!
//! - Every `f64` a rule returns lies in `[0, 1]`, whatever the inputs,
//!   non-finite inputs included.
//! - Rules are deterministic and side-effect free.

use hustings_types::Party;

/// Affinity between the no-party bucket and any declared party.
pub const NONPARTISAN_AFFINITY: f64 = 0.5;

/// Widest possible ideological distance, used to normalize affinity.
pub const IDEOLOGY_SPAN: f64 = 4.0;

/// Support gained per unit of positive tone, affinity, and credibility.
pub const SUPPORT_GAIN: f64 = 0.1;

/// Support lost per unit of disaffinity on a neutral interaction.
pub const SUPPORT_DECAY: f64 = 0.02;

/// Turnout gained per unit of involvement above [`TURNOUT_PIVOT`].
pub const TURNOUT_INVOLVEMENT_WEIGHT: f64 = 0.5;

/// Involvement at which turnout equals the base rate (before fatigue).
pub const TURNOUT_PIVOT: f64 = 0.4;

/// Turnout lost per unit of fatigue.
pub const TURNOUT_FATIGUE_WEIGHT: f64 = 0.4;

/// The rule table consulted by citizens and the tally.
pub trait SupportRules: Send + Sync {
    /// Compatibility of party `b` as seen from party `a`, in `[0, 1]`.
    fn affinity(&self, a: Party, b: Party) -> f64;

    /// New support after one interaction.
    ///
    /// `tone` is positive for an agreeable interaction, zero for a neutral
    /// one, and negative for a hostile one. `credibility` is the weight of
    /// the other side in `[0, 1]`.
    fn update_support(&self, support: f64, affinity: f64, tone: f64, credibility: f64) -> f64;

    /// Probability of turning out, in `[0, 1]`.
    fn turnout(&self, base: f64, involvement: f64, fatigue: f64) -> f64;

    /// Whether a citizen of party `from` would vote for party `to`.
    fn can_switch(&self, from: Party, to: Party) -> bool;
}

/// The stock rule table.
///
/// - Affinity is 1 within a party, [`NONPARTISAN_AFFINITY`] between the
///   no-party bucket and anyone else, and otherwise falls linearly with
///   ideological distance.
/// - Support saturates toward 1 on positive tone, erodes slowly on neutral
///   contact with a distant party, and drops toward 0 on negative tone.
/// - Switching is allowed across at most one ideology step, or to and
///   from the no-party bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultRules;

impl SupportRules for DefaultRules {
    fn affinity(&self, a: Party, b: Party) -> f64 {
        if a == b {
            return 1.0;
        }
        if a == Party::Spd || b == Party::Spd {
            return NONPARTISAN_AFFINITY;
        }
        let distance = f64::from(a.ideology().abs_diff(b.ideology()));
        clamp_unit(1.0 - distance / IDEOLOGY_SPAN)
    }

    fn update_support(&self, support: f64, affinity: f64, tone: f64, credibility: f64) -> f64 {
        let s0 = clamp_unit(support);
        if !(affinity.is_finite() && tone.is_finite() && credibility.is_finite()) {
            return s0;
        }
        let affinity = clamp_unit(affinity);
        let credibility = clamp_unit(credibility);
        let next = if tone > 0.0 {
            SUPPORT_GAIN.mul_add(affinity * credibility * tone * (1.0 - s0), s0)
        } else if tone < 0.0 {
            SUPPORT_GAIN.mul_add(credibility * tone * s0, s0)
        } else {
            SUPPORT_DECAY.mul_add(-(1.0 - affinity) * s0, s0)
        };
        clamp_unit(next)
    }

    fn turnout(&self, base: f64, involvement: f64, fatigue: f64) -> f64 {
        let p = TURNOUT_FATIGUE_WEIGHT.mul_add(
            -fatigue,
            TURNOUT_INVOLVEMENT_WEIGHT.mul_add(involvement - TURNOUT_PIVOT, base),
        );
        clamp_unit(p)
    }

    fn can_switch(&self, from: Party, to: Party) -> bool {
        from == Party::Spd || to == Party::Spd || from.ideology().abs_diff(to.ideology()) <= 1
    }
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    const RULES: DefaultRules = DefaultRules;

    #[test]
    fn affinity_table() {
        assert!((RULES.affinity(Party::Ped, Party::Ped) - 1.0).abs() < f64::EPSILON);
        assert!((RULES.affinity(Party::Ped, Party::Pee)).abs() < f64::EPSILON);
        assert!((RULES.affinity(Party::Pdd, Party::Pce) - 0.75).abs() < f64::EPSILON);
        assert!((RULES.affinity(Party::Spd, Party::Pee) - 0.5).abs() < f64::EPSILON);
        assert!((RULES.affinity(Party::Pce, Party::Spd) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn affinity_is_symmetric() {
        for a in Party::ALL {
            for b in Party::ALL {
                assert!((RULES.affinity(a, b) - RULES.affinity(b, a)).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn positive_tone_raises_support() {
        let s = RULES.update_support(0.5, 1.0, 1.0, 1.0);
        assert!((s - 0.55).abs() < 1e-12);
    }

    #[test]
    fn neutral_tone_erodes_support_by_disaffinity() {
        let s = RULES.update_support(0.5, 0.5, 0.0, 1.0);
        assert!((s - 0.495).abs() < 1e-12);
        let same = RULES.update_support(0.5, 1.0, 0.0, 1.0);
        assert!((same - 0.5).abs() < 1e-12);
    }

    #[test]
    fn negative_tone_lowers_support() {
        let s = RULES.update_support(0.8, 0.2, -1.0, 1.0);
        assert!(s < 0.8);
    }

    #[test]
    fn non_finite_inputs_leave_support_alone() {
        let s = RULES.update_support(0.3, f64::NAN, 1.0, 1.0);
        assert!((s - 0.3).abs() < f64::EPSILON);
        assert!(RULES.update_support(f64::INFINITY, 1.0, 1.0, 1.0) <= 1.0);
    }

    #[test]
    fn turnout_moves_with_involvement_and_fatigue() {
        let base = RULES.turnout(0.5, 0.4, 0.0);
        assert!((base - 0.5).abs() < 1e-12);
        assert!(RULES.turnout(0.5, 0.9, 0.0) > base);
        assert!(RULES.turnout(0.5, 0.4, 0.5) < base);
        assert!(RULES.turnout(5.0, 1.0, 0.0) <= 1.0);
        assert!(RULES.turnout(-5.0, 0.0, 1.0) >= 0.0);
    }

    #[test]
    fn switching_is_limited_to_neighbors_and_no_party() {
        assert!(RULES.can_switch(Party::Ped, Party::Pdd));
        assert!(!RULES.can_switch(Party::Ped, Party::Pce));
        assert!(RULES.can_switch(Party::Ped, Party::Spd));
        assert!(RULES.can_switch(Party::Spd, Party::Pee));
    }

    #[test]
    fn support_stays_in_bounds_over_random_sequences() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let mut s = rng.random_range(0.0..=1.0);
            for _ in 0..8 {
                let aff = rng.random_range(-0.5..=1.5);
                let tone = rng.random_range(-2.0..=2.0);
                let cred = rng.random_range(-0.5..=1.5);
                s = RULES.update_support(s, aff, tone, cred);
                assert!((0.0..=1.0).contains(&s), "support escaped: {s}");
            }
        }
    }
}
