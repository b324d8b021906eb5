//! The campaign policy: which kind of message a candidate buys.
//!
//! The default policy is one-step tabular Q-learning over three budget
//! states and two actions, one table per candidate. Alternative modes (a
//! fixed mix, or the candidate's own propensity) share the same entry point
//! so the media desk does not care which one runs.
//!
//! # Invariants
//!
//! - Greedy choice between equal values is NEWS.
//! - Tables start at zero when the campaign starts and are never reset.

use hustings_types::{BudgetState, MediaBias, NewsKind, Party, PartyClass};
use hustings_world::rules::clamp_unit;

use crate::config::{PolicyConfig, PolicyMode};

/// Action values for one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QTable {
    values: [[f64; 2]; 3],
}

impl QTable {
    /// All zeros.
    pub const fn new() -> Self {
        Self {
            values: [[0.0; 2]; 3],
        }
    }

    /// Stored value of `action` in `state`.
    pub fn value(&self, state: BudgetState, action: NewsKind) -> f64 {
        self.values
            .get(state.row())
            .and_then(|r| r.get(action.column()))
            .copied()
            .unwrap_or(0.0)
    }

    fn set(&mut self, state: BudgetState, action: NewsKind, value: f64) {
        if let Some(cell) = self
            .values
            .get_mut(state.row())
            .and_then(|r| r.get_mut(action.column()))
        {
            *cell = value;
        }
    }

    /// Best value available in `state`.
    pub fn max_value(&self, state: BudgetState) -> f64 {
        self.value(state, NewsKind::News)
            .max(self.value(state, NewsKind::FakeNews))
    }

    /// Greedy action in `state`, NEWS on ties.
    pub fn greedy(&self, state: BudgetState) -> NewsKind {
        if self.value(state, NewsKind::FakeNews) > self.value(state, NewsKind::News) {
            NewsKind::FakeNews
        } else {
            NewsKind::News
        }
    }

    /// One-step Q-learning update; returns the new value.
    ///
    /// `Q(s,a) += alpha * (reward + gamma * max Q(s',.) - Q(s,a))`
    pub fn update(
        &mut self,
        state: BudgetState,
        action: NewsKind,
        reward: f64,
        next: BudgetState,
        alpha: f64,
        gamma: f64,
    ) -> f64 {
        let current = self.value(state, action);
        let target = gamma.mul_add(self.max_value(next), reward);
        let updated = alpha.mul_add(target - current, current);
        if updated.is_finite() {
            self.set(state, action, updated);
            updated
        } else {
            current
        }
    }

    /// Multiply the stored value of `action` in `state` by `factor`.
    pub fn dampen(&mut self, state: BudgetState, action: NewsKind, factor: f64) {
        let v = self.value(state, action) * factor;
        self.set(state, action, v);
    }
}

/// Pick an action under `mode`.
///
/// `propensity` is the candidate's current FAKENEWS propensity; only the
/// propensity mode reads it.
pub fn choose_action(
    cfg: &PolicyConfig,
    table: &QTable,
    state: BudgetState,
    propensity: f64,
    rng: &mut impl rand::Rng,
) -> NewsKind {
    match cfg.mode {
        PolicyMode::QLearning => {
            if rng.random::<f64>() < cfg.epsilon {
                if rng.random_bool(0.5) {
                    NewsKind::News
                } else {
                    NewsKind::FakeNews
                }
            } else {
                table.greedy(state)
            }
        }
        PolicyMode::ManualRatios { news, fake } => {
            let total = news + fake;
            let p_fake = if total > 0.0 { clamp_unit(fake / total) } else { 0.0 };
            fake_if(rng.random::<f64>() < p_fake)
        }
        PolicyMode::Propensity => fake_if(rng.random::<f64>() < clamp_unit(propensity)),
    }
}

const fn fake_if(fake: bool) -> NewsKind {
    if fake { NewsKind::FakeNews } else { NewsKind::News }
}

/// Reward multiplier from the outlet's editorial lean toward `party`.
pub fn bias_weight(bias: MediaBias, strength: f64, party: Party) -> f64 {
    if strength <= 0.0 {
        return 1.0;
    }
    let alignment = i16::from(bias.sign()) * i16::from(party.ideology());
    match alignment.signum() {
        1 => 1.0 + strength,
        -1 => 1.0 - strength,
        _ => 1.0,
    }
}

/// Multiplier applied to a sanctioned candidate's FAKENEWS value.
pub const fn dampening_factor(cfg: &PolicyConfig, party: Party) -> f64 {
    match party.class() {
        PartyClass::Moderate => cfg.moderate_dampening,
        PartyClass::Extreme => cfg.extreme_dampening,
        PartyClass::Nonpartisan => cfg.nonpartisan_dampening,
    }
}

/// Propensity after a sanction.
pub fn lowered_propensity(cfg: &PolicyConfig, party: Party, propensity: f64) -> f64 {
    let drop = match party.class() {
        PartyClass::Extreme => cfg.extreme_propensity_drop,
        PartyClass::Moderate | PartyClass::Nonpartisan => cfg.propensity_drop,
    };
    clamp_unit(propensity - drop.max(0.0))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn greedy_prefers_news_on_ties() {
        let q = QTable::new();
        assert_eq!(q.greedy(BudgetState::High), NewsKind::News);
    }

    #[test]
    fn bellman_update() {
        let mut q = QTable::new();
        q.set(BudgetState::Mid, NewsKind::News, 1.0);
        let v = q.update(BudgetState::High, NewsKind::FakeNews, 0.5, BudgetState::Mid, 0.2, 0.9);
        assert!((v - 0.28).abs() < 1e-12);
        assert!((q.value(BudgetState::High, NewsKind::FakeNews) - 0.28).abs() < 1e-12);
        assert_eq!(q.greedy(BudgetState::High), NewsKind::FakeNews);
    }

    #[test]
    fn dampening_depends_on_party_class() {
        let cfg = PolicyConfig::default();
        assert!((dampening_factor(&cfg, Party::Pdd) - 0.5).abs() < f64::EPSILON);
        assert!((dampening_factor(&cfg, Party::Pee) - 0.9).abs() < f64::EPSILON);
        assert!((dampening_factor(&cfg, Party::Spd) - 1.0).abs() < f64::EPSILON);
        let mut q = QTable::new();
        q.set(BudgetState::Low, NewsKind::FakeNews, 0.4);
        q.dampen(BudgetState::Low, NewsKind::FakeNews, 0.5);
        assert!((q.value(BudgetState::Low, NewsKind::FakeNews) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn bias_boosts_aligned_and_cuts_opposed() {
        assert!((bias_weight(MediaBias::Right, 0.15, Party::Ped) - 1.15).abs() < 1e-12);
        assert!((bias_weight(MediaBias::Right, 0.15, Party::Pde) - 0.85).abs() < 1e-12);
        assert!((bias_weight(MediaBias::Right, 0.15, Party::Pce) - 1.0).abs() < 1e-12);
        assert!((bias_weight(MediaBias::Center, 0.15, Party::Ped) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn greedy_without_exploration_is_deterministic() {
        let cfg = PolicyConfig {
            epsilon: 0.0,
            ..PolicyConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let q = QTable::new();
        for _ in 0..20 {
            assert_eq!(choose_action(&cfg, &q, BudgetState::High, 1.0, &mut rng), NewsKind::News);
        }
    }

    #[test]
    fn manual_ratios_follow_the_mix() {
        let cfg = PolicyConfig {
            mode: PolicyMode::ManualRatios { news: 0.0, fake: 1.0 },
            ..PolicyConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let q = QTable::new();
        for _ in 0..20 {
            assert_eq!(choose_action(&cfg, &q, BudgetState::High, 0.0, &mut rng), NewsKind::FakeNews);
        }
    }

    #[test]
    fn propensity_drops_less_for_extremes() {
        let cfg = PolicyConfig::default();
        assert!((lowered_propensity(&cfg, Party::Ped, 0.25) - 0.20).abs() < 1e-12);
        assert!((lowered_propensity(&cfg, Party::Pdd, 0.15) - 0.05).abs() < 1e-12);
        assert!(lowered_propensity(&cfg, Party::Pce, 0.05).abs() < f64::EPSILON);
    }
}
