//! Campaign economics: budget states, audiences, affordability, reward.
//!
//! Money is [`Decimal`] so a budget that started at 1000 and paid for a
//! thousand messages is still exact. Conversions to `f64` happen only when
//! a ratio feeds the learning signal.
//!
//! # Invariants
//!
//! - An action never spends more than the remaining budget. If not even
//!   one target plus the flat penalty is affordable, the action is skipped.
//! - Audiences are distinct and never include the sender.

use rand::seq::index;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use hustings_types::{BudgetState, NewsKind, Party, VoterId};

use crate::config::CampaignConfig;

/// Per-target cost and flat penalty of `kind`.
pub fn price(kind: NewsKind, cfg: &CampaignConfig) -> (Decimal, Decimal) {
    match kind {
        NewsKind::News => (cfg.news_cost, Decimal::ZERO),
        NewsKind::FakeNews => (cfg.fake_cost, cfg.fake_penalty),
    }
}

/// `numerator / denominator` as `f64`, zero when undefined.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> f64 {
    numerator
        .checked_div(denominator)
        .and_then(|r| r.to_f64())
        .unwrap_or(0.0)
}

/// Discretize the remaining budget.
pub fn budget_state(remaining: Decimal, initial: Decimal, cfg: &CampaignConfig) -> BudgetState {
    let r = ratio(remaining, initial);
    if r >= cfg.high_threshold {
        BudgetState::High
    } else if r >= cfg.mid_threshold {
        BudgetState::Mid
    } else {
        BudgetState::Low
    }
}

/// How many of `wanted` targets the budget covers, penalty included.
///
/// Zero when the budget cannot cover one target plus the penalty.
pub fn affordable_targets(budget: Decimal, cost: Decimal, penalty: Decimal, wanted: usize) -> usize {
    let available = budget.saturating_sub(penalty);
    if available <= Decimal::ZERO || cost <= Decimal::ZERO {
        return 0;
    }
    let Some(whole) = available.checked_div(cost).map(|d| d.floor()) else {
        return 0;
    };
    whole
        .to_usize()
        .map_or(wanted, |n| n.min(wanted))
}

/// What sending to `targets` citizens costs.
pub fn outlay(cost: Decimal, penalty: Decimal, targets: usize) -> Decimal {
    cost.saturating_mul(Decimal::from(targets))
        .saturating_add(penalty)
}

/// Base audience size for a population of `eligible` citizens.
pub fn audience_size(eligible: usize, share: f64) -> usize {
    if eligible == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let base = (share.clamp(0.0, 1.0) * eligible as f64).floor() as usize;
    base.clamp(1, eligible)
}

/// Chance a message of `kind` goes viral.
pub fn viral_chance(kind: NewsKind, cfg: &CampaignConfig) -> f64 {
    let factor = match kind {
        NewsKind::News => cfg.viral_news_multiplier,
        NewsKind::FakeNews => cfg.viral_fake_multiplier,
    };
    (cfg.viral_probability * factor).clamp(0.0, 1.0)
}

/// Draw a distinct audience from `eligible`, possibly enlarged by a viral bonus.
pub fn draw_audience(
    eligible: &[VoterId],
    kind: NewsKind,
    cfg: &CampaignConfig,
    rng: &mut impl rand::Rng,
) -> Vec<VoterId> {
    let base = audience_size(eligible.len(), cfg.audience_share);
    if base == 0 {
        return Vec::new();
    }
    let mut size = base;
    if rng.random_bool(viral_chance(kind, cfg)) {
        let extra = usize::try_from(cfg.viral_max_extra).unwrap_or(0);
        size = size.saturating_add(extra).min(eligible.len());
    }
    index::sample(rng, eligible.len(), size)
        .into_iter()
        .filter_map(|i| eligible.get(i).copied())
        .collect()
}

/// Learning signal: coverage minus weighted normalized cost.
pub fn reward(
    sent: usize,
    population: usize,
    spent: Decimal,
    initial_budget: Decimal,
    lambda: f64,
) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let coverage = if population == 0 {
        0.0
    } else {
        sent as f64 / population as f64
    };
    lambda.mul_add(-ratio(spent, initial_budget), coverage)
}

/// Hashtags attached to a message.
pub fn keywords(party: Party, kind: NewsKind) -> Vec<String> {
    let tail: [&str; 3] = match kind {
        NewsKind::News => ["#proposal", "#roadmap", "#policy"],
        NewsKind::FakeNews => ["#bombshell", "#scandal", "#viral"],
    };
    let mut out = vec![
        "#election".to_owned(),
        "#campaign".to_owned(),
        format!("#{}", party.code()),
    ];
    out.extend(tail.iter().map(|s| (*s).to_owned()));
    out
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn budget_state_thresholds() {
        let cfg = CampaignConfig::default();
        assert_eq!(budget_state(dec!(700), dec!(1000), &cfg), BudgetState::High);
        assert_eq!(budget_state(dec!(699.99), dec!(1000), &cfg), BudgetState::Mid);
        assert_eq!(budget_state(dec!(300), dec!(1000), &cfg), BudgetState::Mid);
        assert_eq!(budget_state(dec!(0), dec!(1000), &cfg), BudgetState::Low);
    }

    #[test]
    fn affordability_includes_the_penalty() {
        assert_eq!(affordable_targets(dec!(1000), dec!(10), dec!(0), 400), 100);
        assert_eq!(affordable_targets(dec!(1000), dec!(4), dec!(50), 400), 237);
        assert_eq!(affordable_targets(dec!(1000), dec!(4), dec!(50), 10), 10);
        assert_eq!(affordable_targets(dec!(53), dec!(4), dec!(50), 10), 0);
        assert_eq!(affordable_targets(dec!(9.99), dec!(10), dec!(0), 10), 0);
    }

    #[test]
    fn outlay_never_exceeds_budget_when_affordable() {
        let budget = dec!(1000);
        let n = affordable_targets(budget, dec!(4), dec!(50), 400);
        assert!(outlay(dec!(4), dec!(50), n) <= budget);
        assert!(outlay(dec!(4), dec!(50), n + 1) > budget);
    }

    #[test]
    fn audience_is_forty_percent_at_least_one() {
        assert_eq!(audience_size(999, 0.4), 399);
        assert_eq!(audience_size(1, 0.4), 1);
        assert_eq!(audience_size(0, 0.4), 0);
    }

    #[test]
    fn audience_is_distinct_and_viral_adds_at_most_two() {
        let eligible: Vec<VoterId> = (0..100).map(VoterId::new).collect();
        let mut cfg = CampaignConfig {
            viral_probability: 1.0,
            viral_fake_multiplier: 1.0,
            ..CampaignConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(4);
        let a = draw_audience(&eligible, NewsKind::FakeNews, &cfg, &mut rng);
        assert_eq!(a.len(), 42);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), a.len());

        cfg.viral_probability = 0.0;
        let b = draw_audience(&eligible, NewsKind::News, &cfg, &mut rng);
        assert_eq!(b.len(), 40);
    }

    #[test]
    fn fake_news_spreads_more_readily_than_news() {
        let cfg = CampaignConfig::default();
        let fake = viral_chance(NewsKind::FakeNews, &cfg);
        let news = viral_chance(NewsKind::News, &cfg);
        assert!((fake - 0.225).abs() < 1e-12);
        assert!((news - 0.105).abs() < 1e-12);
        assert!(fake > news);

        let eligible: Vec<VoterId> = (0..100).map(VoterId::new).collect();
        let mut rng = SmallRng::seed_from_u64(21);
        let mut viral = |kind| {
            (0..2000)
                .filter(|_| draw_audience(&eligible, kind, &cfg, &mut rng).len() > 40)
                .count()
        };
        let fake_hits = viral(NewsKind::FakeNews);
        let news_hits = viral(NewsKind::News);
        assert!(fake_hits > news_hits, "fake {fake_hits} vs news {news_hits}");
    }

    #[test]
    fn reward_trades_coverage_for_cost() {
        let r = reward(400, 1000, dec!(500), dec!(1000), 0.5);
        assert!((r - 0.15).abs() < 1e-12);
    }

    #[test]
    fn keywords_carry_party_and_kind() {
        let k = keywords(Party::Pdd, NewsKind::FakeNews);
        assert!(k.contains(&"#PDD".to_owned()));
        assert!(k.contains(&"#scandal".to_owned()));
        assert_eq!(k.len(), 6);
    }
}
