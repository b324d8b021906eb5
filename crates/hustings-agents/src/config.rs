//! Tunables for every actor, with the reference run's values as defaults.
//!
//! Each section maps one-to-one onto a key of `hustings-config.yaml` and is
//! passed explicitly to the component that reads it. Nothing in the crate
//! reads ambient global state. [`Tunables`] bundles the sections so a
//! driver can hand a single shared value to all actors.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hustings_types::{MediaBias, Party};

use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// A closed interval sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRange {
    /// Lower bound, inclusive.
    pub min: f64,
    /// Upper bound, inclusive.
    pub max: f64,
}

impl UnitRange {
    /// Build a range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Draw uniformly from the range; a degenerate range returns `min`.
    pub fn sample(&self, rng: &mut impl rand::Rng) -> f64 {
        if self.max > self.min {
            rng.random_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    fn check(&self, field: &'static str) -> Result<(), AgentError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(AgentError::InvalidConfig {
                field,
                reason: format!("range [{}, {}] is empty or not finite", self.min, self.max),
            })
        }
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), AgentError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AgentError::InvalidConfig {
            field,
            reason: format!("{value} is not a probability"),
        })
    }
}

fn check_positive(field: &'static str, value: Decimal) -> Result<(), AgentError> {
    if value > Decimal::ZERO {
        Ok(())
    } else {
        Err(AgentError::InvalidConfig {
            field,
            reason: format!("{value} must be positive"),
        })
    }
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

/// How the citizens are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of citizens (default: 1000).
    pub voters: u32,
    /// Citizens per party. Scaled proportionally when it does not sum to `voters`.
    pub party_counts: BTreeMap<Party, u32>,
    /// Starting support (default: 0.5).
    pub initial_support: f64,
    /// Starting involvement (default: U(0.2, 0.6)).
    pub involvement: UnitRange,
    /// Starting fatigue (default: U(0, 0.2)).
    pub fatigue: UnitRange,
    /// Persuasion capacity (default: U(0, 1)).
    pub persuasion: UnitRange,
    /// Starting engagement (default: U(0, 1)).
    pub engagement: UnitRange,
    /// Trust in media, fixed for life (default: U(0.5, 0.9)).
    pub media_trust: UnitRange,
}

/// The reference party distribution over 1000 citizens.
pub fn default_party_counts() -> BTreeMap<Party, u32> {
    BTreeMap::from([
        (Party::Ped, 241),
        (Party::Pdd, 374),
        (Party::Pce, 10),
        (Party::Pde, 303),
        (Party::Pee, 31),
        (Party::Spd, 41),
    ])
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            voters: 1000,
            party_counts: default_party_counts(),
            initial_support: 0.5,
            involvement: UnitRange::new(0.2, 0.6),
            fatigue: UnitRange::new(0.0, 0.2),
            persuasion: UnitRange::new(0.0, 1.0),
            engagement: UnitRange::new(0.0, 1.0),
            media_trust: UnitRange::new(0.5, 0.9),
        }
    }
}

// ---------------------------------------------------------------------------
// Pre-campaign
// ---------------------------------------------------------------------------

/// Social influence during the pre-campaign phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceConfig {
    /// Neighbors sampled per tick (default: 3).
    pub sample_size: u32,
    /// Fatigue added per interaction (default: 0.02).
    pub fatigue_step: f64,
    /// Involvement added per sampled neighbor (default: 0.01).
    pub involvement_step: f64,
    /// Weight of the neighbor's ideology in the drift step (default: 0.1).
    pub ideology_drift: f64,
    /// Credibility of a completely uninvolved neighbor (default: 0.4).
    pub credibility_floor: f64,
    /// Credibility added per unit of neighbor involvement (default: 0.6).
    pub credibility_weight: f64,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 3,
            fatigue_step: 0.02,
            involvement_step: 0.01,
            ideology_drift: 0.1,
            credibility_floor: 0.4,
            credibility_weight: 0.6,
        }
    }
}

/// Candidate ranking at the selection cut-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Candidates promoted (default: 100).
    pub candidates: u32,
    /// Weight of persuasion capacity (default: 0.60).
    pub persuasion_weight: f64,
    /// Weight of normalized degree (default: 0.25).
    pub degree_weight: f64,
    /// Weight of involvement (default: 0.15).
    pub involvement_weight: f64,
    /// Degree that normalizes to 1 (default: 12).
    pub degree_normalizer: f64,
    /// Personal reputation of a new candidate (default: 0.6).
    pub initial_reputation: f64,
    /// FAKENEWS propensity prior per party.
    pub fake_propensity: BTreeMap<Party, f64>,
}

/// Propensity prior for a party missing from [`SelectionConfig::fake_propensity`].
pub const DEFAULT_FAKE_PROPENSITY: f64 = 0.10;

impl SelectionConfig {
    /// FAKENEWS propensity prior for `party`.
    pub fn propensity_for(&self, party: Party) -> f64 {
        self.fake_propensity
            .get(&party)
            .copied()
            .unwrap_or(DEFAULT_FAKE_PROPENSITY)
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            candidates: 100,
            persuasion_weight: 0.60,
            degree_weight: 0.25,
            involvement_weight: 0.15,
            degree_normalizer: 12.0,
            initial_reputation: 0.6,
            fake_propensity: BTreeMap::from([
                (Party::Ped, 0.25),
                (Party::Pee, 0.25),
                (Party::Pdd, 0.15),
                (Party::Pde, 0.15),
                (Party::Pce, 0.10),
                (Party::Spd, 0.10),
            ]),
        }
    }
}

// ---------------------------------------------------------------------------
// Campaign
// ---------------------------------------------------------------------------

/// How a citizen absorbs campaign messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Impacts remembered per candidate (default: 2).
    pub memory_window: u32,
    /// NEWS impact before trust scaling (default: U(0.05, 0.2)).
    pub news_impact: UnitRange,
    /// FAKENEWS impact (default: U(0.1, 0.3)).
    pub fake_impact: UnitRange,
    /// Trust above which FAKENEWS backfires (default: 0.7).
    pub skeptic_trust: f64,
    /// Multiplier applied to FAKENEWS impact on a skeptic (default: -0.5).
    pub skeptic_factor: f64,
    /// Fatigue added per message received (default: 0.005).
    pub fatigue_step: f64,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            memory_window: 2,
            news_impact: UnitRange::new(0.05, 0.2),
            fake_impact: UnitRange::new(0.1, 0.3),
            skeptic_trust: 0.7,
            skeptic_factor: -0.5,
            fatigue_step: 0.005,
        }
    }
}

fn default_budget() -> Decimal {
    Decimal::from(1000)
}

fn default_news_cost() -> Decimal {
    Decimal::from(10)
}

fn default_fake_cost() -> Decimal {
    Decimal::from(4)
}

fn default_fake_penalty() -> Decimal {
    Decimal::from(50)
}

/// Campaign economics run by the media desk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Budget each candidate starts with (default: 1000).
    pub budget: Decimal,
    /// Cost per NEWS target (default: 10).
    pub news_cost: Decimal,
    /// Cost per FAKENEWS target (default: 4).
    pub fake_cost: Decimal,
    /// Flat surcharge on every FAKENEWS action (default: 50).
    pub fake_penalty: Decimal,
    /// Share of the population in a message's base audience (default: 0.4).
    pub audience_share: f64,
    /// Base chance of a viral bonus (default: 0.15).
    pub viral_probability: f64,
    /// Viral chance multiplier for FAKENEWS (default: 1.5).
    pub viral_fake_multiplier: f64,
    /// Viral chance multiplier for NEWS (default: 0.7).
    pub viral_news_multiplier: f64,
    /// Extra distinct targets a viral bonus adds (default: 2).
    pub viral_max_extra: u32,
    /// Remaining-budget ratio at or above which the state is HIGH (default: 0.7).
    pub high_threshold: f64,
    /// Remaining-budget ratio at or above which the state is MID (default: 0.3).
    pub mid_threshold: f64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            news_cost: default_news_cost(),
            fake_cost: default_fake_cost(),
            fake_penalty: default_fake_penalty(),
            audience_share: 0.4,
            viral_probability: 0.15,
            viral_fake_multiplier: 1.5,
            viral_news_multiplier: 0.7,
            viral_max_extra: 2,
            high_threshold: 0.7,
            mid_threshold: 0.3,
        }
    }
}

/// How the media desk picks NEWS or FAKENEWS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyMode {
    /// Epsilon-greedy over a per-candidate Q-table.
    #[default]
    QLearning,
    /// A fixed mix, normalized so the two weights sum to one.
    ManualRatios {
        /// Relative weight of NEWS.
        news: f64,
        /// Relative weight of FAKENEWS.
        fake: f64,
    },
    /// Each candidate's own FAKENEWS propensity, lowered on every sanction.
    Propensity,
}

/// Campaign policy and its learning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Which policy runs.
    pub mode: PolicyMode,
    /// Exploration rate (default: 0.2).
    pub epsilon: f64,
    /// Learning rate (default: 0.2).
    pub alpha: f64,
    /// Discount factor (default: 0.9).
    pub gamma: f64,
    /// Cost weight in the reward (default: 0.5).
    pub lambda: f64,
    /// Editorial lean of the outlet (default: center).
    pub bias: MediaBias,
    /// Reward boost or cut from the lean (default: 0.15).
    pub bias_strength: f64,
    /// Sanction multiplier on a moderate party's FAKENEWS value (default: 0.5).
    pub moderate_dampening: f64,
    /// Sanction multiplier on an extreme party's FAKENEWS value (default: 0.9).
    pub extreme_dampening: f64,
    /// Sanction multiplier for the no-party bucket (default: 1.0).
    pub nonpartisan_dampening: f64,
    /// Propensity cut per sanction for an extreme party (default: 0.05).
    pub extreme_propensity_drop: f64,
    /// Propensity cut per sanction for everyone else (default: 0.10).
    pub propensity_drop: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mode: PolicyMode::QLearning,
            epsilon: 0.2,
            alpha: 0.2,
            gamma: 0.9,
            lambda: 0.5,
            bias: MediaBias::Center,
            bias_strength: 0.15,
            moderate_dampening: 0.5,
            extreme_dampening: 0.9,
            nonpartisan_dampening: 1.0,
            extreme_propensity_drop: 0.05,
            propensity_drop: 0.10,
        }
    }
}

// ---------------------------------------------------------------------------
// Authority
// ---------------------------------------------------------------------------

fn default_authority_penalty() -> Decimal {
    Decimal::from(100)
}

/// Detection, punishment, and reputation bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Chance a FAKENEWS filing is detected (default: 0.7).
    pub detection_probability: f64,
    /// Flat penalty booked against the budget mirror on detection (default: 100).
    pub penalty: Decimal,
    /// Punishments that eliminate a candidate (default: 3).
    pub elimination_threshold: u32,
    /// Personal reputation lost on detection (default: 0.12).
    pub reputation_drop: f64,
    /// Share of the personal drop the party also loses (default: 0.5).
    pub party_drop_share: f64,
    /// Personal reputation gained per NEWS filing (default: 0.01).
    pub news_gain: f64,
    /// Party reputation gained per NEWS filing (default: 0.005).
    pub party_news_gain: f64,
    /// Reputation of a party with no record (default: 0.5).
    pub default_party_reputation: f64,
    /// Reputation of a candidate with no record (default: 0.6).
    pub default_candidate_reputation: f64,
    /// Keywords listed in a digest (default: 8).
    pub top_keywords: u32,
    /// Senders listed in a digest (default: 5).
    pub top_senders: u32,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            detection_probability: 0.7,
            penalty: default_authority_penalty(),
            elimination_threshold: 3,
            reputation_drop: 0.12,
            party_drop_share: 0.5,
            news_gain: 0.01,
            party_news_gain: 0.005,
            default_party_reputation: 0.5,
            default_candidate_reputation: 0.6,
            top_keywords: 8,
            top_senders: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Election day
// ---------------------------------------------------------------------------

/// Turnout, ballot choice, and seat count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallotConfig {
    /// Base turnout before involvement and fatigue (default: 0.5).
    pub turnout_base: f64,
    /// Chance a citizen who would turn out stays home anyway (default: 0.05).
    pub abstain_base: f64,
    /// Extra stay-home chance when effective engagement is low (default: 0.4).
    pub disengaged_abstain: f64,
    /// Base null-ballot chance (default: 0.05).
    pub null_base: f64,
    /// Null-ballot chance added per unit of fatigue (default: 0.10).
    pub null_fatigue_weight: f64,
    /// Null-ballot chance added when effective engagement is low (default: 0.25).
    pub null_disengaged_bonus: f64,
    /// Ceiling on the null-ballot chance (default: 0.5).
    pub null_cap: f64,
    /// Effective engagement below which a citizen counts as disengaged (default: 0.2).
    pub disengaged_threshold: f64,
    /// Messages received before overload sets in (default: 20).
    pub overload_threshold: u32,
    /// Engagement lost per message past the threshold (default: 0.02).
    pub overload_penalty: f64,
    /// Ceiling on the overload penalty (default: 0.4).
    pub overload_penalty_cap: f64,
    /// Weight of affinity against party reputation (default: 0.7).
    pub affinity_weight: f64,
    /// Weight of remembered campaign buzz (default: 0.5).
    pub memory_weight: f64,
    /// Chance a candidate votes for itself (default: 0.99).
    pub self_vote: f64,
    /// Seats up for allocation (default: 16).
    pub seats: u32,
    /// Zero out parties a citizen would not switch to (default: false).
    pub restrict_switching: bool,
}

impl Default for BallotConfig {
    fn default() -> Self {
        Self {
            turnout_base: 0.5,
            abstain_base: 0.05,
            disengaged_abstain: 0.4,
            null_base: 0.05,
            null_fatigue_weight: 0.10,
            null_disengaged_bonus: 0.25,
            null_cap: 0.5,
            disengaged_threshold: 0.2,
            overload_threshold: 20,
            overload_penalty: 0.02,
            overload_penalty_cap: 0.4,
            affinity_weight: 0.7,
            memory_weight: 0.5,
            self_vote: 0.99,
            seats: 16,
            restrict_switching: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Every actor-facing section in one value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Citizen generation.
    pub population: PopulationConfig,
    /// Pre-campaign social influence.
    pub influence: InfluenceConfig,
    /// Candidate ranking.
    pub selection: SelectionConfig,
    /// Message absorption.
    pub exposure: ExposureConfig,
    /// Campaign economics.
    pub campaign: CampaignConfig,
    /// Campaign policy.
    pub policy: PolicyConfig,
    /// Detection and punishment.
    pub authority: AuthorityConfig,
    /// Election day.
    pub ballot: BallotConfig,
}

impl Tunables {
    /// Reject values that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), AgentError> {
        let p = &self.population;
        p.involvement.check("population.involvement")?;
        p.fatigue.check("population.fatigue")?;
        p.persuasion.check("population.persuasion")?;
        p.engagement.check("population.engagement")?;
        p.media_trust.check("population.media_trust")?;
        check_probability("population.initial_support", p.initial_support)?;

        let x = &self.exposure;
        x.news_impact.check("exposure.news_impact")?;
        x.fake_impact.check("exposure.fake_impact")?;
        if x.memory_window == 0 {
            return Err(AgentError::InvalidConfig {
                field: "exposure.memory_window",
                reason: "must hold at least one impact".to_owned(),
            });
        }

        let c = &self.campaign;
        check_positive("campaign.budget", c.budget)?;
        check_positive("campaign.news_cost", c.news_cost)?;
        check_positive("campaign.fake_cost", c.fake_cost)?;
        if c.fake_penalty < Decimal::ZERO {
            return Err(AgentError::InvalidConfig {
                field: "campaign.fake_penalty",
                reason: "must not be negative".to_owned(),
            });
        }
        check_probability("campaign.audience_share", c.audience_share)?;
        check_probability("campaign.viral_probability", c.viral_probability)?;
        if c.mid_threshold > c.high_threshold {
            return Err(AgentError::InvalidConfig {
                field: "campaign.mid_threshold",
                reason: "must not exceed campaign.high_threshold".to_owned(),
            });
        }

        let pol = &self.policy;
        check_probability("policy.epsilon", pol.epsilon)?;
        check_probability("policy.alpha", pol.alpha)?;
        check_probability("policy.gamma", pol.gamma)?;
        if let PolicyMode::ManualRatios { news, fake } = pol.mode {
            if !(news >= 0.0 && fake >= 0.0 && news + fake > 0.0) {
                return Err(AgentError::InvalidConfig {
                    field: "policy.mode",
                    reason: format!("manual ratios {news}/{fake} must be non-negative and not both zero"),
                });
            }
        }

        let a = &self.authority;
        check_probability("authority.detection_probability", a.detection_probability)?;
        if a.elimination_threshold == 0 {
            return Err(AgentError::InvalidConfig {
                field: "authority.elimination_threshold",
                reason: "must be at least 1".to_owned(),
            });
        }

        let b = &self.ballot;
        check_probability("ballot.self_vote", b.self_vote)?;
        check_probability("ballot.abstain_base", b.abstain_base)?;
        check_probability("ballot.null_cap", b.null_cap)?;
        Ok(())
    }
}
