//! Enumeration types for the Hustings simulation.
//!
//! The party list is closed and ordered. Every place that needs a
//! deterministic tie-break (D'Hondt quotients, weighted ballot sampling,
//! digest ordering) walks [`Party::ALL`] front to back, so the declaration
//! order below is part of the observable behavior.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

/// A party on the ballot, with a fixed ideology score in `[-2, +2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Party {
    /// Far right, ideology +2.
    Ped,
    /// Right, ideology +1.
    Pdd,
    /// Center, ideology 0.
    Pce,
    /// Left, ideology -1.
    Pde,
    /// Far left, ideology -2.
    Pee,
    /// No declared party, ideology 0.
    Spd,
}

impl Party {
    /// Every party in tie-break order.
    pub const ALL: [Self; 6] = [Self::Ped, Self::Pdd, Self::Pce, Self::Pde, Self::Pee, Self::Spd];

    /// Ideology position in `[-2, +2]`.
    pub const fn ideology(self) -> i8 {
        match self {
            Self::Ped => 2,
            Self::Pdd => 1,
            Self::Pce | Self::Spd => 0,
            Self::Pde => -1,
            Self::Pee => -2,
        }
    }

    /// Short ballot code, e.g. `"PDD"`.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Ped => "PED",
            Self::Pdd => "PDD",
            Self::Pce => "PCE",
            Self::Pde => "PDE",
            Self::Pee => "PEE",
            Self::Spd => "SPD",
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ped => "Far Right",
            Self::Pdd => "Right",
            Self::Pce => "Center",
            Self::Pde => "Left",
            Self::Pee => "Far Left",
            Self::Spd => "No Party",
        }
    }

    /// How reputational damage lands on the party's campaign policy.
    pub const fn class(self) -> PartyClass {
        match self {
            Self::Ped | Self::Pee => PartyClass::Extreme,
            Self::Pdd | Self::Pce | Self::Pde => PartyClass::Moderate,
            Self::Spd => PartyClass::Nonpartisan,
        }
    }

    /// The left/center/right block the party's ideology falls in.
    pub const fn block(self) -> IdeologicalBlock {
        IdeologicalBlock::of(self.ideology())
    }

    /// Position of this party in [`Party::ALL`].
    pub const fn ordinal(self) -> usize {
        match self {
            Self::Ped => 0,
            Self::Pdd => 1,
            Self::Pce => 2,
            Self::Pde => 3,
            Self::Pee => 4,
            Self::Spd => 5,
        }
    }
}

impl core::fmt::Display for Party {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl core::str::FromStr for Party {
    type Err = UnknownParty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownParty(s.to_owned()))
    }
}

/// A party code that is not on the ballot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown party code: {0}")]
pub struct UnknownParty(pub String);

/// Elasticity class of a party when one of its candidates is sanctioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyClass {
    /// Center-leaning parties, whose voters punish disinformation harder.
    Moderate,
    /// Parties at the ideological extremes.
    Extreme,
    /// The no-party bucket.
    Nonpartisan,
}

/// Left, center, or right grouping of ideology scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeologicalBlock {
    /// Negative ideology.
    Left,
    /// Zero ideology.
    Center,
    /// Positive ideology.
    Right,
}

impl IdeologicalBlock {
    /// All blocks, left to right.
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    /// Classify an integer ideology score.
    pub const fn of(ideology: i8) -> Self {
        if ideology < 0 {
            Self::Left
        } else if ideology > 0 {
            Self::Right
        } else {
            Self::Center
        }
    }

    /// Sign of the block: `-1`, `0`, or `+1`.
    pub const fn sign(self) -> i8 {
        match self {
            Self::Left => -1,
            Self::Center => 0,
            Self::Right => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Campaign
// ---------------------------------------------------------------------------

/// The two kinds of campaign message a candidate can buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NewsKind {
    /// Legitimate campaign content.
    News,
    /// Disinformation. Cheaper per target, carries a flat penalty, and may be detected.
    FakeNews,
}

impl NewsKind {
    /// Both actions, in Q-table column order.
    pub const ALL: [Self; 2] = [Self::News, Self::FakeNews];

    /// Column of this action in a Q-table row.
    pub const fn column(self) -> usize {
        match self {
            Self::News => 0,
            Self::FakeNews => 1,
        }
    }
}

impl core::fmt::Display for NewsKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::News => "NEWS",
            Self::FakeNews => "FAKENEWS",
        })
    }
}

/// Discretized remaining-budget state used by the campaign policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetState {
    /// At least 70% of the initial budget remains.
    High,
    /// At least 30% remains.
    Mid,
    /// Less than 30% remains.
    Low,
}

impl BudgetState {
    /// All states, in Q-table row order.
    pub const ALL: [Self; 3] = [Self::High, Self::Mid, Self::Low];

    /// Row of this state in a Q-table.
    pub const fn row(self) -> usize {
        match self {
            Self::High => 0,
            Self::Mid => 1,
            Self::Low => 2,
        }
    }
}

/// Direction of the media outlet's editorial lean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaBias {
    /// Favors parties with negative ideology.
    Left,
    /// No lean. Every party gets weight 1.
    #[default]
    Center,
    /// Favors parties with positive ideology.
    Right,
}

impl MediaBias {
    /// Sign of the lean: `-1`, `0`, or `+1`.
    pub const fn sign(self) -> i8 {
        match self {
            Self::Left => -1,
            Self::Center => 0,
            Self::Right => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Phase of the election cycle. Phases only ever advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Social influence only; no candidates yet.
    PreCampaign,
    /// The cut-off tick at which candidates are chosen.
    CandidateSelection,
    /// Candidates buy NEWS/FAKENEWS each tick.
    Campaign,
    /// Terminal tick: ballots are cast and counted.
    ElectionDay,
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::PreCampaign => "pre_campaign",
            Self::CandidateSelection => "candidate_selection",
            Self::Campaign => "campaign",
            Self::ElectionDay => "election_day",
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn party_ordinals_match_declaration_order() {
        for (i, party) in Party::ALL.into_iter().enumerate() {
            assert_eq!(party.ordinal(), i);
        }
    }

    #[test]
    fn party_parses_from_code_case_insensitively() {
        assert_eq!("pdd".parse::<Party>().unwrap(), Party::Pdd);
        assert_eq!("SPD".parse::<Party>().unwrap(), Party::Spd);
        assert!("XYZ".parse::<Party>().is_err());
    }

    #[test]
    fn party_classes() {
        assert_eq!(Party::Ped.class(), PartyClass::Extreme);
        assert_eq!(Party::Pce.class(), PartyClass::Moderate);
        assert_eq!(Party::Spd.class(), PartyClass::Nonpartisan);
    }

    #[test]
    fn blocks_follow_ideology_sign() {
        assert_eq!(Party::Pee.block(), IdeologicalBlock::Left);
        assert_eq!(Party::Spd.block(), IdeologicalBlock::Center);
        assert_eq!(Party::Pdd.block(), IdeologicalBlock::Right);
    }

    #[test]
    fn party_serializes_as_upper_code() {
        assert_eq!(serde_json::to_string(&Party::Pde).unwrap(), "\"PDE\"");
        assert_eq!(serde_json::to_string(&NewsKind::FakeNews).unwrap(), "\"FAKENEWS\"");
    }

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::PreCampaign < Phase::CandidateSelection);
        assert!(Phase::Campaign < Phase::ElectionDay);
    }
}
