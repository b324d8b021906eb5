//! Records exchanged between actors and exposed as read models.
//!
//! Everything here is plain data. Collections that end up in reports are
//! `Vec`s of records sorted in a documented order rather than maps, so a
//! report encodes and decodes without depending on map-key support in the
//! wire format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{IdeologicalBlock, NewsKind, Party};
use crate::ids::VoterId;

// ---------------------------------------------------------------------------
// Pre-campaign
// ---------------------------------------------------------------------------

/// What a citizen reveals to a neighbor who asks about it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeighborProfile {
    /// Who answered.
    pub voter: VoterId,
    /// Declared party.
    pub party: Party,
    /// Current ideology, in `[-2, +2]`.
    pub ideology: f64,
    /// Current engagement, in `[0, 1]`.
    pub engagement: f64,
    /// Current involvement, in `[0, 1]`.
    pub involvement: f64,
}

/// A citizen's entry in the candidate ranking at the selection cut-off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidacyStanding {
    /// The citizen.
    pub voter: VoterId,
    /// Declared party.
    pub party: Party,
    /// Persuasion capacity, in `[0, 1]`.
    pub persuasion: f64,
    /// Number of neighbors in the social graph.
    pub degree: u32,
    /// Involvement after the pre-campaign phase.
    pub involvement: f64,
}

/// A citizen promoted to candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Identity, shared with the citizen it was promoted from.
    pub id: VoterId,
    /// Party the candidate runs for.
    pub party: Party,
    /// Initial personal reputation.
    pub reputation: f64,
    /// Initial FAKENEWS propensity prior.
    pub fake_propensity: f64,
}

// ---------------------------------------------------------------------------
// Campaign
// ---------------------------------------------------------------------------

/// One campaign action in the append-only event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignEvent {
    /// Tick the message went out.
    pub tick: u64,
    /// Candidate that paid for it.
    pub sender: VoterId,
    /// The sender's party.
    pub party: Party,
    /// NEWS or FAKENEWS.
    pub kind: NewsKind,
    /// Whether the authority caught it. Always `false` for NEWS.
    pub detected: bool,
    /// Number of citizens the message was delivered to.
    pub reach: u32,
    /// Hashtags attached to the message.
    pub keywords: Vec<String>,
}

/// A citizen's ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BallotChoice {
    /// A vote for a named candidate, which also counts for the candidate's party.
    Candidate {
        /// The party the vote counts for.
        party: Party,
        /// The candidate preferred within that party.
        candidate: VoterId,
    },
    /// A vote for the party list with no candidate preference.
    List {
        /// The party the vote counts for.
        party: Party,
    },
    /// A blank or spoiled ballot.
    Null,
}

impl BallotChoice {
    /// The party this ballot counts for, if any.
    pub const fn party(&self) -> Option<Party> {
        match self {
            Self::Candidate { party, .. } | Self::List { party } => Some(*party),
            Self::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Votes and seats for one party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyTally {
    /// The party.
    pub party: Party,
    /// Valid votes counted for the party.
    pub votes: u32,
    /// Seats awarded by D'Hondt.
    pub seats: u32,
}

/// Preference votes for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
    /// The candidate.
    pub candidate: VoterId,
    /// The candidate's party.
    pub party: Party,
    /// Ballots naming this candidate.
    pub votes: u32,
}

/// A candidate who took one of the party's seats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectedCandidate {
    /// The candidate.
    pub candidate: VoterId,
    /// The candidate's party.
    pub party: Party,
    /// Reputation at the close of the campaign.
    pub reputation: f64,
    /// Total campaign reach.
    pub reach: u64,
    /// Ranking score that won the seat.
    pub influence: f64,
}

/// The outcome of election day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionResult {
    /// Tick the count ran.
    pub tick: u64,
    /// Number of registered citizens.
    pub population: u32,
    /// Ballots that counted for a party.
    pub valid_votes: u32,
    /// Blank or spoiled ballots.
    pub null_votes: u32,
    /// Citizens who did not vote. Derived as population minus ballots received.
    pub abstentions: u32,
    /// Seats up for allocation.
    pub seats_total: u32,
    /// Per-party tallies in [`Party::ALL`] order.
    pub parties: Vec<PartyTally>,
    /// Per-candidate preference votes, sorted by candidate id.
    pub candidates: Vec<CandidateTally>,
    /// Seat holders, grouped by party in [`Party::ALL`] order, best influence first.
    pub elected: Vec<ElectedCandidate>,
    /// Candidates eliminated for repeated violations, sorted by id.
    pub eliminated: Vec<VoterId>,
}

impl ElectionResult {
    /// Valid votes for `party`, zero if absent.
    pub fn votes_for(&self, party: Party) -> u32 {
        self.parties
            .iter()
            .find(|t| t.party == party)
            .map_or(0, |t| t.votes)
    }

    /// Seats won by `party`, zero if absent.
    pub fn seats_for(&self, party: Party) -> u32 {
        self.parties
            .iter()
            .find(|t| t.party == party)
            .map_or(0, |t| t.seats)
    }

    /// Seats awarded across all parties.
    pub fn seats_awarded(&self) -> u32 {
        self.parties.iter().fold(0u32, |acc, t| acc.saturating_add(t.seats))
    }

    /// Ballots cast, valid plus null.
    pub const fn ballots_cast(&self) -> u32 {
        self.valid_votes.saturating_add(self.null_votes)
    }

    /// Share of the population that cast a ballot.
    pub fn turnout(&self) -> f64 {
        if self.population == 0 {
            return 0.0;
        }
        f64::from(self.ballots_cast()) / f64::from(self.population)
    }
}

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

/// How often a keyword appeared in the digest window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    /// The hashtag.
    pub keyword: String,
    /// Occurrences.
    pub count: u32,
}

/// Total reach of one sender in the digest window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderReach {
    /// The candidate.
    pub sender: VoterId,
    /// The candidate's party.
    pub party: Party,
    /// Summed reach.
    pub reach: u64,
}

/// A party's reputation at digest time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartyStanding {
    /// The party.
    pub party: Party,
    /// Reputation in `[0, 1]`.
    pub reputation: f64,
}

/// The authority's periodic summary of the campaign log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteDigest {
    /// Tick the digest was requested.
    pub tick: u64,
    /// First tick of the window, inclusive.
    pub window_start: u64,
    /// Last tick of the window, inclusive.
    pub window_end: u64,
    /// Most frequent keywords, highest count first.
    pub top_keywords: Vec<KeywordCount>,
    /// Senders with the most reach, highest first.
    pub top_senders: Vec<SenderReach>,
    /// Party reputations in [`Party::ALL`] order.
    pub reputations: Vec<PartyStanding>,
    /// NEWS messages in the window.
    pub news: u32,
    /// FAKENEWS messages in the window.
    pub fake_news: u32,
    /// FAKENEWS messages in the window that were detected.
    pub detected: u32,
}

impl GazetteDigest {
    /// Detected share of FAKENEWS in the window, zero when there was none.
    pub fn detection_rate(&self) -> f64 {
        if self.fake_news == 0 {
            return 0.0;
        }
        f64::from(self.detected) / f64::from(self.fake_news)
    }
}

/// Coverage bought for one ideological block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCoverage {
    /// The block.
    pub block: IdeologicalBlock,
    /// Messages sent by candidates of this block.
    pub messages: u32,
    /// Citizens reached by those messages.
    pub reach: u64,
}

/// The media desk's periodic journalistic report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageDigest {
    /// Tick the digest was requested.
    pub tick: u64,
    /// First tick of the window, inclusive.
    pub window_start: u64,
    /// Last tick of the window, inclusive.
    pub window_end: u64,
    /// Coverage per block, left to right.
    pub blocks: Vec<BlockCoverage>,
    /// Block with the most reach, if anything was sent.
    pub leader: Option<IdeologicalBlock>,
    /// NEWS messages in the window.
    pub news: u32,
    /// FAKENEWS messages in the window.
    pub fake_news: u32,
    /// Total money spent in the window.
    pub spent: Decimal,
    /// Candidates still campaigning.
    pub active_candidates: u32,
}
