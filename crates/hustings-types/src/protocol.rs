//! The actor message envelope and its wire codec.
//!
//! Actors never share state; everything they learn about each other
//! arrives as an [`Envelope`] addressed to an [`Address`]. The envelope is a
//! closed sum type, so each actor's handler is an exhaustive `match` with an
//! explicit no-op arm for variants its role does not consume.
//!
//! # Wire format
//!
//! JSON with an internal `"tag"` field naming the variant. [`Envelope::decode`]
//! separates three failure modes (not JSON, no tag or an unknown tag, a known
//! tag with a bad payload) so a receiver can log why it dropped something.
//! Receivers drop undecodable payloads without touching their state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{NewsKind, Party, Phase};
use crate::ids::VoterId;
use crate::structs::{
    BallotChoice, CampaignEvent, CandidacyStanding, CandidateProfile, CoverageDigest,
    ElectionResult, GazetteDigest, NeighborProfile, PartyStanding,
};

/// Logical mailbox of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Address {
    /// The schedule driver.
    Orchestrator,
    /// The media desk running every candidate's campaign.
    Media,
    /// The electoral authority.
    Authority,
    /// A citizen (candidates included).
    Voter(VoterId),
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Orchestrator => f.write_str("orchestrator"),
            Self::Media => f.write_str("media"),
            Self::Authority => f.write_str("authority"),
            Self::Voter(id) => write!(f, "{id}"),
        }
    }
}

/// Every message that can travel between actors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag")]
pub enum Envelope {
    /// Clock broadcast from the orchestrator.
    Tick {
        /// The new tick.
        tick: u64,
        /// Phase the tick belongs to.
        phase: Phase,
    },
    /// A citizen asking a neighbor for its current profile.
    ProfileQuery {
        /// Who is asking.
        from: VoterId,
        /// Tick of the interaction.
        tick: u64,
    },
    /// A neighbor's answer to [`Envelope::ProfileQuery`].
    ProfileReply {
        /// The neighbor's profile.
        profile: NeighborProfile,
        /// Tick of the interaction.
        tick: u64,
    },
    /// Orchestrator asking every citizen for its candidacy standing.
    StandingRequest {
        /// Selection tick.
        tick: u64,
    },
    /// A citizen's answer to [`Envelope::StandingRequest`].
    Standing {
        /// Inputs to the candidate score.
        standing: CandidacyStanding,
    },
    /// The list of promoted candidates.
    CandidatesAnnounced {
        /// Selection tick.
        tick: u64,
        /// Candidates in ranking order.
        candidates: Vec<CandidateProfile>,
    },
    /// A campaign message delivered to a citizen.
    Campaign {
        /// Tick it was sent.
        tick: u64,
        /// Candidate that paid for it.
        sender: VoterId,
        /// The sender's party.
        party: Party,
        /// NEWS or FAKENEWS.
        kind: NewsKind,
    },
    /// Media desk filing a campaign action with the authority.
    Filing {
        /// The action as the media desk saw it (`detected` is `false`).
        event: CampaignEvent,
        /// Money the action cost the candidate.
        outlay: Decimal,
    },
    /// Authority notice that a filed FAKENEWS was detected and punished.
    Sanction {
        /// Tick of the detected message.
        tick: u64,
        /// Punished candidate.
        candidate: VoterId,
        /// Detected violations so far, this one included.
        punishments: u32,
        /// Flat penalty the authority booked against its budget mirror.
        penalty: Decimal,
    },
    /// Authority notice that a candidate may no longer campaign.
    Elimination {
        /// Tick of the violation that triggered it.
        tick: u64,
        /// Eliminated candidate.
        candidate: VoterId,
    },
    /// Orchestrator asking for a periodic digest.
    ReportRequest {
        /// Report tick, the last tick of the window.
        tick: u64,
        /// First tick of the window, inclusive.
        since: u64,
    },
    /// The media desk's digest.
    MediaDigest {
        /// Coverage summary.
        digest: CoverageDigest,
    },
    /// The authority's digest.
    Gazette {
        /// Campaign log summary.
        digest: GazetteDigest,
    },
    /// Orchestrator asking the authority for party reputations before the vote.
    StandingsRequest {
        /// Election tick.
        tick: u64,
    },
    /// The authority's answer to [`Envelope::StandingsRequest`].
    Standings {
        /// Election tick.
        tick: u64,
        /// Reputation of every party.
        parties: Vec<PartyStanding>,
    },
    /// Orchestrator opening the polls for one citizen.
    VoteRequest {
        /// Election tick.
        tick: u64,
        /// Party reputations the ballot is scored against.
        reputations: Vec<PartyStanding>,
    },
    /// A cast ballot, sent to the authority.
    Ballot {
        /// The voter.
        voter: VoterId,
        /// What was marked.
        choice: BallotChoice,
    },
    /// A citizen telling the orchestrator it has finished at the polls.
    TurnoutAck {
        /// The citizen.
        voter: VoterId,
        /// `false` when the citizen abstained.
        voted: bool,
    },
    /// Orchestrator closing the polls.
    StartCount {
        /// Election tick.
        tick: u64,
    },
    /// The final count.
    Results {
        /// Votes, seats, and seat holders.
        result: ElectionResult,
    },
    /// Stop processing and exit.
    Shutdown,
}

impl Envelope {
    /// The variant's wire tag.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "Tick",
            Self::ProfileQuery { .. } => "ProfileQuery",
            Self::ProfileReply { .. } => "ProfileReply",
            Self::StandingRequest { .. } => "StandingRequest",
            Self::Standing { .. } => "Standing",
            Self::CandidatesAnnounced { .. } => "CandidatesAnnounced",
            Self::Campaign { .. } => "Campaign",
            Self::Filing { .. } => "Filing",
            Self::Sanction { .. } => "Sanction",
            Self::Elimination { .. } => "Elimination",
            Self::ReportRequest { .. } => "ReportRequest",
            Self::MediaDigest { .. } => "MediaDigest",
            Self::Gazette { .. } => "Gazette",
            Self::StandingsRequest { .. } => "StandingsRequest",
            Self::Standings { .. } => "Standings",
            Self::VoteRequest { .. } => "VoteRequest",
            Self::Ballot { .. } => "Ballot",
            Self::TurnoutAck { .. } => "TurnoutAck",
            Self::StartCount { .. } => "StartCount",
            Self::Results { .. } => "Results",
            Self::Shutdown => "Shutdown",
        }
    }

    /// Encode to the JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|source| ProtocolError::Encode { source })
    }

    /// Decode from the JSON wire format.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Malformed`] if the payload is not a JSON object.
    /// - [`ProtocolError::MissingTag`] if there is no string `"tag"` field.
    /// - [`ProtocolError::UnknownTag`] if the tag names no variant.
    /// - [`ProtocolError::InvalidPayload`] if the fields do not fit the variant.
    pub fn decode(payload: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|source| ProtocolError::Malformed { source })?;
        let tag = value
            .get("tag")
            .and_then(serde_json::Value::as_str)
            .ok_or(ProtocolError::MissingTag)?;
        let tag = tag.to_owned();
        serde_json::from_value(value).map_err(|source| {
            if source.to_string().starts_with("unknown variant") {
                ProtocolError::UnknownTag { tag }
            } else {
                ProtocolError::InvalidPayload { tag, source }
            }
        })
    }
}

/// Errors from the envelope wire codec.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The envelope could not be serialized.
    #[error("failed to encode envelope: {source}")]
    Encode {
        /// Underlying serializer error.
        source: serde_json::Error,
    },

    /// The payload is not valid JSON.
    #[error("malformed payload: {source}")]
    Malformed {
        /// Underlying parser error.
        source: serde_json::Error,
    },

    /// The payload has no string `"tag"` field.
    #[error("payload has no protocol tag")]
    MissingTag,

    /// The tag names no known variant.
    #[error("unknown protocol tag: {tag}")]
    UnknownTag {
        /// The tag that was received.
        tag: String,
    },

    /// The tag is known but the fields do not match it.
    #[error("invalid payload for {tag}: {source}")]
    InvalidPayload {
        /// The tag that was received.
        tag: String,
        /// Underlying deserializer error.
        source: serde_json::Error,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn campaign_envelope_survives_the_wire() {
        let env = Envelope::Campaign {
            tick: 12,
            sender: VoterId::new(4),
            party: Party::Pdd,
            kind: NewsKind::FakeNews,
        };
        let wire = env.encode().unwrap();
        assert!(wire.contains("\"tag\":\"Campaign\""));
        assert_eq!(Envelope::decode(&wire).unwrap(), env);
    }

    #[test]
    fn filing_keeps_exact_outlay() {
        let env = Envelope::Filing {
            event: CampaignEvent {
                tick: 11,
                sender: VoterId::new(1),
                party: Party::Pce,
                kind: NewsKind::News,
                detected: false,
                reach: 3,
                keywords: vec!["#election".to_owned()],
            },
            outlay: Decimal::new(3050, 2),
        };
        let back = Envelope::decode(&env.encode().unwrap()).unwrap();
        assert_eq!(back, env);
    }

    #[test]
    fn unit_variant_has_tag_only() {
        assert_eq!(Envelope::Shutdown.encode().unwrap(), r#"{"tag":"Shutdown"}"#);
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            Envelope::decode("not json"),
            Err(ProtocolError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_missing_and_unknown_tags() {
        assert!(matches!(
            Envelope::decode(r#"{"tick":3}"#),
            Err(ProtocolError::MissingTag)
        ));
        assert!(matches!(
            Envelope::decode(r#"{"tag":"Bribe","amount":5}"#),
            Err(ProtocolError::UnknownTag { tag }) if tag == "Bribe"
        ));
    }

    #[test]
    fn rejects_bad_payload_for_known_tag() {
        assert!(matches!(
            Envelope::decode(r#"{"tag":"Tick","tick":"soon"}"#),
            Err(ProtocolError::InvalidPayload { tag, .. }) if tag == "Tick"
        ));
    }

    fn one_of_each() -> Vec<Envelope> {
        let id = VoterId::new(3);
        let parties = vec![PartyStanding {
            party: Party::Pce,
            reputation: 0.5,
        }];
        vec![
            Envelope::Tick { tick: 1, phase: Phase::PreCampaign },
            Envelope::ProfileQuery { from: id, tick: 1 },
            Envelope::ProfileReply {
                profile: NeighborProfile {
                    voter: id,
                    party: Party::Ped,
                    ideology: 2.0,
                    engagement: 0.5,
                    involvement: 0.25,
                },
                tick: 1,
            },
            Envelope::StandingRequest { tick: 10 },
            Envelope::Standing {
                standing: CandidacyStanding {
                    voter: id,
                    party: Party::Ped,
                    persuasion: 0.5,
                    degree: 6,
                    involvement: 0.25,
                },
            },
            Envelope::CandidatesAnnounced {
                tick: 10,
                candidates: vec![CandidateProfile {
                    id,
                    party: Party::Ped,
                    reputation: 0.6,
                    fake_propensity: 0.25,
                }],
            },
            Envelope::Campaign {
                tick: 11,
                sender: id,
                party: Party::Ped,
                kind: NewsKind::News,
            },
            Envelope::Filing {
                event: CampaignEvent {
                    tick: 11,
                    sender: id,
                    party: Party::Ped,
                    kind: NewsKind::FakeNews,
                    detected: false,
                    reach: 2,
                    keywords: Vec::new(),
                },
                outlay: Decimal::new(58, 0),
            },
            Envelope::Sanction {
                tick: 11,
                candidate: id,
                punishments: 1,
                penalty: Decimal::new(100, 0),
            },
            Envelope::Elimination { tick: 12, candidate: id },
            Envelope::ReportRequest { tick: 20, since: 11 },
            Envelope::MediaDigest {
                digest: CoverageDigest {
                    tick: 20,
                    window_start: 11,
                    window_end: 20,
                    blocks: Vec::new(),
                    leader: None,
                    news: 0,
                    fake_news: 0,
                    spent: Decimal::ZERO,
                    active_candidates: 1,
                },
            },
            Envelope::Gazette {
                digest: GazetteDigest {
                    tick: 20,
                    window_start: 11,
                    window_end: 20,
                    top_keywords: Vec::new(),
                    top_senders: Vec::new(),
                    reputations: parties.clone(),
                    news: 0,
                    fake_news: 0,
                    detected: 0,
                },
            },
            Envelope::StandingsRequest { tick: 51 },
            Envelope::Standings {
                tick: 51,
                parties: parties.clone(),
            },
            Envelope::VoteRequest {
                tick: 51,
                reputations: parties,
            },
            Envelope::Ballot {
                voter: id,
                choice: BallotChoice::Null,
            },
            Envelope::TurnoutAck { voter: id, voted: true },
            Envelope::StartCount { tick: 51 },
            Envelope::Results {
                result: ElectionResult {
                    tick: 51,
                    population: 0,
                    valid_votes: 0,
                    null_votes: 0,
                    abstentions: 0,
                    seats_total: 16,
                    parties: Vec::new(),
                    candidates: Vec::new(),
                    elected: Vec::new(),
                    eliminated: Vec::new(),
                },
            },
            Envelope::Shutdown,
        ]
    }

    #[test]
    fn every_variant_carries_its_own_tag_over_the_wire() {
        let all = one_of_each();
        assert_eq!(all.len(), 21);
        let mut tags = std::collections::BTreeSet::new();
        for env in all {
            let wire = env.encode().unwrap();
            let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
            assert_eq!(value.get("tag").and_then(serde_json::Value::as_str), Some(env.tag()));
            assert_eq!(Envelope::decode(&wire).unwrap(), env);
            tags.insert(env.tag());
        }
        assert_eq!(tags.len(), 21);
    }

    #[test]
    fn address_display() {
        assert_eq!(Address::Voter(VoterId::new(9)).to_string(), "v0009");
    }
}
