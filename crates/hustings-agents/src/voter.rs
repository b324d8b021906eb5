//! Citizens: their state and the actor that owns it.
//!
//! A [`Voter`] is the only writer of its [`VoterState`]. It answers
//! neighbors' profile queries, applies pre-campaign influence from their
//! replies, absorbs campaign messages after the selection cut-off, and casts
//! at most one ballot.
//!
//! # Invariants
//!
//! - Support stays in `[0, 1]` and ideology in `[-2, +2]`.
//! - `fatigue` and `msg_count` never decrease.
//! - The election-day decision is taken once; later vote requests are no-ops.
//! - Candidates never absorb campaign messages.

use std::sync::Arc;

use rand::rngs::StdRng;
use tracing::{debug, trace};

use hustings_types::{
    Address, CandidacyStanding, Envelope, NeighborProfile, NewsKind, Party, PartyStanding, Phase,
    VoterId,
};
use hustings_world::SupportRules;
use hustings_world::rules::clamp_unit;

use crate::ballot::{self, VoteOutcome};
use crate::config::{ExposureConfig, Tunables};
use crate::influence;
use crate::mailbox::{Actor, Outbox};
use crate::memory::CampaignMemory;
use crate::seed::actor_rng;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Everything a citizen knows about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct VoterState {
    /// Identity.
    pub id: VoterId,
    /// Declared party.
    pub party: Party,
    /// Support for the declared party, in `[0, 1]`.
    pub support: f64,
    /// Ideology, in `[-2, +2]`.
    pub ideology: f64,
    /// Willingness to take part, in `[0, 1]`.
    pub engagement: f64,
    /// Trust in media, fixed at creation.
    pub media_trust: f64,
    /// Accumulated exposure, in `[0, 1]`.
    pub fatigue: f64,
    /// Civic involvement, in `[0, 1]`.
    pub involvement: f64,
    /// Capacity to persuade others, in `[0, 1]`.
    pub persuasion: f64,
    /// Campaign messages received.
    pub msg_count: u32,
    /// Neighbors in the social graph.
    pub degree: u32,
    /// Recent impact of each candidate's messages.
    pub memory: CampaignMemory,
    /// Whether this citizen was promoted to candidate.
    pub is_candidate: bool,
    /// The election-day decision, once taken.
    pub vote: Option<VoteOutcome>,
}

impl VoterState {
    /// Profile revealed to a neighbor.
    pub const fn profile(&self) -> NeighborProfile {
        NeighborProfile {
            voter: self.id,
            party: self.party,
            ideology: self.ideology,
            engagement: self.engagement,
            involvement: self.involvement,
        }
    }

    /// Inputs to the candidate ranking.
    pub const fn standing(&self) -> CandidacyStanding {
        CandidacyStanding {
            voter: self.id,
            party: self.party,
            persuasion: self.persuasion,
            degree: self.degree,
            involvement: self.involvement,
        }
    }

    /// Whether a ballot was handed in.
    pub const fn voted(&self) -> bool {
        matches!(self.vote, Some(VoteOutcome::Cast(_)))
    }

    /// Absorb one campaign message.
    ///
    /// NEWS lands as a small positive impact scaled by media trust. FAKENEWS
    /// lands harder, but backfires on citizens whose trust exceeds the
    /// skeptic threshold.
    pub fn absorb(
        &mut self,
        sender: VoterId,
        party: Party,
        kind: NewsKind,
        cfg: &ExposureConfig,
        rng: &mut impl rand::Rng,
    ) {
        self.msg_count = self.msg_count.saturating_add(1);
        self.fatigue = clamp_unit(self.fatigue + cfg.fatigue_step.max(0.0));
        let impact = match kind {
            NewsKind::News => cfg.news_impact.sample(rng) * self.media_trust,
            NewsKind::FakeNews => {
                let raw = cfg.fake_impact.sample(rng);
                if self.media_trust > cfg.skeptic_trust {
                    raw * cfg.skeptic_factor
                } else {
                    raw
                }
            }
        };
        self.memory.record(sender, party, impact);
    }

    /// A mid-range citizen for unit tests.
    #[cfg(test)]
    pub(crate) fn sample(party: Party) -> Self {
        Self {
            id: VoterId::new(0),
            party,
            support: 0.5,
            ideology: f64::from(party.ideology()),
            engagement: 0.5,
            media_trust: 0.6,
            fatigue: 0.0,
            involvement: 0.4,
            persuasion: 0.5,
            msg_count: 0,
            degree: 6,
            memory: CampaignMemory::new(2),
            is_candidate: false,
            vote: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The actor that owns one citizen.
///
/// Eliminations are announced to the media desk only, so an eliminated
/// candidate still votes for itself; the count keeps that ballot but never
/// seats the candidate.
pub struct Voter {
    state: VoterState,
    neighbors: Vec<VoterId>,
    rules: Arc<dyn SupportRules>,
    tunables: Arc<Tunables>,
    rng: StdRng,
    phase: Phase,
    last_round: Option<u64>,
}

impl Voter {
    /// Wrap `state` with its neighbor list and a stream derived from `seed`.
    pub fn new(
        state: VoterState,
        neighbors: Vec<VoterId>,
        rules: Arc<dyn SupportRules>,
        tunables: Arc<Tunables>,
        seed: u64,
    ) -> Self {
        let rng = actor_rng(seed, Address::Voter(state.id));
        Self {
            state,
            neighbors,
            rules,
            tunables,
            rng,
            phase: Phase::PreCampaign,
            last_round: None,
        }
    }

    /// Read-only view of the citizen.
    pub const fn state(&self) -> &VoterState {
        &self.state
    }

    /// Take the election-day decision, once.
    ///
    /// Returns `None` if the decision was already taken.
    pub fn decide_and_vote(&mut self, reputations: &[PartyStanding]) -> Option<VoteOutcome> {
        if self.state.vote.is_some() {
            return None;
        }
        let outcome = ballot::decide(
            &self.state,
            reputations,
            self.tunables.authority.default_party_reputation,
            self.rules.as_ref(),
            &self.tunables.ballot,
            &mut self.rng,
        );
        self.state.vote = Some(outcome);
        Some(outcome)
    }

    fn start_round(&mut self, tick: u64, outbox: &mut Outbox) {
        if self.last_round.is_some_and(|t| t >= tick) {
            return;
        }
        self.last_round = Some(tick);
        let cfg = &self.tunables.influence;
        let picked = influence::sample_neighbors(&self.neighbors, cfg.sample_size, &mut self.rng);
        influence::begin_round(&mut self.state, picked.len(), cfg);
        for neighbor in picked {
            outbox.send(
                Address::Voter(neighbor),
                Envelope::ProfileQuery {
                    from: self.state.id,
                    tick,
                },
            );
        }
    }
}

impl Actor for Voter {
    fn address(&self) -> Address {
        Address::Voter(self.state.id)
    }

    fn handle(&mut self, envelope: Envelope, outbox: &mut Outbox) {
        match envelope {
            Envelope::Tick { tick, phase } => {
                self.phase = self.phase.max(phase);
                if matches!(phase, Phase::PreCampaign | Phase::CandidateSelection)
                    && self.phase <= Phase::CandidateSelection
                {
                    self.start_round(tick, outbox);
                }
            }
            Envelope::ProfileQuery { from, tick } => {
                outbox.send(
                    Address::Voter(from),
                    Envelope::ProfileReply {
                        profile: self.state.profile(),
                        tick,
                    },
                );
            }
            Envelope::ProfileReply { profile, tick } => {
                if self.phase > Phase::CandidateSelection {
                    trace!(voter = %self.state.id, tick, "late profile reply dropped");
                    return;
                }
                influence::interact(
                    &mut self.state,
                    &profile,
                    self.rules.as_ref(),
                    &self.tunables.influence,
                );
            }
            Envelope::StandingRequest { .. } => {
                outbox.send(
                    Address::Orchestrator,
                    Envelope::Standing {
                        standing: self.state.standing(),
                    },
                );
            }
            Envelope::CandidatesAnnounced { candidates, .. } => {
                if candidates.iter().any(|c| c.id == self.state.id) {
                    self.state.is_candidate = true;
                    debug!(voter = %self.state.id, party = %self.state.party, "promoted to candidate");
                }
            }
            Envelope::Campaign {
                sender,
                party,
                kind,
                ..
            } => {
                if self.state.is_candidate || sender == self.state.id {
                    return;
                }
                self.state
                    .absorb(sender, party, kind, &self.tunables.exposure, &mut self.rng);
            }
            Envelope::VoteRequest { reputations, .. } => {
                let Some(outcome) = self.decide_and_vote(&reputations) else {
                    trace!(voter = %self.state.id, "duplicate vote request ignored");
                    return;
                };
                if let Some(choice) = outcome.ballot() {
                    outbox.send(
                        Address::Authority,
                        Envelope::Ballot {
                            voter: self.state.id,
                            choice,
                        },
                    );
                }
                outbox.send(
                    Address::Orchestrator,
                    Envelope::TurnoutAck {
                        voter: self.state.id,
                        voted: outcome.ballot().is_some(),
                    },
                );
            }
            Envelope::Standing { .. }
            | Envelope::Filing { .. }
            | Envelope::Sanction { .. }
            | Envelope::Elimination { .. }
            | Envelope::ReportRequest { .. }
            | Envelope::MediaDigest { .. }
            | Envelope::Gazette { .. }
            | Envelope::StandingsRequest { .. }
            | Envelope::Standings { .. }
            | Envelope::Ballot { .. }
            | Envelope::TurnoutAck { .. }
            | Envelope::StartCount { .. }
            | Envelope::Results { .. }
            | Envelope::Shutdown => {
                trace!(voter = %self.state.id, tag = envelope.tag(), "dropped");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use hustings_types::{BallotChoice, CandidateProfile};
    use hustings_world::DefaultRules;

    use super::*;

    fn voter(state: VoterState, neighbors: Vec<VoterId>) -> Voter {
        Voter::new(
            state,
            neighbors,
            Arc::new(DefaultRules),
            Arc::new(Tunables::default()),
            42,
        )
    }

    #[test]
    fn second_vote_request_is_a_no_op() {
        let mut v = voter(VoterState::sample(Party::Pdd), Vec::new());
        let mut out = Outbox::new();
        v.handle(Envelope::VoteRequest { tick: 51, reputations: Vec::new() }, &mut out);
        let first = out.len();
        assert!(first == 1 || first == 2);
        out.drain();
        v.handle(Envelope::VoteRequest { tick: 51, reputations: Vec::new() }, &mut out);
        assert!(out.is_empty());
        assert!(v.decide_and_vote(&[]).is_none());
    }

    #[test]
    fn at_most_one_ballot_reaches_the_authority() {
        let mut s = VoterState::sample(Party::Pce);
        s.involvement = 1.0;
        let mut v = voter(s, Vec::new());
        let mut out = Outbox::new();
        for _ in 0..5 {
            v.handle(Envelope::VoteRequest { tick: 51, reputations: Vec::new() }, &mut out);
        }
        let ballots = out
            .letters()
            .iter()
            .filter(|l| matches!(l.envelope, Envelope::Ballot { .. }))
            .count();
        assert!(ballots <= 1);
        let acks = out
            .letters()
            .iter()
            .filter(|l| matches!(l.envelope, Envelope::TurnoutAck { .. }))
            .count();
        assert_eq!(acks, 1);
    }

    #[test]
    fn pre_campaign_tick_queries_sampled_neighbors_once() {
        let neighbors: Vec<VoterId> = (1..=6).map(VoterId::new).collect();
        let mut v = voter(VoterState::sample(Party::Ped), neighbors);
        let mut out = Outbox::new();
        v.handle(Envelope::Tick { tick: 0, phase: Phase::PreCampaign }, &mut out);
        assert_eq!(out.len(), 3);
        out.drain();
        v.handle(Envelope::Tick { tick: 0, phase: Phase::PreCampaign }, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn answers_profile_queries() {
        let mut v = voter(VoterState::sample(Party::Pee), Vec::new());
        let mut out = Outbox::new();
        v.handle(Envelope::ProfileQuery { from: VoterId::new(8), tick: 3 }, &mut out);
        let letter = out.letters().first().unwrap();
        assert_eq!(letter.to, Address::Voter(VoterId::new(8)));
        assert!(matches!(letter.envelope, Envelope::ProfileReply { tick: 3, .. }));
    }

    #[test]
    fn candidates_ignore_campaign_messages() {
        let mut v = voter(VoterState::sample(Party::Pdd), Vec::new());
        let mut out = Outbox::new();
        let me = v.state().id;
        v.handle(
            Envelope::CandidatesAnnounced {
                tick: 10,
                candidates: vec![CandidateProfile {
                    id: me,
                    party: Party::Pdd,
                    reputation: 0.6,
                    fake_propensity: 0.15,
                }],
            },
            &mut out,
        );
        v.handle(
            Envelope::Campaign {
                tick: 11,
                sender: VoterId::new(5),
                party: Party::Ped,
                kind: NewsKind::News,
            },
            &mut out,
        );
        assert!(v.state().is_candidate);
        assert_eq!(v.state().msg_count, 0);
    }

    #[test]
    fn skeptics_are_inoculated_against_fake_news() {
        let mut rng = SmallRng::seed_from_u64(2);
        let cfg = ExposureConfig::default();
        let mut s = VoterState::sample(Party::Pdd);
        s.media_trust = 0.85;
        s.absorb(VoterId::new(1), Party::Ped, NewsKind::FakeNews, &cfg, &mut rng);
        assert!(s.memory.buzz(VoterId::new(1)).unwrap() < 0.0);
        s.media_trust = 0.5;
        s.absorb(VoterId::new(2), Party::Ped, NewsKind::FakeNews, &cfg, &mut rng);
        assert!(s.memory.buzz(VoterId::new(2)).unwrap() > 0.0);
        assert_eq!(s.msg_count, 2);
        assert!((s.fatigue - 0.01).abs() < 1e-12);
    }

    #[test]
    fn unrelated_envelopes_leave_state_untouched() {
        let mut v = voter(VoterState::sample(Party::Spd), Vec::new());
        let before = v.state().clone();
        let mut out = Outbox::new();
        v.handle(Envelope::Shutdown, &mut out);
        v.handle(
            Envelope::Ballot {
                voter: VoterId::new(3),
                choice: BallotChoice::Null,
            },
            &mut out,
        );
        assert_eq!(v.state(), &before);
        assert!(out.is_empty());
    }
}
