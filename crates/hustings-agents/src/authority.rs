//! The electoral authority.
//!
//! Owns the append-only campaign log, candidate and party reputation, the
//! violation and punishment counters, its own mirror of each candidate's
//! budget, the ballot box, and the count.
//!
//! # Detection
//!
//! Every FAKENEWS filing gets one uniform draw. Below the detection
//! probability the violation is detected: the counters move, a flat penalty
//! is booked against the budget mirror, reputations drop, and the media desk
//! is sent a [`Envelope::Sanction`]. The filing that brings the punishment
//! count to the elimination threshold also sends an [`Envelope::Elimination`].
//! Undetected filings are logged and change nothing else.
//!
//! # Invariants
//!
//! - A candidate is eliminated exactly when its punishment count reaches
//!   the threshold, and never punished again afterwards.
//! - The first ballot from a citizen counts; later ones are dropped.
//! - The count runs once; later requests get the same result back.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use tracing::{debug, info, trace, warn};

use hustings_types::{
    Address, BallotChoice, CampaignEvent, CandidateProfile, ElectionResult, Envelope, NewsKind,
    Party, VoterId,
};

use crate::config::Tunables;
use crate::digest;
use crate::mailbox::{Actor, Outbox};
use crate::reputation::ReputationBook;
use crate::seed::actor_rng;
use crate::tally::{self, Contender, Count};

/// What the authority knows about one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    /// The candidate's party.
    pub party: Party,
    /// FAKENEWS filings received.
    pub reports: u32,
    /// FAKENEWS filings detected.
    pub violations: u32,
    /// Penalties applied.
    pub punishments: u32,
    /// Budget as the authority reckons it: initial budget minus filed outlays and penalties.
    pub budget_mirror: Decimal,
    /// Whether the candidate has been removed from the campaign.
    pub eliminated: bool,
    /// Total citizens reached according to filings.
    pub reach: u64,
}

impl CandidateRecord {
    fn new(party: Party, budget: Decimal) -> Self {
        Self {
            party,
            reports: 0,
            violations: 0,
            punishments: 0,
            budget_mirror: budget,
            eliminated: false,
            reach: 0,
        }
    }
}

/// Outcome of reviewing one filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// NEWS, credited to reputation.
    Credited,
    /// FAKENEWS that slipped through.
    Undetected,
    /// FAKENEWS that was caught and punished.
    Punished {
        /// Punishments so far.
        punishments: u32,
        /// Whether this punishment eliminated the candidate.
        eliminated: bool,
    },
    /// Filing from a candidate already eliminated; logged only.
    Ignored,
}

/// The electoral authority actor.
pub struct Authority {
    records: BTreeMap<VoterId, CandidateRecord>,
    reputation: ReputationBook,
    log: Vec<CampaignEvent>,
    ballots: BTreeMap<VoterId, BallotChoice>,
    population: u32,
    tunables: Arc<Tunables>,
    rng: StdRng,
    result: Option<ElectionResult>,
}

impl Authority {
    /// An authority for `population` registered citizens.
    pub fn new(population: u32, tunables: Arc<Tunables>, seed: u64) -> Self {
        Self {
            records: BTreeMap::new(),
            reputation: ReputationBook::new(&tunables.authority),
            log: Vec::new(),
            ballots: BTreeMap::new(),
            population,
            tunables,
            rng: actor_rng(seed, Address::Authority),
            result: None,
        }
    }

    /// Register the announced candidates. Existing records are kept.
    pub fn enroll(&mut self, candidates: &[CandidateProfile]) {
        let budget = self.tunables.campaign.budget;
        for c in candidates {
            self.records
                .entry(c.id)
                .or_insert_with(|| CandidateRecord::new(c.party, budget));
            self.reputation.enroll(c.id, c.reputation);
        }
    }

    /// The record of `candidate`.
    pub fn record(&self, candidate: VoterId) -> Option<&CandidateRecord> {
        self.records.get(&candidate)
    }

    /// Reputation scores.
    pub const fn reputation(&self) -> &ReputationBook {
        &self.reputation
    }

    /// The campaign log, in filing order.
    pub fn log(&self) -> &[CampaignEvent] {
        &self.log
    }

    /// The final count, once it has run.
    pub const fn result(&self) -> Option<&ElectionResult> {
        self.result.as_ref()
    }

    /// Review one filing and log it.
    pub fn review(
        &mut self,
        mut event: CampaignEvent,
        outlay: Decimal,
        outbox: &mut Outbox,
    ) -> Verdict {
        let cfg = Arc::clone(&self.tunables);
        let record = self
            .records
            .entry(event.sender)
            .or_insert_with(|| CandidateRecord::new(event.party, cfg.campaign.budget));
        record.budget_mirror = record.budget_mirror.saturating_sub(outlay).max(Decimal::ZERO);
        record.reach = record.reach.saturating_add(u64::from(event.reach));

        let verdict = if record.eliminated {
            Verdict::Ignored
        } else {
            match event.kind {
                NewsKind::News => {
                    self.reputation.reward_news(event.sender, event.party, &cfg.authority);
                    Verdict::Credited
                }
                NewsKind::FakeNews => {
                    record.reports = record.reports.saturating_add(1);
                    if self.rng.random::<f64>() < cfg.authority.detection_probability {
                        record.violations = record.violations.saturating_add(1);
                        record.punishments = record.punishments.saturating_add(1);
                        record.budget_mirror = record
                            .budget_mirror
                            .saturating_sub(cfg.authority.penalty)
                            .max(Decimal::ZERO);
                        let eliminated = record.punishments >= cfg.authority.elimination_threshold;
                        record.eliminated = eliminated;
                        self.reputation.punish(event.sender, event.party, &cfg.authority);
                        event.detected = true;

                        outbox.send(
                            Address::Media,
                            Envelope::Sanction {
                                tick: event.tick,
                                candidate: event.sender,
                                punishments: record.punishments,
                                penalty: cfg.authority.penalty,
                            },
                        );
                        if eliminated {
                            outbox.send(
                                Address::Media,
                                Envelope::Elimination {
                                    tick: event.tick,
                                    candidate: event.sender,
                                },
                            );
                            info!(
                                tick = event.tick,
                                candidate = %event.sender,
                                party = %event.party,
                                punishments = record.punishments,
                                "candidate eliminated"
                            );
                        } else {
                            debug!(
                                tick = event.tick,
                                candidate = %event.sender,
                                punishments = record.punishments,
                                "fake news detected"
                            );
                        }
                        Verdict::Punished {
                            punishments: record.punishments,
                            eliminated,
                        }
                    } else {
                        Verdict::Undetected
                    }
                }
            }
        };
        self.log.push(event);
        verdict
    }

    /// Put a ballot in the box. Returns `false` if the citizen already voted.
    pub fn accept_ballot(&mut self, voter: VoterId, choice: BallotChoice) -> bool {
        if self.ballots.contains_key(&voter) {
            warn!(voter = %voter, "second ballot rejected");
            return false;
        }
        self.ballots.insert(voter, choice);
        true
    }

    /// Run the count, once.
    pub fn count(&mut self, tick: u64) -> &ElectionResult {
        self.result.get_or_insert_with(|| {
            let count = Count::from_ballots(self.ballots.values());
            let seats_total = self.tunables.ballot.seats;
            let parties = count.apportion(seats_total);
            let contenders: Vec<Contender> = self
                .records
                .iter()
                .filter(|(_, r)| !r.eliminated)
                .map(|(&candidate, r)| Contender {
                    candidate,
                    party: r.party,
                    reputation: self.reputation.candidate(candidate),
                    reach: r.reach,
                })
                .collect();
            let elected = tally::rank_elected(&contenders, &parties);
            let eliminated = self
                .records
                .iter()
                .filter(|(_, r)| r.eliminated)
                .map(|(&id, _)| id)
                .collect();
            ElectionResult {
                tick,
                population: self.population,
                valid_votes: count.valid,
                null_votes: count.null,
                abstentions: self.population.saturating_sub(count.received()),
                seats_total,
                parties,
                candidates: count.candidate_tallies(),
                elected,
                eliminated,
            }
        })
    }
}

impl Actor for Authority {
    fn address(&self) -> Address {
        Address::Authority
    }

    fn handle(&mut self, envelope: Envelope, outbox: &mut Outbox) {
        match envelope {
            Envelope::CandidatesAnnounced { candidates, .. } => self.enroll(&candidates),
            Envelope::Filing { event, outlay } => {
                self.review(event, outlay, outbox);
            }
            Envelope::ReportRequest { tick, since } => {
                let cfg = &self.tunables.authority;
                outbox.send(
                    Address::Orchestrator,
                    Envelope::Gazette {
                        digest: digest::gazette(
                            &self.log,
                            since,
                            tick,
                            self.reputation.standings(),
                            cfg.top_keywords,
                            cfg.top_senders,
                        ),
                    },
                );
            }
            Envelope::StandingsRequest { tick } => {
                outbox.send(
                    Address::Orchestrator,
                    Envelope::Standings {
                        tick,
                        parties: self.reputation.standings(),
                    },
                );
            }
            Envelope::Ballot { voter, choice } => {
                self.accept_ballot(voter, choice);
            }
            Envelope::StartCount { tick } => {
                let result = self.count(tick).clone();
                info!(
                    tick,
                    valid = result.valid_votes,
                    null = result.null_votes,
                    abstentions = result.abstentions,
                    "count complete"
                );
                outbox.send(Address::Orchestrator, Envelope::Results { result });
            }
            Envelope::Tick { .. }
            | Envelope::ProfileQuery { .. }
            | Envelope::ProfileReply { .. }
            | Envelope::StandingRequest { .. }
            | Envelope::Standing { .. }
            | Envelope::Campaign { .. }
            | Envelope::Sanction { .. }
            | Envelope::Elimination { .. }
            | Envelope::MediaDigest { .. }
            | Envelope::Gazette { .. }
            | Envelope::Standings { .. }
            | Envelope::VoteRequest { .. }
            | Envelope::TurnoutAck { .. }
            | Envelope::Results { .. }
            | Envelope::Shutdown => {
                trace!(tag = envelope.tag(), "authority dropped envelope");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::campaign::keywords;
    use crate::config::AuthorityConfig;

    fn authority(detection: f64) -> Authority {
        let tunables = Tunables {
            authority: AuthorityConfig {
                detection_probability: detection,
                ..AuthorityConfig::default()
            },
            ..Tunables::default()
        };
        let mut a = Authority::new(10, Arc::new(tunables), 3);
        a.enroll(&[CandidateProfile {
            id: VoterId::new(1),
            party: Party::Pdd,
            reputation: 0.6,
            fake_propensity: 0.15,
        }]);
        a
    }

    fn filing(tick: u64, kind: NewsKind) -> CampaignEvent {
        CampaignEvent {
            tick,
            sender: VoterId::new(1),
            party: Party::Pdd,
            kind,
            detected: false,
            reach: 4,
            keywords: keywords(Party::Pdd, kind),
        }
    }

    #[test]
    fn elimination_happens_exactly_at_the_third_punishment() {
        let mut a = authority(1.0);
        let mut out = Outbox::new();
        for (i, tick) in (11..=13).enumerate() {
            let verdict = a.review(filing(tick, NewsKind::FakeNews), dec!(66), &mut out);
            let third = i == 2;
            assert_eq!(
                verdict,
                Verdict::Punished {
                    punishments: u32::try_from(i + 1).unwrap(),
                    eliminated: third
                }
            );
            assert_eq!(a.record(VoterId::new(1)).unwrap().eliminated, third);
        }
        let eliminations = out
            .letters()
            .iter()
            .filter(|l| matches!(l.envelope, Envelope::Elimination { .. }))
            .count();
        assert_eq!(eliminations, 1);
        let verdict = a.review(filing(14, NewsKind::FakeNews), dec!(66), &mut out);
        assert_eq!(verdict, Verdict::Ignored);
        assert_eq!(a.record(VoterId::new(1)).unwrap().punishments, 3);
        assert_eq!(a.log().len(), 4);
    }

    #[test]
    fn undetected_filings_only_log() {
        let mut a = authority(0.0);
        let mut out = Outbox::new();
        let rep = a.reputation().candidate(VoterId::new(1));
        let verdict = a.review(filing(11, NewsKind::FakeNews), dec!(0), &mut out);
        assert_eq!(verdict, Verdict::Undetected);
        assert!(out.is_empty());
        let rec = a.record(VoterId::new(1)).unwrap();
        assert_eq!((rec.reports, rec.violations, rec.punishments), (1, 0, 0));
        assert!((a.reputation().candidate(VoterId::new(1)) - rep).abs() < f64::EPSILON);
        assert!(!a.log().first().unwrap().detected);
    }

    #[test]
    fn detection_marks_the_log_and_books_the_penalty() {
        let mut a = authority(1.0);
        let mut out = Outbox::new();
        a.review(filing(11, NewsKind::FakeNews), dec!(66), &mut out);
        assert!(a.log().first().unwrap().detected);
        assert_eq!(a.record(VoterId::new(1)).unwrap().budget_mirror, dec!(834));
        assert!(matches!(
            out.letters().first().map(|l| &l.envelope),
            Some(Envelope::Sanction { punishments: 1, .. })
        ));
    }

    #[test]
    fn news_raises_reputation() {
        let mut a = authority(1.0);
        let mut out = Outbox::new();
        let verdict = a.review(filing(11, NewsKind::News), dec!(40), &mut out);
        assert_eq!(verdict, Verdict::Credited);
        assert!(a.reputation().candidate(VoterId::new(1)) > 0.6);
        assert!(out.is_empty());
    }

    #[test]
    fn duplicate_ballots_are_dropped() {
        let mut a = authority(0.0);
        assert!(a.accept_ballot(VoterId::new(3), BallotChoice::List { party: Party::Ped }));
        assert!(!a.accept_ballot(VoterId::new(3), BallotChoice::Null));
        let result = a.count(51).clone();
        assert_eq!(result.valid_votes, 1);
        assert_eq!(result.null_votes, 0);
        assert_eq!(result.abstentions, 9);
    }

    #[test]
    fn count_balances_the_population_and_fills_seats() {
        let mut a = authority(0.0);
        let mut out = Outbox::new();
        let null = Envelope::Ballot {
            voter: VoterId::new(0),
            choice: BallotChoice::Null,
        };
        a.handle(null, &mut out);
        for i in 1..=6 {
            let choice = BallotChoice::Candidate {
                party: Party::Pdd,
                candidate: VoterId::new(1),
            };
            let voter = VoterId::new(i);
            a.handle(Envelope::Ballot { voter, choice }, &mut out);
        }
        a.handle(Envelope::StartCount { tick: 51 }, &mut out);
        let last = out.letters().last().map(|l| l.envelope.clone());
        let Some(Envelope::Results { result }) = last else {
            panic!("expected results");
        };
        assert_eq!(result.abstentions + result.null_votes + result.valid_votes, 10);
        assert_eq!(result.seats_awarded(), 16);
        assert_eq!(result.seats_for(Party::Pdd), 16);
        assert_eq!(result.elected.len(), 1);
        assert_eq!(result.candidates.first().map(|c| c.votes), Some(6));

        a.handle(Envelope::StartCount { tick: 51 }, &mut out);
        let again = out.letters().last().map(|l| l.envelope.clone());
        assert_eq!(again, Some(Envelope::Results { result }));
    }

    #[test]
    fn eliminated_self_vote_is_counted_but_never_seated() {
        let mut a = authority(1.0);
        let mut out = Outbox::new();
        for tick in 11..=13 {
            a.review(filing(tick, NewsKind::FakeNews), dec!(66), &mut out);
        }
        assert!(a.record(VoterId::new(1)).unwrap().eliminated);
        let own = BallotChoice::Candidate {
            party: Party::Pdd,
            candidate: VoterId::new(1),
        };
        assert!(a.accept_ballot(VoterId::new(1), own));
        let result = a.count(51).clone();
        assert_eq!(result.votes_for(Party::Pdd), 1);
        assert_eq!(result.candidates.first().map(|c| c.votes), Some(1));
        assert!(result.eliminated.contains(&VoterId::new(1)));
        assert!(result.elected.is_empty());
    }

    #[test]
    fn empty_box_awards_no_seats() {
        let mut a = authority(0.0);
        let result = a.count(51).clone();
        assert_eq!(result.seats_awarded(), 0);
        assert_eq!(result.abstentions, 10);
    }
}
