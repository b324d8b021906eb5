//! The orchestrator: the run's schedule and its only global view.
//!
//! The orchestrator is not an actor in a task of its own. Each driver plays
//! it: it opens a tick with [`Orchestrator::open_tick`], feeds it every
//! envelope addressed to [`Address::Orchestrator`], and when replies stop
//! coming calls [`Orchestrator::force`] to close whatever it is still waiting
//! for with the replies it has.
//!
//! # Per-tick plan
//!
//! | Phase | Sent at open | Waits for |
//! |---|---|---|
//! | pre-campaign | `Tick` to all | nothing |
//! | selection | `Tick`, then `StandingRequest` to every citizen | one `Standing` per citizen, then announces candidates |
//! | campaign | `Tick` to all; on report ticks `ReportRequest` to media and authority | both digests on report ticks |
//! | election day | `Tick`, then `StandingsRequest` to the authority | party standings, then one `TurnoutAck` per citizen, then `Results` |

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use hustings_agents::{Outbox, Tunables, select_candidates};
use hustings_types::{
    Address, CandidacyStanding, CandidateProfile, CoverageDigest, ElectionResult, Envelope,
    GazetteDigest, Phase, VoterId,
};

use crate::clock::{ClockError, ElectionClock};
use crate::config::ScheduleConfig;
use crate::error::SimulationError;

/// What the orchestrator is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Awaiting {
    /// Nothing; the tick can close.
    Nothing,
    /// Candidacy standings from every citizen.
    Standings,
    /// The gazette and the coverage digest.
    Digests {
        /// Gazette received.
        gazette: bool,
        /// Coverage digest received.
        coverage: bool,
    },
    /// Party reputations from the authority.
    PartyStandings,
    /// A turnout acknowledgement from every citizen.
    Turnout,
    /// The final count.
    Results,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Master seed.
    pub seed: u64,
    /// Candidates announced at selection, in announcement order.
    pub candidates: Vec<CandidateProfile>,
    /// Authority digests, in report order.
    pub gazettes: Vec<GazetteDigest>,
    /// Media digests, in report order.
    pub coverage: Vec<CoverageDigest>,
    /// Citizens that acknowledged handing in a ballot.
    pub turnout: u32,
    /// The final count.
    pub result: ElectionResult,
}

/// The schedule-keeping side of a run.
#[derive(Debug)]
pub struct Orchestrator {
    clock: ElectionClock,
    seed: u64,
    population: u32,
    tunables: Arc<Tunables>,
    awaiting: Awaiting,
    standings: BTreeMap<VoterId, CandidacyStanding>,
    candidates: Vec<CandidateProfile>,
    acks: BTreeSet<VoterId>,
    turnout: u32,
    gazettes: Vec<GazetteDigest>,
    coverage: Vec<CoverageDigest>,
    result: Option<ElectionResult>,
}

impl Orchestrator {
    /// An orchestrator at T0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidSchedule`] for an unusable schedule.
    pub fn new(
        schedule: &ScheduleConfig,
        seed: u64,
        population: u32,
        tunables: Arc<Tunables>,
    ) -> Result<Self, ClockError> {
        Ok(Self {
            clock: ElectionClock::new(schedule)?,
            seed,
            population,
            tunables,
            awaiting: Awaiting::Nothing,
            standings: BTreeMap::new(),
            candidates: Vec::new(),
            acks: BTreeSet::new(),
            turnout: 0,
            gazettes: Vec::new(),
            coverage: Vec::new(),
            result: None,
        })
    }

    /// The clock.
    pub const fn clock(&self) -> &ElectionClock {
        &self.clock
    }

    /// What is still outstanding for the current tick.
    pub const fn awaiting(&self) -> Awaiting {
        self.awaiting
    }

    /// Candidates announced so far.
    pub fn candidates(&self) -> &[CandidateProfile] {
        &self.candidates
    }

    /// The final count, once it has arrived.
    pub const fn result(&self) -> Option<&ElectionResult> {
        self.result.as_ref()
    }

    /// Move to the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Finished`] on election day.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        if self.awaiting != Awaiting::Nothing {
            warn!(tick = self.clock.tick(), awaiting = ?self.awaiting, "tick closed with replies outstanding");
            self.awaiting = Awaiting::Nothing;
        }
        self.clock.advance()
    }

    /// Send the opening messages of the current tick.
    pub fn open_tick(&mut self, outbox: &mut Outbox) {
        let tick = self.clock.tick();
        let phase = self.clock.phase();
        debug!(tick, %phase, "tick opened");

        outbox.send(Address::Media, Envelope::Tick { tick, phase });
        outbox.send(Address::Authority, Envelope::Tick { tick, phase });
        for voter in self.citizens() {
            outbox.send(Address::Voter(voter), Envelope::Tick { tick, phase });
        }

        match phase {
            Phase::PreCampaign => {}
            Phase::CandidateSelection => {
                self.standings.clear();
                self.awaiting = Awaiting::Standings;
                for voter in self.citizens() {
                    outbox.send(Address::Voter(voter), Envelope::StandingRequest { tick });
                }
            }
            Phase::Campaign => {
                if self.clock.is_report_tick(tick) {
                    let since = self.clock.report_window_start(tick);
                    self.awaiting = Awaiting::Digests {
                        gazette: false,
                        coverage: false,
                    };
                    outbox.send(Address::Authority, Envelope::ReportRequest { tick, since });
                    outbox.send(Address::Media, Envelope::ReportRequest { tick, since });
                }
            }
            Phase::ElectionDay => {
                self.awaiting = Awaiting::PartyStandings;
                outbox.send(Address::Authority, Envelope::StandingsRequest { tick });
            }
        }
    }

    /// Handle one envelope addressed to the orchestrator.
    pub fn receive(&mut self, envelope: Envelope, outbox: &mut Outbox) {
        match envelope {
            Envelope::Standing { standing } => {
                if self.awaiting != Awaiting::Standings {
                    debug!(voter = %standing.voter, "late standing dropped");
                    return;
                }
                self.standings.insert(standing.voter, standing);
                if self.standings.len() >= self.population_len() {
                    self.announce(outbox);
                }
            }
            Envelope::Gazette { digest } => {
                info!(
                    tick = digest.tick,
                    news = digest.news,
                    fake_news = digest.fake_news,
                    detected = digest.detected,
                    detection_rate = digest.detection_rate(),
                    "gazette published"
                );
                self.gazettes.push(digest);
                if let Awaiting::Digests { coverage, .. } = self.awaiting {
                    self.awaiting = if coverage {
                        Awaiting::Nothing
                    } else {
                        Awaiting::Digests {
                            gazette: true,
                            coverage,
                        }
                    };
                }
            }
            Envelope::MediaDigest { digest } => {
                info!(
                    tick = digest.tick,
                    leader = ?digest.leader,
                    spent = %digest.spent,
                    active_candidates = digest.active_candidates,
                    "coverage digest published"
                );
                self.coverage.push(digest);
                if let Awaiting::Digests { gazette, .. } = self.awaiting {
                    self.awaiting = if gazette {
                        Awaiting::Nothing
                    } else {
                        Awaiting::Digests {
                            gazette,
                            coverage: true,
                        }
                    };
                }
            }
            Envelope::Standings { tick, parties } => {
                if self.awaiting != Awaiting::PartyStandings {
                    debug!(tick, "late party standings dropped");
                    return;
                }
                self.acks.clear();
                self.turnout = 0;
                self.awaiting = Awaiting::Turnout;
                for voter in self.citizens() {
                    outbox.send(
                        Address::Voter(voter),
                        Envelope::VoteRequest {
                            tick,
                            reputations: parties.clone(),
                        },
                    );
                }
                if self.population == 0 {
                    self.start_count(outbox);
                }
            }
            Envelope::TurnoutAck { voter, voted } => {
                if self.awaiting != Awaiting::Turnout {
                    debug!(voter = %voter, "late turnout ack dropped");
                    return;
                }
                if self.acks.insert(voter) && voted {
                    self.turnout = self.turnout.saturating_add(1);
                }
                if self.acks.len() >= self.population_len() {
                    self.start_count(outbox);
                }
            }
            Envelope::Results { result } => {
                info!(
                    tick = result.tick,
                    valid = result.valid_votes,
                    null = result.null_votes,
                    abstentions = result.abstentions,
                    seats = result.seats_awarded(),
                    "results received"
                );
                self.result = Some(result);
                if self.awaiting == Awaiting::Results {
                    self.awaiting = Awaiting::Nothing;
                }
            }
            Envelope::Tick { .. }
            | Envelope::ProfileQuery { .. }
            | Envelope::ProfileReply { .. }
            | Envelope::StandingRequest { .. }
            | Envelope::CandidatesAnnounced { .. }
            | Envelope::Campaign { .. }
            | Envelope::Filing { .. }
            | Envelope::Sanction { .. }
            | Envelope::Elimination { .. }
            | Envelope::ReportRequest { .. }
            | Envelope::StandingsRequest { .. }
            | Envelope::VoteRequest { .. }
            | Envelope::Ballot { .. }
            | Envelope::StartCount { .. }
            | Envelope::Shutdown => {
                trace!(tag = envelope.tag(), "orchestrator dropped envelope");
            }
        }
    }

    /// Stop waiting and move on with what has arrived.
    pub fn force(&mut self, outbox: &mut Outbox) {
        match self.awaiting {
            Awaiting::Nothing => {}
            Awaiting::Standings => {
                warn!(
                    received = self.standings.len(),
                    expected = self.population,
                    "selecting candidates from partial standings"
                );
                self.announce(outbox);
            }
            Awaiting::Digests { gazette, coverage } => {
                warn!(gazette, coverage, "digest missing");
                self.awaiting = Awaiting::Nothing;
            }
            Awaiting::PartyStandings => {
                warn!("no party standings, voting on neutral reputations");
                self.receive(
                    Envelope::Standings {
                        tick: self.clock.tick(),
                        parties: Vec::new(),
                    },
                    outbox,
                );
            }
            Awaiting::Turnout => {
                warn!(
                    received = self.acks.len(),
                    expected = self.population,
                    "counting before every turnout ack arrived"
                );
                self.start_count(outbox);
            }
            Awaiting::Results => {
                warn!("no results from the authority");
                self.awaiting = Awaiting::Nothing;
            }
        }
    }

    /// Close the run.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NoFinalTally`] if no count arrived.
    pub fn finish(self) -> Result<RunOutcome, SimulationError> {
        let election_tick = self.clock.election_tick();
        let result = self
            .result
            .ok_or(SimulationError::NoFinalTally { election_tick })?;
        Ok(RunOutcome {
            seed: self.seed,
            candidates: self.candidates,
            gazettes: self.gazettes,
            coverage: self.coverage,
            turnout: self.turnout,
            result,
        })
    }

    fn announce(&mut self, outbox: &mut Outbox) {
        let tick = self.clock.tick();
        let standings = std::mem::take(&mut self.standings).into_values().collect();
        let candidates = select_candidates(standings, &self.tunables.selection);
        info!(tick, candidates = candidates.len(), "candidates selected");

        outbox.send(
            Address::Media,
            Envelope::CandidatesAnnounced {
                tick,
                candidates: candidates.clone(),
            },
        );
        outbox.send(
            Address::Authority,
            Envelope::CandidatesAnnounced {
                tick,
                candidates: candidates.clone(),
            },
        );
        for voter in self.citizens() {
            outbox.send(
                Address::Voter(voter),
                Envelope::CandidatesAnnounced {
                    tick,
                    candidates: candidates.clone(),
                },
            );
        }
        self.candidates = candidates;
        self.awaiting = Awaiting::Nothing;
    }

    fn start_count(&mut self, outbox: &mut Outbox) {
        let tick = self.clock.tick();
        debug!(tick, acks = self.acks.len(), turnout = self.turnout, "count requested");
        self.awaiting = Awaiting::Results;
        outbox.send(Address::Authority, Envelope::StartCount { tick });
    }

    fn citizens(&self) -> impl Iterator<Item = VoterId> + use<> {
        (0..self.population).map(VoterId::new)
    }

    fn population_len(&self) -> usize {
        usize::try_from(self.population).unwrap_or(usize::MAX)
    }
}
