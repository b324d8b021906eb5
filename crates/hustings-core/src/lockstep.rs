//! Deterministic single-threaded driver.
//!
//! Every actor lives in one struct and every letter goes through one FIFO
//! queue. After the orchestrator opens a tick the queue is drained until no
//! actor has anything left to say; only then does the tick close. Delivery
//! order is therefore a pure function of the seed, and two runs with the
//! same configuration produce the same result bit for bit.

use std::collections::VecDeque;

use tracing::{debug, info};

use hustings_agents::{Actor, Authority, Letter, MediaDesk, Outbox, Voter};
use hustings_types::{Address, Envelope, ProtocolError, VoterId};

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::orchestrator::{Awaiting, Orchestrator, RunOutcome};
use crate::report::ElectionReport;
use crate::setup::{self, Cast};

/// A run driven in lockstep.
pub struct Lockstep {
    voters: Vec<Voter>,
    media: MediaDesk,
    authority: Authority,
    orchestrator: Orchestrator,
    queue: VecDeque<Letter>,
    delivered: u64,
}

impl Lockstep {
    /// Assemble a run from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the cast or the clock cannot be built.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let cast = setup::assemble(config)?;
        let orchestrator = Orchestrator::new(
            &config.schedule,
            config.seed,
            cast.population(),
            std::sync::Arc::clone(&cast.tunables),
        )?;
        Ok(Self::from_parts(cast, orchestrator))
    }

    /// Drive an already assembled cast.
    pub fn from_parts(cast: Cast, orchestrator: Orchestrator) -> Self {
        Self {
            voters: cast.voters,
            media: cast.media,
            authority: cast.authority,
            orchestrator,
            queue: VecDeque::new(),
            delivered: 0,
        }
    }

    /// Run every remaining tick and close the run.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NoFinalTally`] if election day produced no count.
    pub fn run(mut self) -> Result<RunOutcome, SimulationError> {
        while self.step()? {}
        info!(delivered = self.delivered, "lockstep run finished");
        self.orchestrator.finish()
    }

    /// Run every remaining tick and build the report.
    ///
    /// # Errors
    ///
    /// Same as [`Lockstep::run`].
    pub fn run_with_report(mut self) -> Result<ElectionReport, SimulationError> {
        while self.step()? {}
        let events = self.authority.log().to_vec();
        let outcome = self.orchestrator.finish()?;
        Ok(ElectionReport::new(outcome, events))
    }

    /// Play the current tick to quiescence.
    ///
    /// Returns `false` once election day has been played.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Clock`] if the clock cannot advance.
    pub fn step(&mut self) -> Result<bool, SimulationError> {
        let mut outbox = Outbox::new();
        self.orchestrator.open_tick(&mut outbox);
        self.queue.extend(outbox.drain());
        self.settle();

        while self.orchestrator.awaiting() != Awaiting::Nothing {
            let mut outbox = Outbox::new();
            self.orchestrator.force(&mut outbox);
            if outbox.is_empty() && self.orchestrator.awaiting() != Awaiting::Nothing {
                break;
            }
            self.queue.extend(outbox.drain());
            self.settle();
        }

        if self.orchestrator.clock().is_terminal() {
            return Ok(false);
        }
        self.orchestrator.advance()?;
        Ok(true)
    }

    /// Decode a raw wire payload and deliver it to `to`.
    ///
    /// A payload that does not decode is dropped before it reaches any actor.
    ///
    /// # Errors
    ///
    /// Returns the [`ProtocolError`] that caused the drop.
    pub fn post_raw(&mut self, to: Address, payload: &str) -> Result<(), ProtocolError> {
        let envelope = Envelope::decode(payload).inspect_err(|err| {
            debug!(to = %to, error = %err, "malformed payload dropped");
        })?;
        self.queue.push_back(Letter { to, envelope });
        self.settle();
        Ok(())
    }

    /// The orchestrator.
    pub const fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// The citizen with `id`.
    pub fn voter(&self, id: VoterId) -> Option<&Voter> {
        self.voters.get(id.index())
    }

    /// Every citizen, in id order.
    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    /// The media desk.
    pub const fn media(&self) -> &MediaDesk {
        &self.media
    }

    /// The authority.
    pub const fn authority(&self) -> &Authority {
        &self.authority
    }

    fn settle(&mut self) {
        let mut outbox = Outbox::new();
        while let Some(Letter { to, envelope }) = self.queue.pop_front() {
            self.delivered = self.delivered.saturating_add(1);
            match to {
                Address::Orchestrator => self.orchestrator.receive(envelope, &mut outbox),
                Address::Media => self.media.handle(envelope, &mut outbox),
                Address::Authority => self.authority.handle(envelope, &mut outbox),
                Address::Voter(id) => match self.voters.get_mut(id.index()) {
                    Some(voter) => voter.handle(envelope, &mut outbox),
                    None => debug!(voter = %id, tag = envelope.tag(), "no such citizen"),
                },
            }
            self.queue.extend(outbox.drain());
        }
    }
}
