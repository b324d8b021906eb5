//! Task-per-actor driver on `tokio`.
//!
//! Every actor runs in its own task and owns its state outright. Envelopes
//! travel over unbounded `mpsc` channels registered in a [`PostOffice`]; no
//! actor ever touches another's state. The orchestrator runs in the calling
//! task: it sleeps between ticks, waits for replies with a bounded timeout,
//! and shuts every actor down with [`Envelope::Shutdown`] after the count or
//! when the wall-clock budget runs out.
//!
//! There is no global barrier. Within one inbox delivery is FIFO, so a
//! citizen always sees a tick before the requests sent after it, but the
//! authority may file a digest before the media desk's last filings of the
//! same tick arrive. That lag is part of the model.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use hustings_agents::{Actor, Authority, Letter, Outbox};
use hustings_types::{Address, Envelope, ProtocolError};

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::orchestrator::{Awaiting, Orchestrator};
use crate::report::ElectionReport;
use crate::setup;

/// Routes envelopes to actor inboxes by address.
pub struct PostOffice {
    orchestrator: UnboundedSender<Envelope>,
    media: UnboundedSender<Envelope>,
    authority: UnboundedSender<Envelope>,
    voters: Vec<UnboundedSender<Envelope>>,
}

impl PostOffice {
    /// Deliver one letter. Returns `false` if the address is unknown or its
    /// actor has stopped.
    pub fn deliver(&self, letter: Letter) -> bool {
        let Letter { to, envelope } = letter;
        let inbox = match to {
            Address::Orchestrator => Some(&self.orchestrator),
            Address::Media => Some(&self.media),
            Address::Authority => Some(&self.authority),
            Address::Voter(id) => self.voters.get(id.index()),
        };
        let Some(inbox) = inbox else {
            debug!(to = %to, tag = envelope.tag(), "no such address");
            return false;
        };
        if inbox.send(envelope).is_err() {
            debug!(to = %to, "inbox closed, envelope dropped");
            return false;
        }
        true
    }

    /// Deliver everything in `outbox`.
    pub fn deliver_all(&self, outbox: &mut Outbox) {
        for letter in outbox.drain() {
            self.deliver(letter);
        }
    }

    /// Decode a raw wire payload and deliver it to `to`.
    ///
    /// # Errors
    ///
    /// Returns the [`ProtocolError`] if the payload does not decode; nothing
    /// is delivered in that case.
    pub fn post_raw(&self, to: Address, payload: &str) -> Result<(), ProtocolError> {
        let envelope = Envelope::decode(payload).inspect_err(|err| {
            debug!(to = %to, error = %err, "malformed payload dropped");
        })?;
        self.deliver(Letter { to, envelope });
        Ok(())
    }

    /// Tell every actor task to stop.
    pub fn shutdown(&self) {
        let actors = [&self.media, &self.authority]
            .into_iter()
            .chain(self.voters.iter());
        for inbox in actors {
            let _closed = inbox.send(Envelope::Shutdown);
        }
    }
}

/// Spawn `actor` on its own task. The task hands the actor back when it stops.
fn spawn_actor<A>(
    mut actor: A,
    mut inbox: UnboundedReceiver<Envelope>,
    post: Arc<PostOffice>,
) -> JoinHandle<A>
where
    A: Actor + 'static,
{
    tokio::spawn(async move {
        let mut outbox = Outbox::new();
        while let Some(envelope) = inbox.recv().await {
            if matches!(envelope, Envelope::Shutdown) {
                break;
            }
            actor.handle(envelope, &mut outbox);
            post.deliver_all(&mut outbox);
        }
        debug!(address = %actor.address(), "actor stopped");
        actor
    })
}

/// Run an election on the actor runtime and build its report.
///
/// # Errors
///
/// Returns [`SimulationError::NoFinalTally`] if no count arrived before the
/// wall-clock budget ran out or election day ended, or a setup error.
pub async fn run(config: &SimulationConfig) -> Result<ElectionReport, SimulationError> {
    let cast = setup::assemble(config)?;
    let mut orchestrator = Orchestrator::new(
        &config.schedule,
        config.seed,
        cast.population(),
        Arc::clone(&cast.tunables),
    )?;

    let (orchestrator_tx, mut orchestrator_rx) = mpsc::unbounded_channel();
    let (media_tx, media_rx) = mpsc::unbounded_channel();
    let (authority_tx, authority_rx) = mpsc::unbounded_channel();
    let (voter_txs, voter_rxs): (Vec<_>, Vec<_>) = cast
        .voters
        .iter()
        .map(|_| mpsc::unbounded_channel())
        .unzip();

    let post = Arc::new(PostOffice {
        orchestrator: orchestrator_tx,
        media: media_tx,
        authority: authority_tx,
        voters: voter_txs,
    });

    let media = spawn_actor(cast.media, media_rx, Arc::clone(&post));
    let authority: JoinHandle<Authority> =
        spawn_actor(cast.authority, authority_rx, Arc::clone(&post));
    let voters: Vec<_> = cast
        .voters
        .into_iter()
        .zip(voter_rxs)
        .map(|(voter, rx)| spawn_actor(voter, rx, Arc::clone(&post)))
        .collect();

    let schedule = &config.schedule;
    let tick_interval = Duration::from_millis(schedule.tick_interval_ms);
    let reply_timeout = Duration::from_millis(schedule.reply_timeout_ms);
    let deadline = Instant::now()
        .checked_add(Duration::from_secs(schedule.max_real_time_seconds))
        .unwrap_or_else(Instant::now);

    info!(
        seed = config.seed,
        voters = voters.len(),
        election_tick = orchestrator.clock().election_tick(),
        "actor runtime started"
    );

    'ticks: loop {
        let tick = orchestrator.clock().tick();
        if Instant::now() >= deadline {
            warn!(tick, "wall-clock budget exhausted");
            break;
        }
        let mut outbox = Outbox::new();
        orchestrator.open_tick(&mut outbox);
        post.deliver_all(&mut outbox);

        while orchestrator.awaiting() != Awaiting::Nothing {
            if Instant::now() >= deadline {
                warn!(tick, "wall-clock budget exhausted");
                break 'ticks;
            }
            match timeout(reply_timeout, orchestrator_rx.recv()).await {
                Ok(Some(envelope)) => orchestrator.receive(envelope, &mut outbox),
                Ok(None) => break 'ticks,
                Err(_elapsed) => {
                    warn!(tick, awaiting = ?orchestrator.awaiting(), "reply timeout");
                    orchestrator.force(&mut outbox);
                }
            }
            post.deliver_all(&mut outbox);
        }

        if orchestrator.clock().is_terminal() {
            break;
        }
        orchestrator.advance()?;
        if !tick_interval.is_zero() {
            sleep(tick_interval).await;
        }
    }

    post.shutdown();
    for voter in join_all(voters).await {
        voter?;
    }
    media.await?;
    let authority = authority.await?;

    let outcome = orchestrator.finish()?;
    Ok(ElectionReport::new(outcome, authority.log().to_vec()))
}
