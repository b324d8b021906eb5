//! The seam every actor implements.
//!
//! An actor owns its state and reacts to one [`Envelope`] at a time. It
//! never calls another actor; it writes [`Letter`]s to an [`Outbox`] that
//! the driver delivers afterwards. The same actor code therefore runs under
//! the deterministic lockstep driver and under the task-per-actor runtime.

use hustings_types::{Address, Envelope};

/// An envelope with its destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Letter {
    /// Where it goes.
    pub to: Address,
    /// What it carries.
    pub envelope: Envelope,
}

/// Letters produced while handling one envelope, in send order.
#[derive(Debug, Default)]
pub struct Outbox {
    letters: Vec<Letter>,
}

impl Outbox {
    /// An empty outbox.
    pub const fn new() -> Self {
        Self {
            letters: Vec::new(),
        }
    }

    /// Queue `envelope` for `to`.
    pub fn send(&mut self, to: Address, envelope: Envelope) {
        self.letters.push(Letter { to, envelope });
    }

    /// Take every queued letter, leaving the outbox empty.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Letter> {
        self.letters.drain(..)
    }

    /// Queued letters.
    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    /// Number of queued letters.
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

/// A single-writer unit of state driven by messages.
pub trait Actor: Send {
    /// The mailbox this actor reads.
    fn address(&self) -> Address;

    /// React to one envelope.
    ///
    /// Handlers must tolerate duplicates and stale ticks, and must leave
    /// their state untouched for variants their role does not consume.
    fn handle(&mut self, envelope: Envelope, outbox: &mut Outbox);
}
