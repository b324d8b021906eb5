//! Per-candidate campaign memory.
//!
//! A citizen remembers the last few impacts each candidate's messages had on
//! it. The window is tiny (two by default), so old impressions are pushed out
//! quickly and the signal read at the ballot box is recent, noisy buzz rather
//! than a running total.
//!
//! # Invariants
//!
//! - No candidate ever holds more than `window` impacts.
//! - When a full window receives a new impact, the oldest one is evicted.

use std::collections::{BTreeMap, VecDeque};

use hustings_types::{Party, VoterId};

#[derive(Debug, Clone, PartialEq)]
struct Trace {
    party: Party,
    impacts: VecDeque<f64>,
}

impl Trace {
    fn mean(&self) -> Option<f64> {
        if self.impacts.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.impacts.len() as f64;
        Some(self.impacts.iter().sum::<f64>() / n)
    }
}

/// Sliding-window impact history keyed by candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignMemory {
    window: usize,
    traces: BTreeMap<VoterId, Trace>,
}

impl CampaignMemory {
    /// Empty memory keeping at most `window` impacts per candidate.
    pub fn new(window: u32) -> Self {
        Self {
            window: usize::try_from(window.max(1)).unwrap_or(1),
            traces: BTreeMap::new(),
        }
    }

    /// Remember one impact from `candidate`, evicting the oldest if full.
    pub fn record(&mut self, candidate: VoterId, party: Party, impact: f64) {
        let window = self.window;
        let trace = self.traces.entry(candidate).or_insert_with(|| Trace {
            party,
            impacts: VecDeque::with_capacity(window),
        });
        while trace.impacts.len() >= window {
            trace.impacts.pop_front();
        }
        trace.impacts.push_back(impact);
    }

    /// Impacts remembered for `candidate`, oldest first.
    pub fn impacts(&self, candidate: VoterId) -> Vec<f64> {
        self.traces
            .get(&candidate)
            .map(|t| t.impacts.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Mean remembered impact of `candidate`, if any.
    pub fn buzz(&self, candidate: VoterId) -> Option<f64> {
        self.traces.get(&candidate).and_then(Trace::mean)
    }

    /// Mean buzz over every remembered candidate of `party`, if any.
    pub fn party_buzz(&self, party: Party) -> Option<f64> {
        let (sum, n) = self
            .traces
            .values()
            .filter(|t| t.party == party)
            .filter_map(Trace::mean)
            .fold((0.0, 0u32), |(s, n), m| (s + m, n.saturating_add(1)));
        (n > 0).then(|| sum / f64::from(n))
    }

    /// The candidate of `party` with the highest positive buzz.
    ///
    /// Ties go to the lowest candidate id.
    pub fn strongest(&self, party: Party) -> Option<VoterId> {
        let mut best: Option<(VoterId, f64)> = None;
        for (&id, trace) in &self.traces {
            if trace.party != party {
                continue;
            }
            let Some(buzz) = trace.mean() else { continue };
            if buzz <= 0.0 {
                continue;
            }
            if best.is_none_or(|(_, b)| buzz > b) {
                best = Some((id, buzz));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Number of candidates remembered.
    pub fn candidates(&self) -> usize {
        self.traces.len()
    }
}
