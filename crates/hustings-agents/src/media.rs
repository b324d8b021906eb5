//! The media desk: runs every candidate's campaign.
//!
//! One actor owns all campaign accounts (budget, Q-table, propensity) and
//! walks them in ranking order each campaign tick. It learns about
//! detections only through the authority's sanction and elimination
//! notices, which arrive asynchronously; its own budget figures are never
//! corrected by the authority's penalties, so the two ledgers may diverge.
//!
//! # Invariants
//!
//! - A budget never goes negative: an unaffordable action is skipped whole.
//! - An eliminated candidate is never visited again.
//! - Each campaign tick runs at most once, however many times it is announced.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rust_decimal::Decimal;
use tracing::{debug, info, trace};

use hustings_types::{
    Address, BudgetState, CampaignEvent, CandidateProfile, Envelope, NewsKind, Phase, VoterId,
};

use crate::campaign;
use crate::config::Tunables;
use crate::digest::{self, SpendRecord};
use crate::mailbox::{Actor, Outbox};
use crate::policy::{self, QTable};
use crate::seed::actor_rng;

/// One candidate's campaign as the media desk sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignAccount {
    /// Who the account belongs to.
    pub profile: CandidateProfile,
    /// Money left.
    pub budget: Decimal,
    /// Learned action values.
    pub q: QTable,
    /// Current FAKENEWS propensity.
    pub propensity: f64,
    /// Budget state of the most recent FAKENEWS action.
    pub last_fake_state: Option<BudgetState>,
    /// Sanctions received.
    pub sanctions: u32,
    /// Whether the authority has removed the candidate.
    pub eliminated: bool,
    /// Total citizens reached.
    pub reach: u64,
}

impl CampaignAccount {
    fn open(profile: CandidateProfile, budget: Decimal) -> Self {
        Self {
            profile,
            budget,
            q: QTable::new(),
            propensity: profile.fake_propensity,
            last_fake_state: None,
            sanctions: 0,
            eliminated: false,
            reach: 0,
        }
    }
}

/// What happened to one candidate in one campaign round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The message went out.
    Sent {
        /// Action taken.
        kind: NewsKind,
        /// Citizens reached.
        reach: u32,
    },
    /// Not even one target was affordable.
    Skipped,
}

/// The media desk actor.
pub struct MediaDesk {
    accounts: BTreeMap<VoterId, CampaignAccount>,
    rotation: Vec<VoterId>,
    citizens: Vec<VoterId>,
    tunables: Arc<Tunables>,
    rng: StdRng,
    last_round: Option<u64>,
    ledger: Vec<SpendRecord>,
}

impl MediaDesk {
    /// A desk serving a population of `population` citizens.
    pub fn new(population: u32, tunables: Arc<Tunables>, seed: u64) -> Self {
        Self {
            accounts: BTreeMap::new(),
            rotation: Vec::new(),
            citizens: (0..population).map(VoterId::new).collect(),
            tunables,
            rng: actor_rng(seed, Address::Media),
            last_round: None,
            ledger: Vec::new(),
        }
    }

    /// Open an account per candidate. Later announcements are ignored.
    pub fn open_accounts(&mut self, candidates: &[CandidateProfile]) {
        if !self.accounts.is_empty() {
            return;
        }
        let budget = self.tunables.campaign.budget;
        for c in candidates {
            if self.accounts.contains_key(&c.id) {
                continue;
            }
            self.accounts.insert(c.id, CampaignAccount::open(*c, budget));
            self.rotation.push(c.id);
        }
        info!(candidates = self.rotation.len(), %budget, "campaign accounts opened");
    }

    /// The account of `candidate`.
    pub fn account(&self, candidate: VoterId) -> Option<&CampaignAccount> {
        self.accounts.get(&candidate)
    }

    /// Candidates that will be visited next round, in order.
    pub fn active_rotation(&self) -> Vec<VoterId> {
        self.rotation
            .iter()
            .copied()
            .filter(|id| self.accounts.get(id).is_some_and(|a| !a.eliminated))
            .collect()
    }

    /// Every action booked so far.
    pub fn ledger(&self) -> &[SpendRecord] {
        &self.ledger
    }

    /// Run one campaign round for `tick`. A repeated or stale tick is ignored.
    pub fn run_round(&mut self, tick: u64, outbox: &mut Outbox) -> Vec<(VoterId, RoundOutcome)> {
        if self.last_round.is_some_and(|t| t >= tick) {
            return Vec::new();
        }
        self.last_round = Some(tick);
        let order = self.active_rotation();
        let mut outcomes = Vec::with_capacity(order.len());
        for id in order {
            if let Some(outcome) = self.campaign_for(id, tick, outbox) {
                outcomes.push((id, outcome));
            }
        }
        outcomes
    }

    fn campaign_for(&mut self, id: VoterId, tick: u64, outbox: &mut Outbox) -> Option<RoundOutcome> {
        let cfg = Arc::clone(&self.tunables);
        let account = self.accounts.get_mut(&id)?;
        if account.eliminated || account.budget <= Decimal::ZERO {
            return None;
        }
        let initial = cfg.campaign.budget;
        let state = campaign::budget_state(account.budget, initial, &cfg.campaign);
        let kind = policy::choose_action(&cfg.policy, &account.q, state, account.propensity, &mut self.rng);
        let (cost, penalty) = campaign::price(kind, &cfg.campaign);

        if campaign::affordable_targets(account.budget, cost, penalty, 1) == 0 {
            debug!(tick, candidate = %id, %kind, budget = %account.budget, "campaign skipped, budget too low");
            return Some(RoundOutcome::Skipped);
        }

        let eligible: Vec<VoterId> = self.citizens.iter().copied().filter(|&c| c != id).collect();
        let mut targets = campaign::draw_audience(&eligible, kind, &cfg.campaign, &mut self.rng);
        let n = campaign::affordable_targets(account.budget, cost, penalty, targets.len());
        targets.truncate(n);
        if targets.is_empty() {
            debug!(tick, candidate = %id, %kind, "campaign skipped, empty audience");
            return Some(RoundOutcome::Skipped);
        }

        let spent = campaign::outlay(cost, penalty, targets.len());
        account.budget = account.budget.saturating_sub(spent).max(Decimal::ZERO);
        let reach = u32::try_from(targets.len()).unwrap_or(u32::MAX);
        account.reach = account.reach.saturating_add(u64::from(reach));
        let party = account.profile.party;

        for &target in &targets {
            outbox.send(
                Address::Voter(target),
                Envelope::Campaign {
                    tick,
                    sender: id,
                    party,
                    kind,
                },
            );
        }
        outbox.send(
            Address::Authority,
            Envelope::Filing {
                event: CampaignEvent {
                    tick,
                    sender: id,
                    party,
                    kind,
                    detected: false,
                    reach,
                    keywords: campaign::keywords(party, kind),
                },
                outlay: spent,
            },
        );

        let reward = campaign::reward(targets.len(), self.citizens.len(), spent, initial, cfg.policy.lambda);
        let weighted = reward * policy::bias_weight(cfg.policy.bias, cfg.policy.bias_strength, party);
        let next = campaign::budget_state(account.budget, initial, &cfg.campaign);
        let q = account
            .q
            .update(state, kind, weighted, next, cfg.policy.alpha, cfg.policy.gamma);
        if kind == NewsKind::FakeNews {
            account.last_fake_state = Some(state);
        }
        trace!(tick, candidate = %id, %kind, reach, %spent, reward = weighted, q, "campaign action");

        self.ledger.push(SpendRecord {
            tick,
            sender: id,
            party,
            kind,
            reach,
            outlay: spent,
        });
        Some(RoundOutcome::Sent { kind, reach })
    }

    fn sanction(&mut self, candidate: VoterId) {
        let cfg = &self.tunables.policy;
        let Some(account) = self.accounts.get_mut(&candidate) else {
            trace!(candidate = %candidate, "sanction for unknown candidate dropped");
            return;
        };
        let party = account.profile.party;
        if let Some(state) = account.last_fake_state {
            account
                .q
                .dampen(state, NewsKind::FakeNews, policy::dampening_factor(cfg, party));
        }
        account.propensity = policy::lowered_propensity(cfg, party, account.propensity);
        account.sanctions = account.sanctions.saturating_add(1);
        debug!(candidate = %candidate, %party, sanctions = account.sanctions, "sanction applied to policy");
    }

    fn eliminate(&mut self, candidate: VoterId) {
        if let Some(account) = self.accounts.get_mut(&candidate) {
            if !account.eliminated {
                account.eliminated = true;
                info!(candidate = %candidate, party = %account.profile.party, "candidate dropped from rotation");
            }
        }
    }
}

impl Actor for MediaDesk {
    fn address(&self) -> Address {
        Address::Media
    }

    fn handle(&mut self, envelope: Envelope, outbox: &mut Outbox) {
        match envelope {
            Envelope::CandidatesAnnounced { candidates, .. } => self.open_accounts(&candidates),
            Envelope::Tick { tick, phase } => {
                if phase == Phase::Campaign {
                    self.run_round(tick, outbox);
                }
            }
            Envelope::Sanction { candidate, .. } => self.sanction(candidate),
            Envelope::Elimination { candidate, .. } => self.eliminate(candidate),
            Envelope::ReportRequest { tick, since } => {
                let active = u32::try_from(self.active_rotation().len()).unwrap_or(u32::MAX);
                outbox.send(
                    Address::Orchestrator,
                    Envelope::MediaDigest {
                        digest: digest::coverage(&self.ledger, since, tick, active),
                    },
                );
            }
            Envelope::ProfileQuery { .. }
            | Envelope::ProfileReply { .. }
            | Envelope::StandingRequest { .. }
            | Envelope::Standing { .. }
            | Envelope::Campaign { .. }
            | Envelope::Filing { .. }
            | Envelope::MediaDigest { .. }
            | Envelope::Gazette { .. }
            | Envelope::StandingsRequest { .. }
            | Envelope::Standings { .. }
            | Envelope::VoteRequest { .. }
            | Envelope::Ballot { .. }
            | Envelope::TurnoutAck { .. }
            | Envelope::StartCount { .. }
            | Envelope::Results { .. }
            | Envelope::Shutdown => {
                trace!(tag = envelope.tag(), "media desk dropped envelope");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hustings_types::Party;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::{PolicyConfig, PolicyMode};

    fn profile(id: u32, party: Party) -> CandidateProfile {
        CandidateProfile {
            id: VoterId::new(id),
            party,
            reputation: 0.6,
            fake_propensity: 0.25,
        }
    }

    fn desk(mode: PolicyMode) -> MediaDesk {
        let tunables = Tunables {
            policy: PolicyConfig {
                mode,
                ..PolicyConfig::default()
            },
            ..Tunables::default()
        };
        let mut d = MediaDesk::new(100, Arc::new(tunables), 7);
        d.open_accounts(&[profile(1, Party::Pdd), profile(2, Party::Ped), profile(3, Party::Pee)]);
        d
    }

    #[test]
    fn budgets_never_increase_and_never_go_negative() {
        let mut d = desk(PolicyMode::QLearning);
        let mut out = Outbox::new();
        let mut last: Vec<Decimal> = (1..=3).map(|i| d.account(VoterId::new(i)).unwrap().budget).collect();
        for tick in 11..=50 {
            d.run_round(tick, &mut out);
            out.drain();
            for (i, prev) in (1..=3).zip(last.iter_mut()) {
                let now = d.account(VoterId::new(i)).unwrap().budget;
                assert!(now <= *prev);
                assert!(now >= Decimal::ZERO);
                *prev = now;
            }
        }
    }

    #[test]
    fn a_round_sends_campaign_letters_and_one_filing_per_candidate() {
        let mut d = desk(PolicyMode::ManualRatios { news: 1.0, fake: 0.0 });
        let mut out = Outbox::new();
        let outcomes = d.run_round(11, &mut out);
        assert_eq!(outcomes.len(), 3);
        let filings = out
            .letters()
            .iter()
            .filter(|l| l.to == Address::Authority)
            .count();
        assert_eq!(filings, 3);
        for (id, outcome) in outcomes {
            let RoundOutcome::Sent { kind, reach } = outcome else {
                panic!("expected a send for {id}");
            };
            assert_eq!(kind, NewsKind::News);
            assert!(reach >= 39);
            let budget = d.account(id).unwrap().budget;
            assert_eq!(budget, dec!(1000) - Decimal::from(reach) * dec!(10));
        }
        assert!(out
            .letters()
            .iter()
            .all(|l| !matches!(l.envelope, Envelope::Campaign { sender, .. } if l.to == Address::Voter(sender))));
    }

    #[test]
    fn repeated_tick_runs_once() {
        let mut d = desk(PolicyMode::QLearning);
        let mut out = Outbox::new();
        d.run_round(11, &mut out);
        let first = out.len();
        d.run_round(11, &mut out);
        d.run_round(10, &mut out);
        assert_eq!(out.len(), first);
    }

    #[test]
    fn eliminated_candidates_leave_the_rotation() {
        let mut d = desk(PolicyMode::QLearning);
        let mut out = Outbox::new();
        d.handle(Envelope::Elimination { tick: 12, candidate: VoterId::new(2) }, &mut out);
        assert_eq!(d.active_rotation(), vec![VoterId::new(1), VoterId::new(3)]);
        let outcomes = d.run_round(13, &mut out);
        assert!(outcomes.iter().all(|(id, _)| *id != VoterId::new(2)));
    }

    #[test]
    fn broke_candidates_are_skipped_without_spending() {
        let mut d = desk(PolicyMode::ManualRatios { news: 0.0, fake: 1.0 });
        if let Some(a) = d.accounts.get_mut(&VoterId::new(1)) {
            a.budget = dec!(52);
        }
        let mut out = Outbox::new();
        let outcomes = d.run_round(11, &mut out);
        let first = outcomes.iter().find(|(id, _)| *id == VoterId::new(1)).map(|(_, o)| *o);
        assert_eq!(first, Some(RoundOutcome::Skipped));
        assert_eq!(d.account(VoterId::new(1)).unwrap().budget, dec!(52));
        assert!(out.letters().iter().all(|l| !matches!(
            l.envelope,
            Envelope::Campaign { sender, .. } if sender == VoterId::new(1)
        )));
    }

    #[test]
    fn sanction_dampens_fake_value_and_propensity() {
        let mut d = desk(PolicyMode::ManualRatios { news: 0.0, fake: 1.0 });
        let mut out = Outbox::new();
        d.run_round(11, &mut out);
        let before = d.account(VoterId::new(1)).unwrap().clone();
        let state = before.last_fake_state.unwrap();
        d.handle(
            Envelope::Sanction {
                tick: 11,
                candidate: VoterId::new(1),
                punishments: 1,
                penalty: dec!(100),
            },
            &mut out,
        );
        let after = d.account(VoterId::new(1)).unwrap();
        let expected = before.q.value(state, NewsKind::FakeNews) * 0.5;
        assert!((after.q.value(state, NewsKind::FakeNews) - expected).abs() < 1e-12);
        assert!((after.propensity - 0.15).abs() < 1e-12);
        assert_eq!(after.budget, before.budget);
    }

    #[test]
    fn digest_reports_active_candidates() {
        let mut d = desk(PolicyMode::QLearning);
        let mut out = Outbox::new();
        d.run_round(11, &mut out);
        out.drain();
        d.handle(Envelope::ReportRequest { tick: 20, since: 11 }, &mut out);
        let Some(Envelope::MediaDigest { digest }) = out.letters().first().map(|l| l.envelope.clone()) else {
            panic!("expected a media digest");
        };
        assert_eq!(digest.active_candidates, 3);
        assert_eq!(digest.news + digest.fake_news, 3);
    }
}
