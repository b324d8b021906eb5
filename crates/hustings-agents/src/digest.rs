//! Periodic digests over a window of campaign activity.
//!
//! The authority summarizes its event log into a [`GazetteDigest`]; the
//! media desk summarizes its own spend ledger into a [`CoverageDigest`].
//! Both are read models only and never feed back into the simulation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use hustings_types::{
    BlockCoverage, CampaignEvent, CoverageDigest, GazetteDigest, IdeologicalBlock, KeywordCount,
    NewsKind, Party, PartyStanding, SenderReach, VoterId,
};

/// First tick of a digest window of `width` ticks ending at `tick`,
/// never earlier than `first_campaign_tick`.
pub const fn window_start(first_campaign_tick: u64, tick: u64, width: u64) -> u64 {
    let start = tick.saturating_sub(width.saturating_sub(1));
    if start > first_campaign_tick { start } else { first_campaign_tick }
}

/// One paid campaign action as the media desk booked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendRecord {
    /// Tick of the action.
    pub tick: u64,
    /// Candidate that paid.
    pub sender: VoterId,
    /// The sender's party.
    pub party: Party,
    /// NEWS or FAKENEWS.
    pub kind: NewsKind,
    /// Citizens reached.
    pub reach: u32,
    /// Money spent.
    pub outlay: Decimal,
}

const fn in_window(tick: u64, since: u64, until: u64) -> bool {
    tick >= since && tick <= until
}

/// Summarize the authority's log over `[since, tick]`.
pub fn gazette(
    log: &[CampaignEvent],
    since: u64,
    tick: u64,
    reputations: Vec<PartyStanding>,
    top_keywords: u32,
    top_senders: u32,
) -> GazetteDigest {
    let mut keywords: BTreeMap<&str, u32> = BTreeMap::new();
    let mut senders: BTreeMap<VoterId, (Party, u64)> = BTreeMap::new();
    let (mut news, mut fake_news, mut detected) = (0u32, 0u32, 0u32);

    for event in log.iter().filter(|e| in_window(e.tick, since, tick)) {
        for k in &event.keywords {
            let count = keywords.entry(k.as_str()).or_insert(0);
            *count = count.saturating_add(1);
        }
        let entry = senders.entry(event.sender).or_insert((event.party, 0));
        entry.1 = entry.1.saturating_add(u64::from(event.reach));
        match event.kind {
            NewsKind::News => news = news.saturating_add(1),
            NewsKind::FakeNews => {
                fake_news = fake_news.saturating_add(1);
                if event.detected {
                    detected = detected.saturating_add(1);
                }
            }
        }
    }

    let mut top_k: Vec<KeywordCount> = keywords
        .into_iter()
        .map(|(keyword, count)| KeywordCount {
            keyword: keyword.to_owned(),
            count,
        })
        .collect();
    top_k.sort_by(|a, b| b.count.cmp(&a.count));
    top_k.truncate(usize::try_from(top_keywords).unwrap_or(usize::MAX));

    let mut top_s: Vec<SenderReach> = senders
        .into_iter()
        .map(|(sender, (party, reach))| SenderReach { sender, party, reach })
        .collect();
    top_s.sort_by(|a, b| b.reach.cmp(&a.reach));
    top_s.truncate(usize::try_from(top_senders).unwrap_or(usize::MAX));

    GazetteDigest {
        tick,
        window_start: since,
        window_end: tick,
        top_keywords: top_k,
        top_senders: top_s,
        reputations,
        news,
        fake_news,
        detected,
    }
}

/// Summarize the media desk's ledger over `[since, tick]`.
pub fn coverage(
    ledger: &[SpendRecord],
    since: u64,
    tick: u64,
    active_candidates: u32,
) -> CoverageDigest {
    let mut blocks: BTreeMap<IdeologicalBlock, (u32, u64)> =
        IdeologicalBlock::ALL.into_iter().map(|b| (b, (0, 0))).collect();
    let (mut news, mut fake_news) = (0u32, 0u32);
    let mut spent = Decimal::ZERO;

    for rec in ledger.iter().filter(|r| in_window(r.tick, since, tick)) {
        let entry = blocks.entry(rec.party.block()).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(1);
        entry.1 = entry.1.saturating_add(u64::from(rec.reach));
        match rec.kind {
            NewsKind::News => news = news.saturating_add(1),
            NewsKind::FakeNews => fake_news = fake_news.saturating_add(1),
        }
        spent = spent.saturating_add(rec.outlay);
    }

    let blocks: Vec<BlockCoverage> = blocks
        .into_iter()
        .map(|(block, (messages, reach))| BlockCoverage { block, messages, reach })
        .collect();
    let leader = blocks
        .iter()
        .filter(|b| b.reach > 0)
        .fold(None::<&BlockCoverage>, |best, b| match best {
            Some(cur) if cur.reach >= b.reach => Some(cur),
            _ => Some(b),
        })
        .map(|b| b.block);

    CoverageDigest {
        tick,
        window_start: since,
        window_end: tick,
        blocks,
        leader,
        news,
        fake_news,
        spent,
        active_candidates,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::campaign::keywords;

    fn event(tick: u64, sender: u32, party: Party, kind: NewsKind, detected: bool, reach: u32) -> CampaignEvent {
        CampaignEvent {
            tick,
            sender: VoterId::new(sender),
            party,
            kind,
            detected,
            reach,
            keywords: keywords(party, kind),
        }
    }

    #[test]
    fn window_clamps_to_campaign_start() {
        assert_eq!(window_start(11, 20, 10), 11);
        assert_eq!(window_start(11, 30, 10), 21);
        assert_eq!(window_start(11, 5, 10), 11);
    }

    #[test]
    fn gazette_counts_only_the_window() {
        let log = vec![
            event(11, 1, Party::Ped, NewsKind::FakeNews, true, 400),
            event(12, 2, Party::Pdd, NewsKind::News, false, 100),
            event(12, 1, Party::Ped, NewsKind::FakeNews, false, 300),
            event(25, 3, Party::Pee, NewsKind::News, false, 999),
        ];
        let g = gazette(&log, 11, 20, Vec::new(), 8, 5);
        assert_eq!((g.news, g.fake_news, g.detected), (1, 2, 1));
        assert!((g.detection_rate() - 0.5).abs() < 1e-12);
        let first = g.top_senders.first().map(|s| (s.sender, s.reach));
        assert_eq!(first, Some((VoterId::new(1), 700)));
        assert_eq!(g.top_senders.len(), 2);
        let top = g.top_keywords.first().map(|k| (k.keyword.as_str(), k.count));
        assert_eq!(top, Some(("#campaign", 3)));
        assert!(g.top_keywords.len() <= 8);
    }

    #[test]
    fn coverage_splits_by_block() {
        let ledger = vec![
            SpendRecord { tick: 11, sender: VoterId::new(1), party: Party::Pde, kind: NewsKind::News, reach: 40, outlay: dec!(400) },
            SpendRecord { tick: 11, sender: VoterId::new(2), party: Party::Ped, kind: NewsKind::FakeNews, reach: 60, outlay: dec!(290) },
            SpendRecord { tick: 12, sender: VoterId::new(3), party: Party::Spd, kind: NewsKind::News, reach: 10, outlay: dec!(100) },
        ];
        let c = coverage(&ledger, 11, 20, 3);
        assert_eq!(c.leader, Some(IdeologicalBlock::Right));
        assert_eq!(c.spent, dec!(790));
        let left = c.blocks.iter().find(|b| b.block == IdeologicalBlock::Left).map(|b| b.reach);
        assert_eq!(left, Some(40));
        assert_eq!((c.news, c.fake_news), (2, 1));
    }

    #[test]
    fn empty_window_has_no_leader() {
        let c = coverage(&[], 11, 20, 0);
        assert_eq!(c.leader, None);
        assert_eq!(c.blocks.len(), 3);
    }
}
