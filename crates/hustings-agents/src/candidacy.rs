//! Candidate ranking at the selection cut-off.
//!
//! Every citizen reports a [`CandidacyStanding`]; the top-scoring ones are
//! promoted. Scores are sorted with a stable sort over standings ordered by
//! citizen id, so exact ties go to the lower id. That tie-break is arbitrary
//! but reproducible: the same seed always promotes the same citizens.

use hustings_types::{CandidacyStanding, CandidateProfile};

use crate::config::SelectionConfig;

/// Ranking score of one citizen.
pub fn candidate_score(standing: &CandidacyStanding, cfg: &SelectionConfig) -> f64 {
    let degree = if cfg.degree_normalizer > 0.0 {
        f64::from(standing.degree) / cfg.degree_normalizer
    } else {
        0.0
    };
    cfg.involvement_weight.mul_add(
        standing.involvement,
        cfg.persuasion_weight
            .mul_add(standing.persuasion, cfg.degree_weight * degree),
    )
}

/// Promote the top `cfg.candidates` citizens, best first.
///
/// Input order does not matter; duplicates of the same citizen keep only the
/// first standing received.
pub fn select_candidates(
    mut standings: Vec<CandidacyStanding>,
    cfg: &SelectionConfig,
) -> Vec<CandidateProfile> {
    standings.sort_by_key(|s| s.voter);
    standings.dedup_by_key(|s| s.voter);
    let mut scored: Vec<(f64, CandidacyStanding)> = standings
        .into_iter()
        .map(|s| (candidate_score(&s, cfg), s))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(usize::try_from(cfg.candidates).unwrap_or(usize::MAX))
        .map(|(_, s)| CandidateProfile {
            id: s.voter,
            party: s.party,
            reputation: cfg.initial_reputation,
            fake_propensity: cfg.propensity_for(s.party),
        })
        .collect()
}
