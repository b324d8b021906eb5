//! The election report: everything a run produced, as one JSON document.
//!
//! Encoding is lossless. Money travels as decimal strings and scores as
//! shortest round-trip floats, so parsing a report back reproduces the same
//! vote counts, seat allocation, and digests.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use hustings_types::{
    CampaignEvent, CandidateProfile, CoverageDigest, ElectionResult, GazetteDigest, RunId,
};

use crate::orchestrator::RunOutcome;

/// Errors that can occur while encoding, decoding, or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The report could not be serialized.
    #[error("failed to encode report: {source}")]
    Encode {
        /// The underlying serialization error.
        source: serde_json::Error,
    },

    /// The input is not a valid report.
    #[error("failed to decode report: {source}")]
    Decode {
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// The report file could not be written or read.
    #[error("report file error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// A finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionReport {
    /// Unique identifier of the run.
    pub run_id: RunId,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
    /// Master seed.
    pub seed: u64,
    /// Candidates announced at selection.
    pub candidates: Vec<CandidateProfile>,
    /// Citizens that handed in a ballot.
    pub turnout: u32,
    /// The final count.
    pub results: ElectionResult,
    /// Authority digests, in report order.
    pub gazettes: Vec<GazetteDigest>,
    /// Media digests, in report order.
    pub coverage: Vec<CoverageDigest>,
    /// The authority's campaign log.
    pub events: Vec<CampaignEvent>,
}

impl ElectionReport {
    /// Wrap a finished run and the authority's log.
    pub fn new(outcome: RunOutcome, events: Vec<CampaignEvent>) -> Self {
        Self {
            run_id: RunId::new(),
            generated_at: Utc::now(),
            seed: outcome.seed,
            candidates: outcome.candidates,
            turnout: outcome.turnout,
            results: outcome.result,
            gazettes: outcome.gazettes,
            coverage: outcome.coverage,
            events,
        }
    }

    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(|source| ReportError::Encode { source })
    }

    /// Parse a report produced by [`ElectionReport::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Decode`] if the input is not a report.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(|source| ReportError::Decode { source })
    }

    /// Write the report to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if encoding or writing fails.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), run_id = %self.run_id, "report written");
        Ok(())
    }

    /// Read a report from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if reading or decoding fails.
    pub fn read_from(path: &Path) -> Result<Self, ReportError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
