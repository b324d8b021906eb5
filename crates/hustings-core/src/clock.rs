//! Election clock and phase state machine.
//!
//! The clock is the single source of truth for where a run stands. Phases
//! are derived from the tick counter and the [`ScheduleConfig`], never
//! stored:
//!
//! ```text
//! PRE_CAMPAIGN (T0..T9) -> CANDIDATE_SELECTION (T10) -> CAMPAIGN (T11..T50) -> ELECTION_DAY (T51)
//! ```
//!
//! Transitions are strictly tick-driven and monotonic. The clock refuses to
//! advance past election day.

use hustings_agents::digest::window_start;
use hustings_types::Phase;

use crate::config::ScheduleConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The run is already on election day.
    #[error("clock is at election day (tick {election_tick}) and cannot advance")]
    Finished {
        /// The terminal tick.
        election_tick: u64,
    },

    /// Invalid schedule configuration.
    #[error("invalid schedule: {reason}")]
    InvalidSchedule {
        /// Explanation of what is wrong with the schedule.
        reason: String,
    },
}

/// Tick counter for one election cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionClock {
    tick: u64,
    selection_tick: u64,
    campaign_length: u64,
    report_interval: u64,
}

impl ElectionClock {
    /// Create a clock at T0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidSchedule`] if the campaign or the report
    /// interval is empty, or the schedule overflows.
    pub fn new(schedule: &ScheduleConfig) -> Result<Self, ClockError> {
        if schedule.campaign_length == 0 {
            return Err(ClockError::InvalidSchedule {
                reason: "campaign_length must be at least 1".to_owned(),
            });
        }
        if schedule.report_interval == 0 {
            return Err(ClockError::InvalidSchedule {
                reason: "report_interval must be at least 1".to_owned(),
            });
        }
        schedule
            .selection_tick
            .checked_add(schedule.campaign_length)
            .and_then(|t| t.checked_add(1))
            .ok_or_else(|| ClockError::InvalidSchedule {
                reason: "election tick overflows".to_owned(),
            })?;
        Ok(Self {
            tick: 0,
            selection_tick: schedule.selection_tick,
            campaign_length: schedule.campaign_length,
            report_interval: schedule.report_interval,
        })
    }

    /// Advance by one tick and return it.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Finished`] on election day.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        if self.is_terminal() {
            return Err(ClockError::Finished {
                election_tick: self.election_tick(),
            });
        }
        self.tick = self.tick.saturating_add(1);
        Ok(self.tick)
    }

    /// Current tick.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase_at(self.tick)
    }

    /// Phase of an arbitrary tick under this schedule.
    pub const fn phase_at(&self, tick: u64) -> Phase {
        if tick < self.selection_tick {
            Phase::PreCampaign
        } else if tick == self.selection_tick {
            Phase::CandidateSelection
        } else if tick <= self.last_campaign_tick() {
            Phase::Campaign
        } else {
            Phase::ElectionDay
        }
    }

    /// The tick candidates are chosen.
    pub const fn selection_tick(&self) -> u64 {
        self.selection_tick
    }

    /// First campaign tick.
    pub const fn first_campaign_tick(&self) -> u64 {
        self.selection_tick.saturating_add(1)
    }

    /// Last campaign tick.
    pub const fn last_campaign_tick(&self) -> u64 {
        self.selection_tick.saturating_add(self.campaign_length)
    }

    /// The terminal tick.
    pub const fn election_tick(&self) -> u64 {
        self.last_campaign_tick().saturating_add(1)
    }

    /// Whether the clock is on election day.
    pub const fn is_terminal(&self) -> bool {
        self.tick >= self.election_tick()
    }

    /// Whether digests are due at `tick`.
    ///
    /// Every `report_interval`-th campaign tick, counting the first campaign
    /// tick as one.
    pub const fn is_report_tick(&self, tick: u64) -> bool {
        if tick < self.first_campaign_tick() || tick > self.last_campaign_tick() {
            return false;
        }
        let offset = tick.saturating_sub(self.selection_tick);
        match offset.checked_rem(self.report_interval) {
            Some(r) => r == 0,
            None => false,
        }
    }

    /// First tick of the digest window closing at `tick`.
    pub const fn report_window_start(&self, tick: u64) -> u64 {
        window_start(self.first_campaign_tick(), tick, self.report_interval)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn clock() -> ElectionClock {
        ElectionClock::new(&ScheduleConfig::default()).unwrap()
    }

    #[test]
    fn reference_schedule_phases() {
        let c = clock();
        assert_eq!(c.phase_at(0), Phase::PreCampaign);
        assert_eq!(c.phase_at(9), Phase::PreCampaign);
        assert_eq!(c.phase_at(10), Phase::CandidateSelection);
        assert_eq!(c.phase_at(11), Phase::Campaign);
        assert_eq!(c.phase_at(50), Phase::Campaign);
        assert_eq!(c.phase_at(51), Phase::ElectionDay);
        assert_eq!(c.election_tick(), 51);
    }

    #[test]
    fn phases_never_go_back() {
        let mut c = clock();
        let mut last = c.phase();
        while !c.is_terminal() {
            c.advance().unwrap();
            assert!(c.phase() >= last);
            last = c.phase();
        }
        assert_eq!(c.tick(), 51);
        assert!(matches!(
            c.advance(),
            Err(ClockError::Finished { election_tick: 51 })
        ));
    }

    #[test]
    fn report_ticks_and_windows() {
        let c = clock();
        let ticks: Vec<u64> = (0..=51).filter(|&t| c.is_report_tick(t)).collect();
        assert_eq!(ticks, vec![20, 30, 40, 50]);
        assert_eq!(c.report_window_start(20), 11);
        assert_eq!(c.report_window_start(30), 21);
        assert_eq!(c.report_window_start(50), 41);
    }

    #[test]
    fn empty_campaign_is_rejected() {
        let schedule = ScheduleConfig {
            campaign_length: 0,
            ..ScheduleConfig::default()
        };
        assert!(matches!(
            ElectionClock::new(&schedule),
            Err(ClockError::InvalidSchedule { .. })
        ));
    }
}
