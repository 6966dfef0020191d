//! Two-week cycle resolution.
//!
//! The owner's recurring study schedule is a template of up to fourteen
//! weekday blocks (seven per week) that alternates on a two-week cycle
//! anchored at a start date. Resolution answers "which recurring interval,
//! if any, occupies weekday W on date D".

use chrono::{Datelike, NaiveDate};

use super::time::TimeInterval;
use super::types::{CycleWeek, RecurringEntry};

/// Resolves recurring schedule entries against calendar dates.
///
/// Holds a snapshot of the owner's entries; the resolver itself is pure and
/// cheap to rebuild whenever the schedule changes.
#[derive(Debug, Clone, Default)]
pub struct CycleResolver {
    entries: Vec<RecurringEntry>,
}

impl CycleResolver {
    /// Create a resolver over a snapshot of recurring entries.
    pub fn new(entries: Vec<RecurringEntry>) -> Self {
        Self { entries }
    }

    /// Whether any cycle is configured at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The cycle governing `date`: the most recent cycle start `<=` date.
    ///
    /// Cycles do not auto-expire; a newer cycle supersedes an older one from
    /// its start date onward. Dates before every cycle start have no
    /// recurring schedule.
    pub fn active_cycle(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.entries
            .iter()
            .map(|e| e.cycle_start)
            .filter(|start| *start <= date)
            .max()
    }

    /// Week parity of `date` relative to `cycle_start`.
    ///
    /// Days 0-6 after the start are week one, days 7-13 week two, then the
    /// pattern repeats. Returns `None` for dates before the cycle start.
    pub fn week_for(cycle_start: NaiveDate, date: NaiveDate) -> Option<CycleWeek> {
        let days_since = (date - cycle_start).num_days();
        if days_since < 0 {
            return None;
        }
        match (days_since / 7) % 2 {
            0 => Some(CycleWeek::One),
            _ => Some(CycleWeek::Two),
        }
    }

    /// The recurring entry applying to `date`, if any.
    pub fn entry_for(&self, date: NaiveDate) -> Option<&RecurringEntry> {
        let cycle_start = self.active_cycle(date)?;
        let week = Self::week_for(cycle_start, date)?;
        let weekday = date.weekday();
        self.entries.iter().find(|e| {
            e.cycle_start == cycle_start && e.week == week && e.day_of_week == weekday
        })
    }

    /// The recurring occupied interval for `date`, if any.
    pub fn resolve(&self, date: NaiveDate) -> Option<TimeInterval> {
        self.entry_for(date).map(|e| e.interval)
    }
}

// ============================================================================
// Tests
// ============================================================================
