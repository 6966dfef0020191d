//! Clock-time and interval primitives.
//!
//! All times in the engine are wall-clock minutes since midnight on a single
//! day, rendered as zero-padded `"HH:MM"`. Intervals are half-open and never
//! span midnight; every availability and conflict check in the crate routes
//! through [`intervals_overlap`] (or [`TimeInterval::overlaps`], which
//! delegates to it) so that touching intervals are consistently treated as
//! non-overlapping.

use std::fmt;
use std::str::FromStr;

use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minutes in a day. Interval ends may equal but never exceed this.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

// ============================================================================
// ClockTime
// ============================================================================

/// A wall-clock time stored as minutes since midnight.
///
/// Parsing is total: empty or malformed input falls back to `00:00`. This is
/// a documented contract, not an error path — upstream form plumbing sends
/// empty strings for unset time fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Create from raw minutes since midnight.
    pub fn from_minutes(minutes: u16) -> Self {
        Self(minutes)
    }

    /// Create from hour and minute components.
    pub fn hm(hours: u16, minutes: u16) -> Self {
        Self(hours * 60 + minutes)
    }

    /// Parse `"HH:MM"`, falling back to `00:00` for empty/invalid input.
    ///
    /// Out-of-range components (minutes >= 60, or a total past 24:00) take
    /// the same fallback as malformed text.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.splitn(2, ':');
        let hours = parts.next().and_then(|p| p.trim().parse::<u32>().ok());
        let minutes = parts.next().and_then(|p| p.trim().parse::<u32>().ok());
        match (hours, minutes) {
            (Some(h), Some(m)) if m < 60 && h * 60 + m <= u32::from(MINUTES_PER_DAY) => {
                Self((h * 60 + m) as u16)
            }
            _ => Self(0),
        }
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Add a signed number of minutes, saturating at `00:00`.
    ///
    /// There is deliberately no wrap past midnight: a result beyond 24:00 is
    /// rejected later by interval validation rather than rolled into the next
    /// day.
    pub fn add_minutes(&self, delta: i32) -> Self {
        let total = i32::from(self.0) + delta;
        Self(total.max(0) as u16)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for ClockTime {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

impl JsonSchema for ClockTime {
    fn schema_name() -> String {
        "ClockTime".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

// ============================================================================
// Overlap primitive
// ============================================================================

/// Half-open overlap test over minute offsets.
///
/// `[a_start, a_end)` and `[b_start, b_end)` overlap iff
/// `a_start < b_end && a_end > b_start`. Touching intervals
/// (`a_end == b_start`) do not overlap.
pub fn intervals_overlap(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
    a_start < b_end && a_end > b_start
}

// ============================================================================
// TimeInterval
// ============================================================================

/// A half-open `[start, end)` time range within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimeInterval {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeInterval {
    /// Create an interval without validation. Use [`TimeInterval::validated`]
    /// at trust boundaries.
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// Create an interval, enforcing `start < end` and `end <= 24:00`.
    ///
    /// Intervals spanning midnight are disallowed by business rule: a service
    /// duration may not push the end time into the next day.
    pub fn validated(start: ClockTime, end: ClockTime) -> std::result::Result<Self, String> {
        if start >= end {
            return Err(format!("interval start {start} must precede end {end}"));
        }
        if end.minutes() > MINUTES_PER_DAY {
            return Err(format!("interval end {end} extends past midnight"));
        }
        Ok(Self { start, end })
    }

    /// Parse from `"HH:MM"` strings without validation.
    pub fn parse(start: &str, end: &str) -> Self {
        Self::new(ClockTime::parse(start), ClockTime::parse(end))
    }

    /// Interval length in minutes.
    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Half-open overlap test against another interval.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        intervals_overlap(
            i32::from(self.start.minutes()),
            i32::from(self.end.minutes()),
            i32::from(other.start.minutes()),
            i32::from(other.end.minutes()),
        )
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ============================================================================
// Tests
// ============================================================================
