//! Core data model for the booking engine.
//!
//! Dates are always `YYYY-MM-DD` in the owner's local timezone (this is a
//! single-owner, single-timezone system by design) and times are `"HH:MM"`
//! wall-clock values, see [`super::time`].

use chrono::{NaiveDate, Weekday};
use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{Deserialize, Serialize};

use super::time::{ClockTime, TimeInterval};

// ============================================================================
// Two-week cycle
// ============================================================================

/// Which of the two alternating weeks of a cycle an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CycleWeek {
    One,
    Two,
}

impl CycleWeek {
    /// The other week of the cycle.
    pub fn other(&self) -> Self {
        match self {
            CycleWeek::One => CycleWeek::Two,
            CycleWeek::Two => CycleWeek::One,
        }
    }
}

impl From<CycleWeek> for u8 {
    fn from(week: CycleWeek) -> u8 {
        match week {
            CycleWeek::One => 1,
            CycleWeek::Two => 2,
        }
    }
}

impl TryFrom<u8> for CycleWeek {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(CycleWeek::One),
            2 => Ok(CycleWeek::Two),
            other => Err(format!("week number must be 1 or 2, got {other}")),
        }
    }
}

impl JsonSchema for CycleWeek {
    fn schema_name() -> String {
        "CycleWeek".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        u8::json_schema(gen)
    }
}

/// A recurring occupied block on one weekday of a two-week cycle.
///
/// Active only on dates whose week parity relative to `cycle_start` matches
/// `week`. At most one entry exists per `(cycle_start, day_of_week, week)`
/// triple; saving a cycle replaces all of its entries in bulk.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecurringEntry {
    pub id: String,
    #[serde(with = "weekday_lower")]
    #[schemars(with = "String")]
    pub day_of_week: Weekday,
    pub interval: TimeInterval,
    pub cycle_start: NaiveDate,
    pub week: CycleWeek,
}

impl RecurringEntry {
    /// Create a new entry with a fresh ID.
    pub fn new(
        day_of_week: Weekday,
        interval: TimeInterval,
        cycle_start: NaiveDate,
        week: CycleWeek,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            day_of_week,
            interval,
            cycle_start,
            week,
        }
    }
}

/// Serialize `chrono::Weekday` as lowercase English names ("monday"…"sunday"),
/// matching the wire format of the persistence contract.
mod weekday_lower {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        day: &Weekday,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let name = match day {
            Weekday::Mon => "monday",
            Weekday::Tue => "tuesday",
            Weekday::Wed => "wednesday",
            Weekday::Thu => "thursday",
            Weekday::Fri => "friday",
            Weekday::Sat => "saturday",
            Weekday::Sun => "sunday",
        };
        serializer.serialize_str(name)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Weekday, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "monday" => Ok(Weekday::Mon),
            "tuesday" => Ok(Weekday::Tue),
            "wednesday" => Ok(Weekday::Wed),
            "thursday" => Ok(Weekday::Thu),
            "friday" => Ok(Weekday::Fri),
            "saturday" => Ok(Weekday::Sat),
            "sunday" => Ok(Weekday::Sun),
            other => Err(serde::de::Error::custom(format!("unknown weekday: {other}"))),
        }
    }
}

/// One day's slot of a cycle being saved, before entries/IDs exist.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CycleDay {
    #[serde(with = "weekday_lower")]
    #[schemars(with = "String")]
    pub day_of_week: Weekday,
    pub week: CycleWeek,
    pub interval: TimeInterval,
}

// ============================================================================
// Calendar events
// ============================================================================

/// Kind of calendar entry shown on the owner's day view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A recurring study block, materialized from the cycle schedule.
    Study,
    /// A one-off owner commitment.
    #[default]
    Event,
    /// A confirmed client booking projected onto the calendar.
    Booking,
}

impl EventKind {
    /// Get a human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            EventKind::Study => "Study",
            EventKind::Event => "Event",
            EventKind::Booking => "Booking",
        }
    }
}

/// A dated calendar entry with a time interval.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CalendarEvent {
    pub id: String,
    pub kind: EventKind,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalendarEvent {
    /// Create a new one-off event with a fresh ID.
    pub fn new(title: impl Into<String>, date: NaiveDate, interval: TimeInterval) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: EventKind::Event,
            date,
            interval,
            title: title.into(),
            description: None,
        }
    }

    /// Set the kind.
    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Payload for creating a one-off event.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// Blocked dates
// ============================================================================

/// A date fully closed to new client bookings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BlockedDate {
    pub id: String,
    pub date: NaiveDate,
}

impl BlockedDate {
    /// Create a new blocked date with a fresh ID.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Booking lifecycle state.
///
/// Only `Confirmed` bookings occupy time: they feed conflict detection and
/// the availability occupied-interval set. `Pending` bookings never block
/// other clients' slots; `Cancelled` and `Completed` never block anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Whether this status contributes to occupied time.
    pub fn blocks_time(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }

    /// Whether the lifecycle permits moving to `next`.
    ///
    /// `pending -> confirmed | cancelled`, `confirmed -> completed | cancelled`;
    /// `completed` and `cancelled` are terminal.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

/// A client appointment.
///
/// The stored `interval` is prep/buffer-inclusive: it runs from
/// `slot - prep_time` to `slot + duration + buffer_time`. `slot_time` keeps
/// the client-visible start the slot was labeled with. Availability
/// computation and booking persistence must agree on this asymmetry or
/// double-booking becomes possible.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    pub service_id: String,
    /// Denormalized client name for conflict prompts and lists.
    pub client_name: String,
    /// Denormalized service name for conflict prompts and lists.
    pub service_name: String,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    /// Client-visible start time (the slot label, without prep).
    pub slot_time: ClockTime,
    pub status: BookingStatus,
}

/// Payload for creating a booking with a precomputed interval.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewBooking {
    pub client_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
    /// Client-visible slot label; defaults to `start` when prep time is zero.
    #[serde(default)]
    pub slot_time: Option<ClockTime>,
    #[serde(default)]
    pub status: BookingStatus,
}

// ============================================================================
// Clients and services
// ============================================================================

/// An end client captured at booking time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl Client {
    /// Create a new client with a fresh ID.
    pub fn new(name: impl Into<String>, phone: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }
}

/// A bookable service offered by the owner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    pub price: String,
    pub active: bool,
}

impl Service {
    /// Create a new active service with a fresh ID.
    pub fn new(name: impl Into<String>, duration_minutes: u32, price: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            duration_minutes,
            price: price.into(),
            active: true,
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Process-wide, single-owner booking configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BookingSettings {
    /// Minutes reserved immediately before a service's visible start.
    pub prep_time: u32,
    /// Minutes reserved immediately after a service ends.
    pub buffer_time: u32,
    pub work_start: ClockTime,
    pub work_end: ClockTime,
    /// When true, declared work hours are authoritative and the recurring
    /// study schedule is ignored for client-visible availability.
    pub work_priority: bool,
    pub reminder_days_before: u32,
    /// Candidate grid granularity for slot generation.
    pub slot_step_minutes: u32,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            prep_time: 0,
            buffer_time: 0,
            work_start: ClockTime::hm(10, 0),
            work_end: ClockTime::hm(20, 0),
            work_priority: false,
            reminder_days_before: 1,
            slot_step_minutes: 30,
        }
    }
}

/// Partial update for [`BookingSettings`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_start: Option<ClockTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_end: Option<ClockTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_priority: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_days_before: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_step_minutes: Option<u32>,
}

impl SettingsUpdate {
    /// Apply this update to a settings value.
    pub fn apply_to(&self, settings: &mut BookingSettings) {
        if let Some(v) = self.prep_time {
            settings.prep_time = v;
        }
        if let Some(v) = self.buffer_time {
            settings.buffer_time = v;
        }
        if let Some(v) = self.work_start {
            settings.work_start = v;
        }
        if let Some(v) = self.work_end {
            settings.work_end = v;
        }
        if let Some(v) = self.work_priority {
            settings.work_priority = v;
        }
        if let Some(v) = self.reminder_days_before {
            settings.reminder_days_before = v;
        }
        if let Some(v) = self.slot_step_minutes {
            settings.slot_step_minutes = v;
        }
    }
}

// ============================================================================
// Slots and conflict reporting
// ============================================================================

/// A candidate appointment start time offered to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Slot {
    pub time: ClockTime,
    pub available: bool,
}

/// The uniform conflict payload returned when a mutation collides with
/// confirmed bookings and override was not requested.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConflictReport {
    pub message: String,
    pub bookings: Vec<Booking>,
}

impl ConflictReport {
    /// Build a report for a list of colliding bookings.
    pub fn new(message: impl Into<String>, bookings: Vec<Booking>) -> Self {
        Self {
            message: message.into(),
            bookings,
        }
    }
}

/// Result of attempting a mutation that may collide with confirmed bookings.
///
/// A conflict is an expected, operator-resolvable condition, not an error:
/// the unforced attempt applies nothing and reports the collisions instead.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Applied(T),
    Conflict(ConflictReport),
}

impl<T> Outcome<T> {
    /// Unwrap the applied value, panicking on conflict. Test helper.
    pub fn applied(self) -> T {
        match self {
            Outcome::Applied(value) => value,
            Outcome::Conflict(report) => {
                panic!("expected applied outcome, got conflict: {}", report.message)
            }
        }
    }

    /// The conflict report, if any.
    pub fn conflict(&self) -> Option<&ConflictReport> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Conflict(report) => Some(report),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
