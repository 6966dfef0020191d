//! Availability slot generation.
//!
//! Produces the ordered list of candidate appointment start times for one
//! date and service duration. The slot label is the client-visible session
//! start; the time actually reserved around a candidate `t` is the half-open
//! window `[t - prep_time, t + duration + buffer_time)`. Booking persistence
//! derives the stored interval the same way, so the two sides always agree.

use tracing::debug;

use super::time::{intervals_overlap, ClockTime, TimeInterval};
use super::types::{BookingSettings, Slot};

/// Parameters for one slot-generation run.
#[derive(Debug, Clone)]
pub struct SlotRequest {
    /// Requested service duration in minutes.
    pub duration_minutes: u32,
    /// Current wall-clock time when the target date is today; candidates at
    /// or before this time are excluded.
    pub now: Option<ClockTime>,
}

impl SlotRequest {
    /// Request slots for a service duration.
    pub fn new(duration_minutes: u32) -> Self {
        Self {
            duration_minutes,
            now: None,
        }
    }

    /// Apply the past-time cutoff for same-day requests.
    pub fn with_now(mut self, now: ClockTime) -> Self {
        self.now = Some(now);
        self
    }
}

/// Generate the candidate slot grid for one date.
///
/// `occupied` is the set of intervals already consumed on that date:
/// confirmed bookings (prep/buffer-inclusive as stored) plus the recurring
/// study interval unless `work_priority` excludes it. The caller owns that
/// policy; this function only rejects overlaps.
///
/// Candidates step from `work_start + prep_time` in `slot_step_minutes`
/// increments while the full reserved window still fits inside work hours.
/// Output is ascending; only entries with `available == true` may be offered
/// to clients.
pub fn generate_slots(
    request: &SlotRequest,
    settings: &BookingSettings,
    occupied: &[TimeInterval],
) -> Vec<Slot> {
    let work_start = i32::from(settings.work_start.minutes());
    let work_end = i32::from(settings.work_end.minutes());
    let prep = settings.prep_time as i32;
    let buffer = settings.buffer_time as i32;
    let duration = request.duration_minutes as i32;
    let step = settings.slot_step_minutes.max(1) as i32;
    let now = request.now.map(|t| i32::from(t.minutes()));

    let mut slots = Vec::new();
    let mut candidate = work_start + prep;

    while candidate + duration + buffer <= work_end {
        let reserved_start = candidate - prep;
        let reserved_end = candidate + duration + buffer;

        let in_work_hours = reserved_start >= work_start && reserved_end <= work_end;
        let clashes = occupied.iter().any(|interval| {
            intervals_overlap(
                reserved_start,
                reserved_end,
                i32::from(interval.start.minutes()),
                i32::from(interval.end.minutes()),
            )
        });
        let in_past = now.is_some_and(|cutoff| candidate <= cutoff);

        slots.push(Slot {
            time: ClockTime::from_minutes(candidate as u16),
            available: in_work_hours && !clashes && !in_past,
        });

        candidate += step;
    }

    debug!(
        total = slots.len(),
        available = slots.iter().filter(|s| s.available).count(),
        "generated slot grid"
    );
    slots
}

/// The prep/buffer-inclusive interval persisted for a booking at slot `t`.
///
/// Subtracting prep from the client-selected label and adding
/// duration + buffer reproduces exactly the window slot generation reserved,
/// keeping availability and persistence in agreement.
pub fn reserved_interval(
    slot: ClockTime,
    duration_minutes: u32,
    settings: &BookingSettings,
) -> TimeInterval {
    let start = slot.add_minutes(-(settings.prep_time as i32));
    let end = slot.add_minutes((duration_minutes + settings.buffer_time) as i32);
    TimeInterval::new(start, end)
}

// ============================================================================
// Tests
// ============================================================================
