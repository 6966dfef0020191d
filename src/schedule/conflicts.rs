//! Conflict detection against confirmed bookings.
//!
//! Detection is read-only and safe to run speculatively before committing a
//! change; only bookings whose status currently blocks time participate.
//! Every check routes through the same half-open overlap predicate as slot
//! generation.

use chrono::NaiveDate;

use super::cycle::CycleResolver;
use super::time::TimeInterval;
use super::types::{Booking, ConflictReport, RecurringEntry};

/// Number of days scanned forward when a recurring-cycle edit is checked
/// against existing bookings. Covers one full two-week rotation.
pub const CYCLE_HORIZON_DAYS: i64 = 14;

/// Read-only conflict detection over snapshots of booking state.
pub struct ConflictDetector;

impl ConflictDetector {
    /// Confirmed bookings on one date whose stored interval overlaps
    /// `interval`.
    pub fn for_interval(interval: &TimeInterval, bookings: &[Booking]) -> Vec<Booking> {
        bookings
            .iter()
            .filter(|b| b.status.blocks_time() && b.interval.overlaps(interval))
            .cloned()
            .collect()
    }

    /// Confirmed bookings on a date being blocked. The whole day conflicts,
    /// not any sub-interval.
    pub fn for_blocked_date(bookings: &[Booking]) -> Vec<Booking> {
        bookings
            .iter()
            .filter(|b| b.status.blocks_time())
            .cloned()
            .collect()
    }

    /// Confirmed bookings that would fall inside the recurring schedule if
    /// `proposed` replaced the current entries.
    ///
    /// `bookings` should cover the forward horizon the caller cares about (at
    /// minimum [`CYCLE_HORIZON_DAYS`] from today); each booking's date is
    /// resolved against the proposed entry set and checked for overlap.
    pub fn for_cycle(proposed: &[RecurringEntry], bookings: &[Booking]) -> Vec<Booking> {
        let resolver = CycleResolver::new(proposed.to_vec());
        bookings
            .iter()
            .filter(|b| b.status.blocks_time())
            .filter(|b| {
                resolver
                    .resolve(b.date)
                    .is_some_and(|interval| interval.overlaps(&b.interval))
            })
            .cloned()
            .collect()
    }

    /// Wrap colliding bookings in the uniform conflict payload.
    pub fn report(action: &str, bookings: Vec<Booking>) -> ConflictReport {
        let message = format!(
            "{} collides with {} confirmed booking(s); overriding will cancel them",
            action,
            bookings.len()
        );
        ConflictReport::new(message, bookings)
    }

    /// The forward date range scanned for cycle-edit conflicts.
    pub fn cycle_horizon(today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today, today + chrono::Duration::days(CYCLE_HORIZON_DAYS))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::time::ClockTime;
    use crate::schedule::types::{BookingStatus, CycleWeek};
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking(start: &str, end: &str, status: BookingStatus) -> Booking {
        Booking {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: "c1".into(),
            service_id: "s1".into(),
            client_name: "Anna".into(),
            service_name: "Consultation".into(),
            date: date(2025, 3, 10),
            interval: TimeInterval::parse(start, end),
            slot_time: ClockTime::parse(start),
            status,
        }
    }

    #[test]
    fn test_event_conflict_respects_overlap_and_status() {
        let bookings = [
            booking("10:00", "11:00", BookingStatus::Confirmed),
            booking("14:00", "15:00", BookingStatus::Pending),
        ];
        // 13:30-14:30 overlaps only the pending booking, which does not
        // block time, and misses the confirmed one entirely.
        let interval = TimeInterval::parse("13:30", "14:30");
        assert!(ConflictDetector::for_interval(&interval, &bookings).is_empty());

        // 10:30-11:30 hits the confirmed booking.
        let interval = TimeInterval::parse("10:30", "11:30");
        let found = ConflictDetector::for_interval(&interval, &bookings);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_blocked_date_conflicts_with_every_confirmed_booking() {
        let bookings = [
            booking("10:00", "11:00", BookingStatus::Confirmed),
            booking("12:00", "13:00", BookingStatus::Cancelled),
            booking("14:00", "15:00", BookingStatus::Confirmed),
        ];
        let found = ConflictDetector::for_blocked_date(&bookings);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_cycle_edit_finds_bookings_inside_new_recurring_interval() {
        // Cycle starting Monday 2025-03-10; study 09:00-15:00 on week-one
        // Mondays.
        let proposed = vec![RecurringEntry::new(
            Weekday::Mon,
            TimeInterval::parse("09:00", "15:00"),
            date(2025, 3, 10),
            CycleWeek::One,
        )];

        let inside = booking("10:00", "11:00", BookingStatus::Confirmed);
        let mut outside = booking("16:00", "17:00", BookingStatus::Confirmed);
        outside.slot_time = ClockTime::parse("16:00");
        // Same weekday but the alternate week, so the entry does not apply.
        let mut other_week = booking("10:00", "11:00", BookingStatus::Confirmed);
        other_week.date = date(2025, 3, 17);

        let found =
            ConflictDetector::for_cycle(&proposed, &[inside.clone(), outside, other_week]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, inside.id);
    }

    #[test]
    fn test_detection_is_side_effect_free() {
        let bookings = [booking("10:00", "11:00", BookingStatus::Confirmed)];
        let interval = TimeInterval::parse("10:30", "11:30");
        let first = ConflictDetector::for_interval(&interval, &bookings);
        let second = ConflictDetector::for_interval(&interval, &bookings);
        assert_eq!(first.len(), second.len());
        assert_eq!(bookings[0].status, BookingStatus::Confirmed);
    }
}
