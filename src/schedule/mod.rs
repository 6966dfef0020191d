//! Scheduling engine: availability, recurrence, and conflict resolution.
//!
//! The engine is layered bottom-up:
//!
//! - [`time`] — minute-precision clock times and half-open intervals, the
//!   single overlap predicate everything else routes through
//! - [`types`] — the entity model (recurring entries, events, blocked dates,
//!   bookings, clients, services, settings)
//! - [`cycle`] — resolves which recurring interval applies to a concrete date
//!   under the alternating two-week rotation
//! - [`slots`] — generates the candidate slot grid for a date, reserving
//!   prep/buffer windows around each candidate
//! - [`conflicts`] — read-only detection of collisions with confirmed
//!   bookings
//! - [`manager`] — the operation surface tying store access, detection, and
//!   force-override together
//!
//! All interval logic is half-open `[start, end)`: back-to-back appointments
//! never conflict.

pub mod conflicts;
pub mod cycle;
pub mod manager;
pub mod slots;
pub mod time;
pub mod types;

pub use conflicts::{ConflictDetector, CYCLE_HORIZON_DAYS};
pub use cycle::CycleResolver;
pub use manager::ScheduleManager;
pub use slots::{generate_slots, reserved_interval, SlotRequest};
pub use time::{intervals_overlap, ClockTime, TimeInterval, MINUTES_PER_DAY};
pub use types::{
    BlockedDate, Booking, BookingSettings, BookingStatus, CalendarEvent, Client, ConflictReport,
    CycleDay, CycleWeek, EventKind, NewBooking, NewEvent, Outcome, RecurringEntry, Service,
    SettingsUpdate, Slot,
};
