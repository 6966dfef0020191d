//! Slotbook: single-owner appointment booking engine
//!
//! Computes client-visible availability from work hours, prep/buffer
//! reservations, an alternating two-week study schedule, and confirmed
//! bookings; detects collisions between owner mutations and confirmed
//! bookings; and resolves them through an explicit two-phase
//! confirm-or-cancel override.

pub mod api;
pub mod config;
pub mod error;
pub mod schedule;
pub mod store;
pub mod wizard;
pub mod workflow;

pub use api::{create_rest_router, ApiState, RestApiConfig};
pub use config::Config;
pub use error::{ConfigError, Result, SlotbookError, StoreError};
pub use schedule::{
    generate_slots, intervals_overlap, reserved_interval, BlockedDate, Booking, BookingSettings,
    BookingStatus, CalendarEvent, Client, ClockTime, ConflictDetector, ConflictReport, CycleDay,
    CycleResolver, CycleWeek, EventKind, NewBooking, NewEvent, Outcome, RecurringEntry,
    ScheduleManager, Service, SettingsUpdate, Slot, SlotRequest, TimeInterval,
    CYCLE_HORIZON_DAYS, MINUTES_PER_DAY,
};
pub use store::{MemoryStore, ScheduleStore};
pub use wizard::{BookingDraft, BookingWizard, WizardStep};
pub use workflow::{ConflictWorkflow, WorkflowState};
