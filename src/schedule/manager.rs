//! Schedule manager: the operation surface over the persistence boundary.
//!
//! `ScheduleManager` owns all policy: validation before any store call,
//! re-fetching booking state immediately before conflict detection, the
//! all-or-nothing unforced attempt, and the force-override path that cancels
//! colliding confirmed bookings before applying a mutation.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Result, SlotbookError, StoreError};
use crate::store::ScheduleStore;

use super::conflicts::ConflictDetector;
use super::cycle::CycleResolver;
use super::slots::{generate_slots, reserved_interval, SlotRequest};
use super::time::{ClockTime, TimeInterval};
use super::types::{
    BlockedDate, Booking, BookingSettings, BookingStatus, CalendarEvent, Client, CycleDay,
    EventKind, NewBooking, NewEvent, Outcome, RecurringEntry, Service, SettingsUpdate, Slot,
};

/// Manager for schedule state, availability, and conflict-resolving
/// mutations.
pub struct ScheduleManager<S: ScheduleStore> {
    store: Arc<RwLock<S>>,
}

impl<S: ScheduleStore> ScheduleManager<S> {
    /// Create a new manager over a shared store.
    pub fn new(store: Arc<RwLock<S>>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Recurring schedule
    // ========================================================================

    /// All recurring entries across every cycle.
    pub async fn recurring_schedule(&self) -> Result<Vec<RecurringEntry>> {
        let store = self.store.read().await;
        store.list_recurring().await
    }

    /// Replace one cycle's entries in bulk.
    ///
    /// The unforced attempt is all-or-nothing: when the edited cycle would
    /// cover confirmed bookings inside the forward horizon, nothing is
    /// written and the collisions are reported. With `force`, the colliding
    /// bookings are cancelled first, then the cycle's previous entries are
    /// deleted and the new ones created.
    pub async fn save_cycle(
        &self,
        cycle_start: NaiveDate,
        days: Vec<CycleDay>,
        today: NaiveDate,
        force: bool,
    ) -> Result<Outcome<Vec<RecurringEntry>>> {
        for day in &days {
            TimeInterval::validated(day.interval.start, day.interval.end)
                .map_err(SlotbookError::Validation)?;
        }

        let store = self.store.read().await;

        // Build the proposed full entry set: every other cycle unchanged,
        // this cycle replaced by the incoming days.
        let existing = store.list_recurring().await?;
        let mut proposed: Vec<RecurringEntry> = existing
            .iter()
            .filter(|e| e.cycle_start != cycle_start)
            .cloned()
            .collect();
        proposed.extend(
            days.iter()
                .map(|d| RecurringEntry::new(d.day_of_week, d.interval, cycle_start, d.week)),
        );

        // Fresh booking state for the horizon, fetched right before
        // detection.
        let (from, to) = ConflictDetector::cycle_horizon(today);
        let bookings: Vec<Booking> = store
            .list_bookings(None)
            .await?
            .into_iter()
            .filter(|b| b.date >= from && b.date <= to)
            .collect();

        let conflicts = ConflictDetector::for_cycle(&proposed, &bookings);
        if !conflicts.is_empty() && !force {
            debug!(count = conflicts.len(), "cycle edit reported conflicts");
            return Ok(Outcome::Conflict(ConflictDetector::report(
                "Saving this schedule cycle",
                conflicts,
            )));
        }

        self.cancel_bookings(&store, &conflicts).await?;

        for entry in existing.iter().filter(|e| e.cycle_start == cycle_start) {
            store.delete_recurring(&entry.id).await?;
        }
        let mut created = Vec::with_capacity(proposed.len());
        for entry in proposed.into_iter().filter(|e| e.cycle_start == cycle_start) {
            created.push(store.create_recurring(entry).await?);
        }

        info!(%cycle_start, entries = created.len(), "saved schedule cycle");
        Ok(Outcome::Applied(created))
    }

    /// Delete every entry of one cycle.
    pub async fn delete_cycle(&self, cycle_start: NaiveDate) -> Result<usize> {
        let store = self.store.read().await;
        let entries = store.list_recurring().await?;
        let mut removed = 0;
        for entry in entries.iter().filter(|e| e.cycle_start == cycle_start) {
            if store.delete_recurring(&entry.id).await? {
                removed += 1;
            }
        }
        info!(%cycle_start, removed, "deleted schedule cycle");
        Ok(removed)
    }

    // ========================================================================
    // Calendar events
    // ========================================================================

    /// Events for one date, or all events.
    pub async fn events(&self, date: Option<NaiveDate>) -> Result<Vec<CalendarEvent>> {
        let store = self.store.read().await;
        store.list_events(date).await
    }

    /// Create a one-off event, detecting collisions with confirmed bookings
    /// on the same date.
    pub async fn create_event(&self, new: NewEvent, force: bool) -> Result<Outcome<CalendarEvent>> {
        if new.title.trim().is_empty() {
            return Err(SlotbookError::Validation("event title is required".into()));
        }
        let interval =
            TimeInterval::validated(new.start, new.end).map_err(SlotbookError::Validation)?;

        let store = self.store.read().await;
        let bookings = store.list_bookings(Some(new.date)).await?;
        let conflicts = ConflictDetector::for_interval(&interval, &bookings);
        if !conflicts.is_empty() && !force {
            debug!(count = conflicts.len(), date = %new.date, "event reported conflicts");
            return Ok(Outcome::Conflict(ConflictDetector::report(
                "Adding this event",
                conflicts,
            )));
        }

        self.cancel_bookings(&store, &conflicts).await?;

        let mut event = CalendarEvent::new(new.title, new.date, interval).with_kind(EventKind::Event);
        if let Some(description) = new.description {
            event = event.with_description(description);
        }
        let created = store.create_event(event).await?;
        info!(id = %created.id, date = %created.date, "created event");
        Ok(Outcome::Applied(created))
    }

    /// Delete an event by ID.
    pub async fn delete_event(&self, id: &str) -> Result<bool> {
        let store = self.store.read().await;
        store.delete_event(id).await
    }

    // ========================================================================
    // Blocked dates
    // ========================================================================

    /// All blocked dates, ascending.
    pub async fn blocked_dates(&self) -> Result<Vec<BlockedDate>> {
        let store = self.store.read().await;
        store.list_blocked().await
    }

    /// Block an entire date for new client bookings.
    ///
    /// Blocking a date that already carries confirmed bookings requires
    /// `force`, which cancels them. Re-blocking an already-blocked date is a
    /// no-op returning the existing record, so a forced retry after the
    /// conflicts were resolved elsewhere cannot fail or duplicate.
    pub async fn block_date(&self, date: NaiveDate, force: bool) -> Result<Outcome<BlockedDate>> {
        let store = self.store.read().await;

        if let Some(existing) = store.list_blocked().await?.into_iter().find(|b| b.date == date) {
            debug!(%date, "date already blocked");
            return Ok(Outcome::Applied(existing));
        }

        let bookings = store.list_bookings(Some(date)).await?;
        let conflicts = ConflictDetector::for_blocked_date(&bookings);
        if !conflicts.is_empty() && !force {
            debug!(count = conflicts.len(), %date, "block-date reported conflicts");
            return Ok(Outcome::Conflict(ConflictDetector::report(
                "Blocking this day",
                conflicts,
            )));
        }

        self.cancel_bookings(&store, &conflicts).await?;

        let created = store.create_blocked(BlockedDate::new(date)).await?;
        info!(%date, "blocked date");
        Ok(Outcome::Applied(created))
    }

    /// Remove a blocked date by ID.
    pub async fn unblock_date(&self, id: &str) -> Result<bool> {
        let store = self.store.read().await;
        store.delete_blocked(id).await
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Bookings for one date, or all bookings.
    pub async fn bookings(&self, date: Option<NaiveDate>) -> Result<Vec<Booking>> {
        let store = self.store.read().await;
        store.list_bookings(date).await
    }

    /// Create a booking from a precomputed interval.
    ///
    /// Owner-entered path that bypasses the slot grid; the caller supplies
    /// the interval and initial status directly.
    pub async fn create_booking(&self, new: NewBooking) -> Result<Booking> {
        let interval =
            TimeInterval::validated(new.start, new.end).map_err(SlotbookError::Validation)?;

        let store = self.store.read().await;
        let service = store
            .get_service(&new.service_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("service {}", new.service_id)))?;

        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: new.client_id,
            service_id: service.id.clone(),
            client_name: String::new(),
            service_name: service.name.clone(),
            date: new.date,
            interval,
            slot_time: new.slot_time.unwrap_or(new.start),
            status: new.status,
        };
        store.create_booking(booking).await
    }

    /// Book a client-visible slot for a service.
    ///
    /// Persists the prep/buffer-inclusive interval derived from the selected
    /// slot label, creating the client record along the way. Mirrors the
    /// interval arithmetic of slot generation exactly.
    pub async fn book_slot(
        &self,
        client: Client,
        service_id: &str,
        date: NaiveDate,
        slot: ClockTime,
    ) -> Result<Booking> {
        if client.name.trim().is_empty() || client.phone.trim().is_empty() {
            return Err(SlotbookError::Validation(
                "client name and phone are required".into(),
            ));
        }

        let store = self.store.read().await;
        let service = store
            .get_service(service_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("service {service_id}")))?;
        let settings = store.get_settings().await?;

        let interval = reserved_interval(slot, service.duration_minutes, &settings);
        TimeInterval::validated(interval.start, interval.end).map_err(SlotbookError::Validation)?;

        let client = store.create_client(client).await?;
        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: client.id,
            service_id: service.id.clone(),
            client_name: client.name,
            service_name: service.name.clone(),
            date,
            interval,
            slot_time: slot,
            status: BookingStatus::Pending,
        };
        let created = store.create_booking(booking).await?;
        info!(id = %created.id, %date, slot = %slot, "booked slot");
        Ok(created)
    }

    /// Move a booking through its lifecycle, rejecting invalid transitions.
    pub async fn update_booking_status(&self, id: &str, status: BookingStatus) -> Result<Booking> {
        let store = self.store.read().await;
        let booking = store
            .get_booking(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("booking {id}")))?;

        if !booking.status.can_transition_to(status) {
            return Err(SlotbookError::Validation(format!(
                "booking cannot move from {:?} to {:?}",
                booking.status, status
            )));
        }
        store.set_booking_status(id, status).await?;
        let mut updated = booking;
        updated.status = status;
        Ok(updated)
    }

    // ========================================================================
    // Availability
    // ========================================================================

    /// The candidate slot grid for a date and service.
    ///
    /// A blocked date yields no candidates at all. The occupied set is every
    /// confirmed booking's stored interval plus, unless `work_priority` is
    /// set, the recurring study interval resolved for the date.
    pub async fn available_slots(
        &self,
        date: NaiveDate,
        service_id: &str,
        now: Option<ClockTime>,
    ) -> Result<Vec<Slot>> {
        let store = self.store.read().await;
        let service = store
            .get_service(service_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("service {service_id}")))?;

        if store.list_blocked().await?.iter().any(|b| b.date == date) {
            debug!(%date, "date is blocked, no slots");
            return Ok(Vec::new());
        }

        let settings = store.get_settings().await?;

        let mut occupied: Vec<TimeInterval> = store
            .list_bookings(Some(date))
            .await?
            .iter()
            .filter(|b| b.status.blocks_time())
            .map(|b| b.interval)
            .collect();

        if !settings.work_priority {
            let resolver = CycleResolver::new(store.list_recurring().await?);
            if let Some(study) = resolver.resolve(date) {
                occupied.push(study);
            }
        }

        let mut request = SlotRequest::new(service.duration_minutes);
        if let Some(now) = now {
            request = request.with_now(now);
        }
        Ok(generate_slots(&request, &settings, &occupied))
    }

    // ========================================================================
    // Services and settings
    // ========================================================================

    /// All services, including inactive ones.
    pub async fn services(&self) -> Result<Vec<Service>> {
        let store = self.store.read().await;
        store.list_services().await
    }

    /// Register a service.
    pub async fn create_service(&self, service: Service) -> Result<Service> {
        let store = self.store.read().await;
        store.create_service(service).await
    }

    /// Current booking settings.
    pub async fn settings(&self) -> Result<BookingSettings> {
        let store = self.store.read().await;
        store.get_settings().await
    }

    /// Partially update booking settings.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<BookingSettings> {
        if let (Some(start), Some(end)) = (update.work_start, update.work_end) {
            if start >= end {
                return Err(SlotbookError::Validation(
                    "work_start must precede work_end".into(),
                ));
            }
        }
        let store = self.store.read().await;
        store.update_settings(update).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Cancel bookings listed in a conflict report during a forced override.
    ///
    /// Bookings already resolved elsewhere (cancelled or completed since the
    /// report was produced) are treated as satisfied, so a repeated forced
    /// retry never errors.
    async fn cancel_bookings(
        &self,
        store: &tokio::sync::RwLockReadGuard<'_, S>,
        conflicts: &[Booking],
    ) -> Result<()> {
        for booking in conflicts {
            let current = store.get_booking(&booking.id).await?;
            match current {
                Some(b) if b.status.can_transition_to(BookingStatus::Cancelled) => {
                    store
                        .set_booking_status(&booking.id, BookingStatus::Cancelled)
                        .await?;
                    warn!(id = %booking.id, client = %booking.client_name, "cancelled booking via override");
                }
                Some(_) | None => {
                    debug!(id = %booking.id, "conflicting booking already resolved");
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::CycleWeek;
    use crate::store::MemoryStore;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn manager() -> ScheduleManager<MemoryStore> {
        ScheduleManager::new(Arc::new(RwLock::new(MemoryStore::new())))
    }

    async fn seed_service(mgr: &ScheduleManager<MemoryStore>, minutes: u32) -> Service {
        mgr.create_service(Service::new("Consultation", minutes, "1500"))
            .await
            .unwrap()
    }

    async fn confirmed_booking(
        mgr: &ScheduleManager<MemoryStore>,
        service: &Service,
        on: NaiveDate,
        slot: &str,
    ) -> Booking {
        let booking = mgr
            .book_slot(
                Client::new("Anna", "+70000000000", ""),
                &service.id,
                on,
                ClockTime::parse(slot),
            )
            .await
            .unwrap();
        mgr.update_booking_status(&booking.id, BookingStatus::Confirmed)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_block_date_conflict_then_force() {
        let mgr = manager();
        let service = seed_service(&mgr, 60).await;
        let day = date(2025, 3, 10);
        let booking = confirmed_booking(&mgr, &service, day, "12:00").await;

        // Unforced attempt reports the conflict and mutates nothing.
        let outcome = mgr.block_date(day, false).await.unwrap();
        let report = outcome.conflict().expect("expected conflict");
        assert_eq!(report.bookings.len(), 1);
        assert!(mgr.blocked_dates().await.unwrap().is_empty());

        // Forced retry cancels the booking and blocks the day.
        let blocked = mgr.block_date(day, true).await.unwrap().applied();
        assert_eq!(blocked.date, day);
        let bookings = mgr.bookings(Some(day)).await.unwrap();
        assert_eq!(bookings[0].id, booking.id);
        assert_eq!(bookings[0].status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_force_block_is_idempotent() {
        let mgr = manager();
        let service = seed_service(&mgr, 60).await;
        let day = date(2025, 3, 10);
        confirmed_booking(&mgr, &service, day, "12:00").await;

        mgr.block_date(day, true).await.unwrap().applied();
        // Second forced call after the conflicts are gone must succeed and
        // leave exactly one record.
        mgr.block_date(day, true).await.unwrap().applied();
        assert_eq!(mgr.blocked_dates().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_event_ignores_pending_and_nonoverlapping_bookings() {
        let mgr = manager();
        let service = seed_service(&mgr, 60).await;
        let day = date(2025, 3, 10);

        confirmed_booking(&mgr, &service, day, "10:00").await;
        // Pending booking at 14:00 stays pending.
        mgr.book_slot(
            Client::new("Boris", "+70000000001", ""),
            &service.id,
            day,
            ClockTime::parse("14:00"),
        )
        .await
        .unwrap();

        let outcome = mgr
            .create_event(
                NewEvent {
                    title: "Errand".into(),
                    date: day,
                    start: ClockTime::parse("13:30"),
                    end: ClockTime::parse("14:30"),
                    description: None,
                },
                false,
            )
            .await
            .unwrap();
        // 13:30-14:30 misses the confirmed 10:00-11:00 booking and the
        // pending one does not block time.
        outcome.applied();
    }

    #[tokio::test]
    async fn test_event_validation_rejects_empty_title_and_bad_interval() {
        let mgr = manager();
        let day = date(2025, 3, 10);
        let err = mgr
            .create_event(
                NewEvent {
                    title: "  ".into(),
                    date: day,
                    start: ClockTime::parse("10:00"),
                    end: ClockTime::parse("11:00"),
                    description: None,
                },
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SlotbookError::Validation(_)));

        let err = mgr
            .create_event(
                NewEvent {
                    title: "Backwards".into(),
                    date: day,
                    start: ClockTime::parse("11:00"),
                    end: ClockTime::parse("10:00"),
                    description: None,
                },
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SlotbookError::Validation(_)));
    }

    #[tokio::test]
    async fn test_available_slots_respect_work_priority_toggle() {
        let mgr = manager();
        let service = seed_service(&mgr, 60).await;
        // Monday 2025-03-10; study 09:00-15:00 on week one.
        let cycle_start = date(2025, 3, 10);
        mgr.save_cycle(
            cycle_start,
            vec![CycleDay {
                day_of_week: Weekday::Mon,
                week: CycleWeek::One,
                interval: TimeInterval::parse("09:00", "15:00"),
            }],
            cycle_start,
            false,
        )
        .await
        .unwrap()
        .applied();
        mgr.update_settings(SettingsUpdate {
            work_start: Some(ClockTime::parse("09:00")),
            work_end: Some(ClockTime::parse("20:00")),
            ..Default::default()
        })
        .await
        .unwrap();

        // Study subtracted: nothing available before 15:00.
        let slots = mgr
            .available_slots(cycle_start, &service.id, None)
            .await
            .unwrap();
        assert!(slots
            .iter()
            .filter(|s| s.available)
            .all(|s| s.time >= ClockTime::parse("15:00")));

        // Work priority: study ignored, morning slots open up.
        mgr.update_settings(SettingsUpdate {
            work_priority: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
        let slots = mgr
            .available_slots(cycle_start, &service.id, None)
            .await
            .unwrap();
        assert!(slots
            .iter()
            .any(|s| s.available && s.time < ClockTime::parse("15:00")));
    }

    #[tokio::test]
    async fn test_blocked_date_yields_no_slots() {
        let mgr = manager();
        let service = seed_service(&mgr, 60).await;
        let day = date(2025, 3, 10);
        mgr.block_date(day, false).await.unwrap().applied();
        let slots = mgr.available_slots(day, &service.id, None).await.unwrap();
        assert!(slots.is_empty());
    }

    #[tokio::test]
    async fn test_booked_slot_disappears_from_availability() {
        let mgr = manager();
        let service = seed_service(&mgr, 60).await;
        mgr.update_settings(SettingsUpdate {
            prep_time: Some(15),
            buffer_time: Some(15),
            ..Default::default()
        })
        .await
        .unwrap();
        let day = date(2025, 3, 10);

        let slots = mgr.available_slots(day, &service.id, None).await.unwrap();
        let chosen = slots.iter().find(|s| s.available).unwrap().time;

        let booking = confirmed_booking(&mgr, &service, day, &chosen.to_string()).await;
        // Stored interval is prep/buffer-inclusive around the slot label.
        assert_eq!(booking.interval.start, chosen.add_minutes(-15));
        assert_eq!(booking.interval.end, chosen.add_minutes(75));

        let after = mgr.available_slots(day, &service.id, None).await.unwrap();
        assert!(!after.iter().any(|s| s.time == chosen && s.available));
    }

    #[tokio::test]
    async fn test_save_cycle_conflict_then_force_cancels() {
        let mgr = manager();
        let service = seed_service(&mgr, 60).await;
        let cycle_start = date(2025, 3, 10);
        // Confirmed booking next Monday 10:00-11:00.
        confirmed_booking(&mgr, &service, cycle_start, "10:00").await;

        let days = vec![CycleDay {
            day_of_week: Weekday::Mon,
            week: CycleWeek::One,
            interval: TimeInterval::parse("09:00", "15:00"),
        }];

        let outcome = mgr
            .save_cycle(cycle_start, days.clone(), cycle_start, false)
            .await
            .unwrap();
        assert!(outcome.conflict().is_some());
        assert!(mgr.recurring_schedule().await.unwrap().is_empty());

        let created = mgr
            .save_cycle(cycle_start, days, cycle_start, true)
            .await
            .unwrap()
            .applied();
        assert_eq!(created.len(), 1);
        let bookings = mgr.bookings(Some(cycle_start)).await.unwrap();
        assert_eq!(bookings[0].status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_save_cycle_replaces_previous_entries() {
        let mgr = manager();
        let cycle_start = date(2025, 3, 10);
        let today = cycle_start;

        let first = vec![
            CycleDay {
                day_of_week: Weekday::Mon,
                week: CycleWeek::One,
                interval: TimeInterval::parse("09:00", "12:00"),
            },
            CycleDay {
                day_of_week: Weekday::Tue,
                week: CycleWeek::Two,
                interval: TimeInterval::parse("09:00", "12:00"),
            },
        ];
        mgr.save_cycle(cycle_start, first, today, false)
            .await
            .unwrap()
            .applied();

        let second = vec![CycleDay {
            day_of_week: Weekday::Fri,
            week: CycleWeek::One,
            interval: TimeInterval::parse("13:00", "18:00"),
        }];
        mgr.save_cycle(cycle_start, second, today, false)
            .await
            .unwrap()
            .applied();

        let entries = mgr.recurring_schedule().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].day_of_week, Weekday::Fri);
    }

    #[tokio::test]
    async fn test_update_booking_status_rejects_invalid_transition() {
        let mgr = manager();
        let service = seed_service(&mgr, 60).await;
        let day = date(2025, 3, 10);
        let booking = mgr
            .book_slot(
                Client::new("Anna", "+70000000000", ""),
                &service.id,
                day,
                ClockTime::parse("12:00"),
            )
            .await
            .unwrap();

        // pending -> completed is not a legal transition.
        let err = mgr
            .update_booking_status(&booking.id, BookingStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, SlotbookError::Validation(_)));
    }

    #[tokio::test]
    async fn test_book_slot_requires_name_and_phone() {
        let mgr = manager();
        let service = seed_service(&mgr, 60).await;
        let err = mgr
            .book_slot(
                Client::new("", "+70000000000", ""),
                &service.id,
                date(2025, 3, 10),
                ClockTime::parse("12:00"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SlotbookError::Validation(_)));
    }
}
