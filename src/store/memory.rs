//! Embedded in-memory store backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::schedule::types::{
    BlockedDate, Booking, BookingSettings, BookingStatus, CalendarEvent, Client, RecurringEntry,
    Service, SettingsUpdate,
};

use super::traits::ScheduleStore;

#[derive(Debug, Default)]
struct Inner {
    recurring: HashMap<String, RecurringEntry>,
    events: HashMap<String, CalendarEvent>,
    blocked: HashMap<String, BlockedDate>,
    bookings: HashMap<String, Booking>,
    clients: HashMap<String, Client>,
    services: HashMap<String, Service>,
    settings: BookingSettings,
}

/// In-memory [`ScheduleStore`] backed by a `tokio::sync::RwLock`.
///
/// Used by the server binary as its default backend and by tests as a
/// stand-in for the remote persistence layer.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with settings (typically from the config file).
    pub fn with_settings(settings: BookingSettings) -> Self {
        Self {
            inner: RwLock::new(Inner {
                settings,
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn list_recurring(&self) -> Result<Vec<RecurringEntry>> {
        let inner = self.inner.read().await;
        let mut entries: Vec<_> = inner.recurring.values().cloned().collect();
        entries.sort_by(|a, b| {
            (a.cycle_start, u8::from(a.week), a.day_of_week.num_days_from_monday()).cmp(&(
                b.cycle_start,
                u8::from(b.week),
                b.day_of_week.num_days_from_monday(),
            ))
        });
        Ok(entries)
    }

    async fn create_recurring(&self, entry: RecurringEntry) -> Result<RecurringEntry> {
        let mut inner = self.inner.write().await;
        inner.recurring.insert(entry.id.clone(), entry.clone());
        debug!(id = %entry.id, day = ?entry.day_of_week, "created recurring entry");
        Ok(entry)
    }

    async fn delete_recurring(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.recurring.remove(id).is_some())
    }

    async fn list_events(&self, date: Option<NaiveDate>) -> Result<Vec<CalendarEvent>> {
        let inner = self.inner.read().await;
        let mut events: Vec<_> = inner
            .events
            .values()
            .filter(|e| date.map_or(true, |d| e.date == d))
            .cloned()
            .collect();
        events.sort_by(|a, b| (a.date, a.interval.start).cmp(&(b.date, b.interval.start)));
        Ok(events)
    }

    async fn create_event(&self, event: CalendarEvent) -> Result<CalendarEvent> {
        let mut inner = self.inner.write().await;
        inner.events.insert(event.id.clone(), event.clone());
        debug!(id = %event.id, title = %event.title, "created calendar event");
        Ok(event)
    }

    async fn delete_event(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.events.remove(id).is_some())
    }

    async fn list_blocked(&self) -> Result<Vec<BlockedDate>> {
        let inner = self.inner.read().await;
        let mut blocked: Vec<_> = inner.blocked.values().cloned().collect();
        blocked.sort_by_key(|b| b.date);
        Ok(blocked)
    }

    async fn create_blocked(&self, blocked: BlockedDate) -> Result<BlockedDate> {
        let mut inner = self.inner.write().await;
        inner.blocked.insert(blocked.id.clone(), blocked.clone());
        debug!(id = %blocked.id, date = %blocked.date, "blocked date");
        Ok(blocked)
    }

    async fn delete_blocked(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.blocked.remove(id).is_some())
    }

    async fn list_bookings(&self, date: Option<NaiveDate>) -> Result<Vec<Booking>> {
        let inner = self.inner.read().await;
        let mut bookings: Vec<_> = inner
            .bookings
            .values()
            .filter(|b| date.map_or(true, |d| b.date == d))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| (a.date, a.interval.start).cmp(&(b.date, b.interval.start)));
        Ok(bookings)
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>> {
        let inner = self.inner.read().await;
        Ok(inner.bookings.get(id).cloned())
    }

    async fn create_booking(&self, booking: Booking) -> Result<Booking> {
        let mut inner = self.inner.write().await;
        inner.bookings.insert(booking.id.clone(), booking.clone());
        debug!(id = %booking.id, date = %booking.date, "created booking");
        Ok(booking)
    }

    async fn set_booking_status(&self, id: &str, status: BookingStatus) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.bookings.get_mut(id) {
            Some(booking) => {
                booking.status = status;
                debug!(id, ?status, "updated booking status");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_client(&self, client: Client) -> Result<Client> {
        let mut inner = self.inner.write().await;
        inner.clients.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        let inner = self.inner.read().await;
        let mut services: Vec<_> = inner.services.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get_service(&self, id: &str) -> Result<Option<Service>> {
        let inner = self.inner.read().await;
        Ok(inner.services.get(id).cloned())
    }

    async fn create_service(&self, service: Service) -> Result<Service> {
        let mut inner = self.inner.write().await;
        inner.services.insert(service.id.clone(), service.clone());
        Ok(service)
    }

    async fn get_settings(&self) -> Result<BookingSettings> {
        let inner = self.inner.read().await;
        Ok(inner.settings.clone())
    }

    async fn update_settings(&self, update: SettingsUpdate) -> Result<BookingSettings> {
        let mut inner = self.inner.write().await;
        update.apply_to(&mut inner.settings);
        Ok(inner.settings.clone())
    }
}
