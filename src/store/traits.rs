//! Store trait definition.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::schedule::types::{
    BlockedDate, Booking, BookingSettings, BookingStatus, CalendarEvent, Client, RecurringEntry,
    Service, SettingsUpdate,
};

/// Contract with the persistence layer.
///
/// Methods are plain CRUD over the engine's entities; all policy (conflict
/// detection, force-override, lifecycle enforcement) lives above the store in
/// [`crate::schedule::ScheduleManager`]. Implementations must make each call
/// atomic: a failed call applies nothing.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    // Recurring schedule
    async fn list_recurring(&self) -> Result<Vec<RecurringEntry>>;
    async fn create_recurring(&self, entry: RecurringEntry) -> Result<RecurringEntry>;
    async fn delete_recurring(&self, id: &str) -> Result<bool>;

    // Calendar events
    async fn list_events(&self, date: Option<NaiveDate>) -> Result<Vec<CalendarEvent>>;
    async fn create_event(&self, event: CalendarEvent) -> Result<CalendarEvent>;
    async fn delete_event(&self, id: &str) -> Result<bool>;

    // Blocked dates
    async fn list_blocked(&self) -> Result<Vec<BlockedDate>>;
    async fn create_blocked(&self, blocked: BlockedDate) -> Result<BlockedDate>;
    async fn delete_blocked(&self, id: &str) -> Result<bool>;

    // Bookings
    async fn list_bookings(&self, date: Option<NaiveDate>) -> Result<Vec<Booking>>;
    async fn get_booking(&self, id: &str) -> Result<Option<Booking>>;
    async fn create_booking(&self, booking: Booking) -> Result<Booking>;
    async fn set_booking_status(&self, id: &str, status: BookingStatus) -> Result<bool>;

    // Clients and services
    async fn create_client(&self, client: Client) -> Result<Client>;
    async fn list_services(&self) -> Result<Vec<Service>>;
    async fn get_service(&self, id: &str) -> Result<Option<Service>>;
    async fn create_service(&self, service: Service) -> Result<Service>;

    // Settings
    async fn get_settings(&self) -> Result<BookingSettings>;
    async fn update_settings(&self, update: SettingsUpdate) -> Result<BookingSettings>;
}
