//! REST API request handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{SlotbookError, StoreError};
use crate::schedule::{
    Booking, BookingStatus, Client, ClockTime, ConflictReport, CycleDay, NewEvent, Outcome,
    ScheduleManager, Service, SettingsUpdate,
};
use crate::store::ScheduleStore;

/// Application state shared across handlers.
pub struct ApiState<S: ScheduleStore> {
    /// Schedule manager for operations.
    pub manager: ScheduleManager<S>,
}

impl<S: ScheduleStore> ApiState<S> {
    /// Create new API state.
    pub fn new(manager: ScheduleManager<S>) -> Self {
        Self { manager }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Save-cycle request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveCycleRequest {
    pub days: Vec<CycleDay>,
    /// Cancel colliding confirmed bookings instead of reporting them.
    #[serde(default)]
    pub force: bool,
}

/// Create-event request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    #[serde(flatten)]
    pub event: NewEvent,
    #[serde(default)]
    pub force: bool,
}

/// Block-date request body.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockDateRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub force: bool,
}

/// Create-booking request body (client booking flow).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub time: ClockTime,
}

/// Booking status update body.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingStatusRequest {
    pub status: BookingStatus,
}

/// Date filter query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Slot listing query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    pub service_id: String,
    /// Current wall-clock time; slots at or before it are marked unavailable.
    #[serde(default)]
    pub now: Option<ClockTime>,
}

/// Conflict response, returned with 409 when a mutation collides with
/// confirmed bookings and `force` was not set.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictResponse {
    pub conflict: bool,
    pub message: String,
    pub bookings: Vec<Booking>,
}

impl ConflictResponse {
    fn from_report(report: ConflictReport) -> Self {
        Self {
            conflict: true,
            message: report.message,
            bookings: report.bookings,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Deletion response.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
}

fn error_response(err: SlotbookError) -> Response {
    let (status, code) = match &err {
        SlotbookError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
        SlotbookError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
        SlotbookError::Store(StoreError::Unavailable(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

fn outcome_response<T: Serialize>(outcome: Outcome<T>, applied_status: StatusCode) -> Response {
    match outcome {
        Outcome::Applied(value) => (applied_status, Json(value)).into_response(),
        Outcome::Conflict(report) => (
            StatusCode::CONFLICT,
            Json(ConflictResponse::from_report(report)),
        )
            .into_response(),
    }
}

// ============================================================================
// Recurring schedule handlers
// ============================================================================

/// GET /api/v1/schedule - List all recurring entries.
pub async fn get_schedule_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
) -> Response {
    match state.manager.recurring_schedule().await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/v1/schedule/:cycle_start - Replace one cycle's entries.
pub async fn save_cycle_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Path(cycle_start): Path<NaiveDate>,
    Json(request): Json<SaveCycleRequest>,
) -> Response {
    let today = chrono::Local::now().date_naive();
    match state
        .manager
        .save_cycle(cycle_start, request.days, today, request.force)
        .await
    {
        Ok(outcome) => outcome_response(outcome, StatusCode::OK),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/v1/schedule/:cycle_start - Delete one cycle's entries.
pub async fn delete_cycle_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Path(cycle_start): Path<NaiveDate>,
) -> Response {
    match state.manager.delete_cycle(cycle_start).await {
        Ok(_) => (StatusCode::OK, Json(DeletedResponse { success: true })).into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Event handlers
// ============================================================================

/// GET /api/v1/events?date=... - List events.
pub async fn list_events_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Query(params): Query<DateQuery>,
) -> Response {
    match state.manager.events(params.date).await {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/events - Create a one-off event.
pub async fn create_event_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Json(request): Json<CreateEventRequest>,
) -> Response {
    match state.manager.create_event(request.event, request.force).await {
        Ok(outcome) => outcome_response(outcome, StatusCode::CREATED),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/v1/events/:id - Delete an event.
pub async fn delete_event_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<String>,
) -> Response {
    match state.manager.delete_event(&id).await {
        Ok(true) => (StatusCode::OK, Json(DeletedResponse { success: true })).into_response(),
        Ok(false) => error_response(StoreError::NotFound(format!("event {id}")).into()),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Blocked date handlers
// ============================================================================

/// GET /api/v1/blocked-dates - List blocked dates.
pub async fn list_blocked_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
) -> Response {
    match state.manager.blocked_dates().await {
        Ok(blocked) => (StatusCode::OK, Json(blocked)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/blocked-dates - Block a date.
pub async fn block_date_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Json(request): Json<BlockDateRequest>,
) -> Response {
    match state.manager.block_date(request.date, request.force).await {
        Ok(outcome) => outcome_response(outcome, StatusCode::CREATED),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/v1/blocked-dates/:id - Unblock a date.
pub async fn unblock_date_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<String>,
) -> Response {
    match state.manager.unblock_date(&id).await {
        Ok(true) => (StatusCode::OK, Json(DeletedResponse { success: true })).into_response(),
        Ok(false) => error_response(StoreError::NotFound(format!("blocked date {id}")).into()),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Booking handlers
// ============================================================================

/// GET /api/v1/bookings?date=... - List bookings.
pub async fn list_bookings_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Query(params): Query<DateQuery>,
) -> Response {
    match state.manager.bookings(params.date).await {
        Ok(bookings) => (StatusCode::OK, Json(bookings)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/bookings - Book a slot for a client.
pub async fn create_booking_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Json(request): Json<CreateBookingRequest>,
) -> Response {
    let client = Client::new(request.name, request.phone, request.email);
    match state
        .manager
        .book_slot(client, &request.service_id, request.date, request.time)
        .await
    {
        Ok(booking) => (StatusCode::CREATED, Json(booking)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/v1/bookings/:id/status - Update a booking's lifecycle status.
pub async fn update_booking_status_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<String>,
    Json(request): Json<BookingStatusRequest>,
) -> Response {
    match state.manager.update_booking_status(&id, request.status).await {
        Ok(booking) => (StatusCode::OK, Json(booking)).into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Availability, service, and settings handlers
// ============================================================================

/// GET /api/v1/slots?date=...&service_id=... - The candidate slot grid.
pub async fn list_slots_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Query(params): Query<SlotsQuery>,
) -> Response {
    match state
        .manager
        .available_slots(params.date, &params.service_id, params.now)
        .await
    {
        Ok(slots) => (StatusCode::OK, Json(slots)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/v1/services - List services.
pub async fn list_services_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
) -> Response {
    match state.manager.services().await {
        Ok(services) => (StatusCode::OK, Json(services)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/services - Register a service.
pub async fn create_service_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Json(service): Json<NewServiceRequest>,
) -> Response {
    if service.name.trim().is_empty() || service.duration_minutes == 0 {
        return error_response(SlotbookError::Validation(
            "service needs a name and a positive duration".into(),
        ));
    }
    let service = Service::new(service.name, service.duration_minutes, service.price);
    match state.manager.create_service(service).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Create-service request body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceRequest {
    pub name: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub price: String,
}

/// GET /api/v1/settings - Current booking settings.
pub async fn get_settings_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
) -> Response {
    match state.manager.settings().await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/v1/settings - Partially update booking settings.
pub async fn update_settings_handler<S: ScheduleStore>(
    State(state): State<Arc<ApiState<S>>>,
    Json(update): Json<SettingsUpdate>,
) -> Response {
    match state.manager.update_settings(update).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => error_response(e),
    }
}
