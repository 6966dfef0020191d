//! REST API router and configuration.

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{delete, get, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers::{
    block_date_handler, create_booking_handler, create_event_handler, create_service_handler,
    delete_cycle_handler, delete_event_handler, get_schedule_handler, get_settings_handler,
    list_blocked_handler, list_bookings_handler, list_events_handler, list_services_handler,
    list_slots_handler, save_cycle_handler, unblock_date_handler, update_booking_status_handler,
    update_settings_handler, ApiState,
};
use crate::schedule::ScheduleManager;
use crate::store::ScheduleStore;

/// REST API configuration.
#[derive(Debug, Clone)]
pub struct RestApiConfig {
    /// Enable CORS.
    pub enable_cors: bool,
    /// API prefix (e.g., "/api/v1").
    pub prefix: String,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            prefix: "/api/v1".to_string(),
        }
    }
}

/// Create the REST API router.
///
/// Endpoints:
/// - GET    /api/v1/schedule                 - List recurring entries
/// - PUT    /api/v1/schedule/:cycle_start    - Replace one cycle's entries
/// - DELETE /api/v1/schedule/:cycle_start    - Delete one cycle's entries
/// - GET    /api/v1/events?date=...          - List events
/// - POST   /api/v1/events                   - Create a one-off event
/// - DELETE /api/v1/events/:id               - Delete an event
/// - GET    /api/v1/blocked-dates            - List blocked dates
/// - POST   /api/v1/blocked-dates            - Block a date
/// - DELETE /api/v1/blocked-dates/:id        - Unblock a date
/// - GET    /api/v1/bookings?date=...        - List bookings
/// - POST   /api/v1/bookings                 - Book a slot
/// - PUT    /api/v1/bookings/:id/status      - Update booking status
/// - GET    /api/v1/slots?date&service_id    - Candidate slot grid
/// - GET    /api/v1/services                 - List services
/// - POST   /api/v1/services                 - Register a service
/// - GET    /api/v1/settings                 - Booking settings
/// - PUT    /api/v1/settings                 - Update booking settings
///
/// Mutations that collide with confirmed bookings return 409 with a
/// `{ "conflict": true, ... }` payload unless the request set `force`.
pub fn create_rest_router<S: ScheduleStore + 'static>(
    manager: ScheduleManager<S>,
    config: &RestApiConfig,
) -> Router {
    let state = Arc::new(ApiState::new(manager));

    let api_routes = Router::new()
        .route("/schedule", get(get_schedule_handler::<S>))
        .route(
            "/schedule/:cycle_start",
            put(save_cycle_handler::<S>).delete(delete_cycle_handler::<S>),
        )
        .route(
            "/events",
            get(list_events_handler::<S>).post(create_event_handler::<S>),
        )
        .route("/events/:id", delete(delete_event_handler::<S>))
        .route(
            "/blocked-dates",
            get(list_blocked_handler::<S>).post(block_date_handler::<S>),
        )
        .route("/blocked-dates/:id", delete(unblock_date_handler::<S>))
        .route(
            "/bookings",
            get(list_bookings_handler::<S>).post(create_booking_handler::<S>),
        )
        .route(
            "/bookings/:id/status",
            put(update_booking_status_handler::<S>),
        )
        .route("/slots", get(list_slots_handler::<S>))
        .route(
            "/services",
            get(list_services_handler::<S>).post(create_service_handler::<S>),
        )
        .route(
            "/settings",
            get(get_settings_handler::<S>).put(update_settings_handler::<S>),
        )
        .with_state(state);

    // Build the full router with prefix
    let router = Router::new().nest(&config.prefix, api_routes);

    // Add CORS if enabled
    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_origin(Any);

        router.layer(cors)
    } else {
        router
    }
}
