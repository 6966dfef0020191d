//! REST API module for the booking engine.
//!
//! Exposes the schedule, availability, and booking operations over HTTP for
//! the owner dashboard and the client booking flow.

mod handlers;
mod rest;

pub use handlers::*;
pub use rest::*;
