//! HTTP API for the Sahayak eligibility assistant.
//!
//! Exposes the session lifecycle (start, answer by text or voice, inspect
//! collected data, skip, delete), the form-automation surface (fill,
//! status, preview, screenshot), and service health/stats.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, start_server};
pub use state::AppState;
