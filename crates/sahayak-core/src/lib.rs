//! Core types for the Sahayak scholarship assistant.
//!
//! Holds the configuration model, the top-level error type, shared status
//! enums, and the canonical 17-field applicant schema with its merge policy.

pub mod config;
pub mod error;
pub mod schema;
pub mod types;

pub use config::SahayakConfig;
pub use error::{Result, SahayakError};
pub use schema::{ApplicantFields, FIELD_COUNT, FIELD_KEYS};
pub use types::{ChatMessage, FillingState, Role, SessionStatus, UpstreamStatus};
