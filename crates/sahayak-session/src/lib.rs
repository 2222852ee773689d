//! Session lifecycle engine for the Sahayak questionnaire.
//!
//! Provides the fixed question-group catalog, per-conversation session
//! records, the concurrency-safe time-evicted registry, and the turn
//! orchestrator that folds LLM extraction results into session data.

pub mod catalog;
pub mod error;
pub mod record;
pub mod registry;
pub mod turn;

pub use catalog::{GroupSpec, QuestionCatalog, QuestionGroup};
pub use error::SessionError;
pub use record::{SessionRecord, SessionSnapshot};
pub use registry::{RegistryStats, SessionHandle, SessionRegistry};
pub use turn::{Extractor, TurnOrchestrator, TurnOutcome, HISTORY_WINDOW};
