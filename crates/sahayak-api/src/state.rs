//! Application state shared across all route handlers.
//!
//! AppState holds the registry, the two orchestrators, and the external
//! collaborators. It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use sahayak_core::config::SahayakConfig;
use sahayak_form::{FormFiller, FormFillingOrchestrator};
use sahayak_session::{Extractor, QuestionCatalog, SessionRegistry, TurnOrchestrator};
use sahayak_speech::SpeechTranscriber;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<SahayakConfig>,
    /// Session store with TTL eviction.
    pub registry: Arc<SessionRegistry>,
    /// Conversational turn sequencing.
    pub turns: Arc<TurnOrchestrator>,
    /// LLM field extraction (health probing only; turns own the calls).
    pub extractor: Arc<dyn Extractor>,
    /// Speech-to-text for voice answers.
    pub transcriber: Arc<dyn SpeechTranscriber>,
    /// Bounded form-automation driver.
    pub form: Arc<FormFillingOrchestrator>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Wire the full engine from config and the external collaborators.
    pub fn new(
        config: SahayakConfig,
        extractor: Arc<dyn Extractor>,
        transcriber: Arc<dyn SpeechTranscriber>,
        filler: Arc<dyn FormFiller>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(config.session.timeout_minutes));
        let turns = Arc::new(TurnOrchestrator::new(
            Arc::clone(&registry),
            QuestionCatalog::standard(),
            Arc::clone(&extractor),
        ));
        let form = Arc::new(FormFillingOrchestrator::new(
            Arc::clone(&registry),
            filler,
            config.form.max_concurrent_fills,
            config.form.screenshots_dir.clone(),
        ));
        Self {
            config: Arc::new(config),
            registry,
            turns,
            extractor,
            transcriber,
            form,
            start_time: Instant::now(),
        }
    }
}
