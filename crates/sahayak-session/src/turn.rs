//! One-conversational-turn sequencing.
//!
//! A turn is: record the user input, run the external extractor over it,
//! merge whatever came back, and advance to the next question group. The
//! whole sequence runs under the session's record lock, so two turns on the
//! same id can never interleave; the registry map lock is not held at all
//! while the extractor call is in flight.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use sahayak_core::{ApplicantFields, ChatMessage, Role, UpstreamStatus};

use crate::catalog::{QuestionCatalog, QuestionGroup};
use crate::error::SessionError;
use crate::record::SessionSnapshot;
use crate::registry::SessionRegistry;

/// How many trailing chat history entries accompany each extraction call.
pub const HISTORY_WINDOW: usize = 12;

/// External LLM field-extraction collaborator.
///
/// Failure of any kind (timeout, unreachable service, malformed response)
/// is reported as `None`; the caller treats that as "no new data" and the
/// turn still completes.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(
        &self,
        input: &str,
        history: &[ChatMessage],
    ) -> Option<Map<String, Value>>;

    /// Reachability probe for /health.
    async fn check_health(&self) -> UpstreamStatus {
        UpstreamStatus::Unknown
    }
}

/// Result of one text turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub session_id: Uuid,
    pub fields: ApplicantFields,
    pub updated_fields: Vec<String>,
    pub group_index: usize,
    pub finished: bool,
}

/// Sequences conversational turns against the registry.
pub struct TurnOrchestrator {
    registry: Arc<SessionRegistry>,
    catalog: QuestionCatalog,
    extractor: Arc<dyn Extractor>,
}

impl TurnOrchestrator {
    pub fn new(
        registry: Arc<SessionRegistry>,
        catalog: QuestionCatalog,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        Self {
            registry,
            catalog,
            extractor,
        }
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    pub fn total_groups(&self) -> usize {
        self.catalog.len()
    }

    /// Run one turn: record input, extract, merge, advance.
    ///
    /// Empty input is rejected before any session mutation. Extraction
    /// failure degrades to "zero fields updated" and the group still
    /// advances: progression is paced by turn count, not data yield.
    pub async fn process_turn(
        &self,
        session_id: Uuid,
        input: &str,
    ) -> Result<TurnOutcome, SessionError> {
        if input.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let handle = self.registry.get(session_id)?;
        let mut record = handle.lock().await;

        record.add_message(Role::User, input);
        let window: Vec<ChatMessage> = record.recent_history(HISTORY_WINDOW).to_vec();

        let candidate = self.extractor.extract(input, &window).await;

        let mut updated_fields = Vec::new();
        match candidate {
            Some(map) if !map.is_empty() => {
                updated_fields = record.update_fields(&map);
                let audit = serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string());
                record.add_message(Role::Assistant, format!("Extracted: {audit}"));
                debug!(
                    session_id = %session_id,
                    updated = updated_fields.len(),
                    "Turn extracted fields"
                );
            }
            Some(_) => {
                debug!(session_id = %session_id, "Extractor returned an empty candidate map");
            }
            None => {
                warn!(session_id = %session_id, "Extraction unavailable; turn advances with no new data");
            }
        }

        record.advance_group();

        Ok(TurnOutcome {
            session_id,
            fields: record.fields.clone(),
            updated_fields,
            group_index: record.group_index,
            finished: record.group_index >= self.catalog.len(),
        })
    }

    /// Advance exactly as a turn would, without extraction.
    pub async fn skip_group(&self, session_id: Uuid) -> Result<TurnOutcome, SessionError> {
        let handle = self.registry.get(session_id)?;
        let mut record = handle.lock().await;
        record.advance_group();
        Ok(TurnOutcome {
            session_id,
            fields: record.fields.clone(),
            updated_fields: Vec::new(),
            group_index: record.group_index,
            finished: record.group_index >= self.catalog.len(),
        })
    }

    /// Current question group for the session, or None once exhausted.
    pub async fn current_group(
        &self,
        session_id: Uuid,
    ) -> Result<Option<QuestionGroup>, SessionError> {
        let handle = self.registry.get(session_id)?;
        let record = handle.lock().await;
        Ok(self.catalog.group_at(record.group_index))
    }

    /// Read-only copy of the session state.
    pub async fn snapshot(&self, session_id: Uuid) -> Result<SessionSnapshot, SessionError> {
        let handle = self.registry.get(session_id)?;
        let record = handle.lock().await;
        Ok(record.snapshot())
    }
}
