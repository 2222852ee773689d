//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path/body parameters via axum extractors, drives
//! the session or form orchestrator, and returns JSON responses.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sahayak_core::{ApplicantFields, SessionStatus, UpstreamStatus, FIELD_COUNT};
use sahayak_form::{FormPreview, FormStatus};
use sahayak_session::QuestionGroup;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct TextInput {
    pub text: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub current_group_index: usize,
    pub total_groups: usize,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub session_id: Uuid,
    pub group: Option<QuestionGroup>,
    pub finished: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TurnResponse {
    pub session_id: Uuid,
    pub input_text: String,
    pub fields: ApplicantFields,
    pub updated_fields: Vec<String>,
    pub current_group_index: usize,
    pub finished: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub session_id: Uuid,
    pub transcription: String,
    pub turn: TurnResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub fields: ApplicantFields,
    pub fields_filled: usize,
    pub total_fields: usize,
    pub completion_percentage: f64,
    pub current_group_index: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub session_id: Uuid,
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormFillingResponse {
    pub session_id: Uuid,
    pub status: FormStatus,
    pub message: String,
    pub screenshot_url: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ollama_status: String,
    pub bhashini_status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub description: String,
}

// =============================================================================
// Session endpoints
// =============================================================================

/// POST /session/start - allocate a fresh session.
pub async fn start_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (session_id, handle) = state.registry.create().map_err(ApiError::from)?;
    let record = handle.lock().await;
    tracing::info!(session_id = %session_id, "Session started");
    Ok(Json(SessionResponse {
        session_id,
        status: record.status,
        created_at: record.created_at,
        current_group_index: record.group_index,
        total_groups: state.turns.total_groups(),
        message: "Session created. Fetch the current questions to begin.".to_string(),
    }))
}

/// GET /session/{id} - session overview.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let snapshot = state.turns.snapshot(id).await?;
    Ok(Json(SessionResponse {
        session_id: snapshot.id,
        status: snapshot.status,
        created_at: snapshot.created_at,
        current_group_index: snapshot.group_index,
        total_groups: state.turns.total_groups(),
        message: String::new(),
    }))
}

/// GET /session/{id}/questions - current question group.
pub async fn get_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuestionsResponse>, ApiError> {
    let group = state.turns.current_group(id).await?;
    let finished = group.is_none();
    Ok(Json(QuestionsResponse {
        session_id: id,
        group,
        finished,
    }))
}

/// POST /session/{id}/text - answer the current group in text.
pub async fn process_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TextInput>,
) -> Result<Json<TurnResponse>, ApiError> {
    let outcome = state.turns.process_turn(id, &input.text).await?;
    Ok(Json(turn_response(input.text, outcome)))
}

/// POST /session/{id}/audio - answer the current group by voice.
///
/// The raw request body is the audio (WAV). It is transcribed first and
/// then processed exactly like a text turn.
pub async fn process_audio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Empty audio body".to_string()));
    }

    // Fail before touching the session so a bad recording costs nothing.
    let Some(text) = state.transcriber.transcribe(&body).await else {
        return Err(ApiError::BadRequest(
            "Could not transcribe audio; please try again".to_string(),
        ));
    };

    let outcome = state.turns.process_turn(id, &text).await?;
    Ok(Json(TranscriptionResponse {
        session_id: id,
        transcription: text.clone(),
        turn: turn_response(text, outcome),
    }))
}

/// GET /session/{id}/data - everything collected so far.
pub async fn get_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataResponse>, ApiError> {
    let snapshot = state.turns.snapshot(id).await?;
    Ok(Json(DataResponse {
        session_id: snapshot.id,
        status: snapshot.status,
        fields_filled: snapshot.fields.filled_count(),
        total_fields: FIELD_COUNT,
        completion_percentage: snapshot.fields.completion_percentage(),
        current_group_index: snapshot.group_index,
        fields: snapshot.fields,
    }))
}

/// POST /session/{id}/skip - move past the current group without answering.
pub async fn skip_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TurnResponse>, ApiError> {
    let outcome = state.turns.skip_group(id).await?;
    Ok(Json(turn_response(String::new(), outcome)))
}

/// DELETE /session/{id} - drop the session and its data.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.registry.delete(id).map_err(ApiError::from)?;
    if !deleted {
        return Err(ApiError::NotFound(format!(
            "Session not found or expired: {id}"
        )));
    }
    Ok(Json(DeleteResponse {
        session_id: id,
        deleted,
    }))
}

fn turn_response(input_text: String, outcome: sahayak_session::TurnOutcome) -> TurnResponse {
    let message = if outcome.finished {
        "All question groups are done. You can review your data and fill the form.".to_string()
    } else if outcome.updated_fields.is_empty() {
        "Noted. Moving on to the next questions.".to_string()
    } else {
        format!("Recorded {} field(s).", outcome.updated_fields.len())
    };
    TurnResponse {
        session_id: outcome.session_id,
        input_text,
        fields: outcome.fields,
        updated_fields: outcome.updated_fields,
        current_group_index: outcome.group_index,
        finished: outcome.finished,
        message,
    }
}

// =============================================================================
// Form endpoints
// =============================================================================

/// POST /form/{id}/fill - run the browser automation for a session.
pub async fn fill_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormFillingResponse>, ApiError> {
    let report = state.form.fill(id).await?;
    Ok(Json(form_response(report)))
}

/// GET /form/{id}/status - current reported form status.
pub async fn form_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormFillingResponse>, ApiError> {
    let report = state.form.status(id).await?;
    Ok(Json(form_response(report)))
}

/// GET /form/{id}/preview - what the automation would type and select.
pub async fn form_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormPreview>, ApiError> {
    Ok(Json(state.form.preview(id).await?))
}

/// GET /form/{id}/screenshot - newest screenshot as a PNG.
pub async fn form_screenshot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let path = state
        .form
        .latest_screenshot(id)
        .await
        .map_err(|_| ApiError::NotFound(format!("No screenshot for session {id}")))?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read screenshot: {e}")))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

fn form_response(report: sahayak_form::FillReport) -> FormFillingResponse {
    let screenshot_url = report
        .screenshot_path
        .as_ref()
        .map(|_| format!("/form/{}/screenshot", report.session_id));
    FormFillingResponse {
        session_id: report.session_id,
        status: report.status,
        message: report.message,
        screenshot_url,
        errors: report.errors,
    }
}

// =============================================================================
// Service endpoints
// =============================================================================

/// GET / - service identity.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "sahayak".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Voice/text assistant for the scholarship eligibility form".to_string(),
    })
}

/// GET /health - upstream reachability.
///
/// The service is "healthy" only when extraction is usable; a broken
/// speech pipeline degrades voice input but text still works.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let ollama = state.extractor.check_health().await;
    let bhashini = state.transcriber.check_health().await;
    let status = if ollama == UpstreamStatus::Healthy {
        "healthy"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ollama_status: ollama.as_str().to_string(),
        bhashini_status: bhashini.as_str().to_string(),
    })
}

/// GET /stats - registry counts and uptime.
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.registry.stats().map_err(ApiError::from)?;
    Ok(Json(StatsResponse {
        total_sessions: stats.total_sessions,
        active_sessions: stats.active_sessions,
        uptime_secs: state.start_time.elapsed().as_secs(),
    }))
}
