//! Axum route handlers for the interview wizard.
//!
//! Stage failures come back as `200` with error notices on the session view;
//! only requests the wizard cannot accept at all map to an `AppError`.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, StageError, TransitionError};
use crate::interview::orchestrator::{analyze_resume, evaluate_submission, AnalysisOutcome};
use crate::interview::report::{render_evaluation_markdown, SessionView};
use crate::interview::session::Stage;
use crate::models::interview::{CodeSubmission, Difficulty, EditorSettings};
use crate::models::resume::{extension_of, ResumeDocument};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EditorUpdateRequest {
    pub language: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    pub code: String,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub stage: Stage,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub api_key_configured: bool,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

/// Fields pulled out of the resume upload form.
struct ResumeUpload {
    filename: String,
    bytes: Bytes,
    difficulty: Difficulty,
    language: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/status
pub async fn handle_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        api_key_configured: state.config.gemini_api_key.is_some(),
        model: state.config.gemini_model.clone(),
        warning: state.config.api_key_warning(),
    })
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session.into()))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.get(id).await?.into()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/resume
///
/// Multipart form: `file` (required), `difficulty` and `language` (optional).
/// Runs stage 1: extraction, profile analysis and question generation.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let upload = read_resume_upload(multipart, state.config.max_upload_bytes).await?;

    let language = upload
        .language
        .unwrap_or_else(|| session.editor.language.clone());
    // Saved before the slow part so a concurrent restart or upload supersedes it.
    let session = state
        .sessions
        .save(session.begin_analysis(&upload.filename, &language))
        .await?;

    let document = ResumeDocument::new(upload.bytes, upload.filename);
    let outcome = if document.format().is_accepted_upload() {
        analyze_resume(state.llm.as_ref(), document, upload.difficulty, &language).await
    } else {
        AnalysisOutcome::Failed {
            error: StageError::UnsupportedFormat {
                extension: extension_of(document.filename()).unwrap_or_default(),
            },
        }
    };

    let session = state.sessions.save(session.with_analysis(outcome)).await?;
    info!(session_id = %id, progress = session.progress(), "Resume stage finished");
    Ok(Json(session.into()))
}

/// PUT /api/v1/sessions/:id/editor
pub async fn handle_update_editor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EditorUpdateRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let editor = EditorSettings {
        language: request
            .language
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| session.editor.language.clone()),
        code: request.code.unwrap_or_else(|| session.editor.code.clone()),
    };
    let session = state.sessions.save(session.with_editor(editor)).await?;
    Ok(Json(session.into()))
}

/// POST /api/v1/sessions/:id/submission
///
/// Runs stage 2. Rejected with 409 until stage 1 has produced a question, and when
/// the session starts over while the evaluation is running.
pub async fn handle_submit_code(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmissionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let submission = CodeSubmission {
        language: request
            .language
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| session.editor.language.clone()),
        text: request.code,
    };
    session.check_submission(&submission)?;

    let question = session
        .question
        .clone()
        .ok_or(TransitionError::QuestionMissing)?;
    let outcome = evaluate_submission(state.llm.as_ref(), &question, &submission).await;

    let session = state
        .sessions
        .save(session.with_submission(submission, outcome))
        .await?;
    Ok(Json(session.into()))
}

/// POST /api/v1/sessions/:id/navigate
pub async fn handle_navigate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let session = state.sessions.save(session.navigate(request.stage)?).await?;
    Ok(Json(session.into()))
}

/// POST /api/v1/sessions/:id/restart
pub async fn handle_restart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let session = state.sessions.save(session.restart()).await?;
    info!(session_id = %id, "Session restarted");
    Ok(Json(session.into()))
}

/// GET /api/v1/sessions/:id/feedback
///
/// The latest evaluation as a markdown report.
pub async fn handle_feedback_markdown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(id).await?;
    let evaluation = session
        .evaluation
        .as_ref()
        .ok_or(TransitionError::EvaluationMissing)?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_evaluation_markdown(evaluation),
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart parsing
// ────────────────────────────────────────────────────────────────────────────

async fn read_resume_upload(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<ResumeUpload, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut difficulty = Difficulty::default();
    let mut language = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|name| !name.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::Validation("Uploaded file must have a filename".to_string())
                    })?;
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.len() > max_upload_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "Resume is {} bytes; the limit is {max_upload_bytes} bytes",
                        bytes.len()
                    )));
                }
                file = Some((filename, bytes));
            }
            "difficulty" => {
                let raw = field.text().await.map_err(multipart_error)?;
                difficulty = raw.parse().map_err(AppError::Validation)?;
            }
            "language" => {
                let raw = field.text().await.map_err(multipart_error)?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    language = Some(raw.to_string());
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| {
        AppError::Validation("Missing 'file' field with the resume (PDF, DOCX or TXT)".to_string())
    })?;

    Ok(ResumeUpload {
        filename,
        bytes,
        difficulty,
        language,
    })
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}
