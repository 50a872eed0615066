use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Stage failures never surface here; they are folded into the session view as notices.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Recoverable failures of a wizard stage. Each one is shown to the user in place of
/// the expected result; none of them is fatal to the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error("Unsupported file type '{extension}'. Please upload a PDF, DOCX or TXT resume.")]
    UnsupportedFormat { extension: String },

    #[error("Could not read {format} content: {message}")]
    DecodeFailure { format: &'static str, message: String },

    #[error("PDF file is encrypted and decryption failed.")]
    EncryptedDocument,

    #[error("Extracted text from resume is empty.")]
    EmptyExtractedText,

    #[error("The AI service returned an error: {0}")]
    UpstreamApi(String),

    #[error("AI response was not in the expected format: {0}")]
    MalformedStructuredReply(String),

    #[error("AI response was missing or had invalid fields ({}); defaults were used.", fields.join(", "))]
    ValidationDefaulted { fields: Vec<String> },

    #[error("No skills could be extracted from the resume.")]
    NoSkillsFound,

    #[error("The AI service returned an empty coding question.")]
    EmptyQuestion,
}

impl StageError {
    /// Stable machine-readable code carried alongside the message in notices.
    pub fn code(&self) -> &'static str {
        match self {
            StageError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            StageError::DecodeFailure { .. } => "DECODE_FAILURE",
            StageError::EncryptedDocument => "ENCRYPTED_DOCUMENT",
            StageError::EmptyExtractedText => "EMPTY_EXTRACTED_TEXT",
            StageError::UpstreamApi(_) => "UPSTREAM_API_ERROR",
            StageError::MalformedStructuredReply(_) => "MALFORMED_STRUCTURED_REPLY",
            StageError::ValidationDefaulted { .. } => "VALIDATION_DEFAULTED",
            StageError::NoSkillsFound => "NO_SKILLS_FOUND",
            StageError::EmptyQuestion => "EMPTY_QUESTION",
        }
    }
}

/// A wizard transition that is not allowed from the current session state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("No coding question generated yet. Upload and analyze a resume first.")]
    QuestionMissing,

    #[error("No evaluation available yet. Submit code for evaluation first.")]
    EvaluationMissing,

    #[error("Please enter your code solution before submitting.")]
    EmptySubmission,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::EmptySubmission => AppError::Validation(err.to_string()),
            TransitionError::QuestionMissing | TransitionError::EvaluationMissing => {
                AppError::Conflict(err.to_string())
            }
        }
    }
}
