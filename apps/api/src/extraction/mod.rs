//! Resume text extraction: turns uploaded bytes into plain text, per format.
//!
//! Every failure, including panics inside third-party PDF code, comes back as a
//! `StageError`. Nothing raised here escapes to the orchestrator.

pub mod docx;
pub mod pdf;
pub mod plain;

use tracing::{info, warn};

use crate::errors::StageError;
use crate::models::resume::{DocumentFormat, ResumeDocument};

/// Extracts the text of a resume, dispatching on its inferred format.
///
/// Unknown extensions are decoded as plain text. Whitespace-only results are
/// reported as `EmptyExtractedText`.
pub fn extract_text(document: &ResumeDocument) -> Result<String, StageError> {
    let format = document.format();
    let bytes = document.bytes();

    if format == DocumentFormat::Unknown {
        warn!(
            filename = document.filename(),
            "Unsupported file type, attempting plain text decode as fallback"
        );
    }

    let text = match format {
        DocumentFormat::Pdf => pdf::extract(bytes)?,
        DocumentFormat::Docx => docx::extract(bytes)?,
        DocumentFormat::Txt | DocumentFormat::Unknown => plain::decode(bytes),
    };

    if text.trim().is_empty() {
        warn!(
            filename = document.filename(),
            "Extracted text is empty or only whitespace"
        );
        return Err(StageError::EmptyExtractedText);
    }

    info!(
        filename = document.filename(),
        format = format.label(),
        bytes = bytes.len(),
        chars = text.chars().count(),
        "Extracted resume text"
    );

    Ok(text)
}
