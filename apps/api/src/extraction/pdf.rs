use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, warn};

use crate::errors::StageError;

const FORMAT: &str = "PDF";

/// Extracts the text of every page, joined with newlines.
///
/// Encrypted documents are opened with the empty password, which is how most
/// "protected" resumes exported from word processors are locked. When the
/// page-level pass finds no text, `pdf-extract` gets a second try on the raw bytes.
pub fn extract(bytes: &[u8]) -> Result<String, StageError> {
    let text = guarded(|| extract_pages(bytes))?;
    if !text.trim().is_empty() {
        return Ok(text);
    }

    debug!("Page-level PDF extraction produced no text, trying pdf-extract");
    match guarded(|| {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| decode_failure(e.to_string()))
    }) {
        Ok(fallback) => Ok(fallback),
        Err(e) => {
            warn!("pdf-extract fallback failed: {e}");
            Ok(text)
        }
    }
}

fn extract_pages(bytes: &[u8]) -> Result<String, StageError> {
    let mut doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) if declares_encryption(bytes) => {
            warn!("Encrypted PDF could not be opened: {e}");
            return Err(StageError::EncryptedDocument);
        }
        Err(e) => return Err(decode_failure(e.to_string())),
    };

    if doc.is_encrypted() {
        if let Err(e) = doc.decrypt("") {
            warn!("PDF is encrypted and could not be decrypted with an empty password: {e}");
            return Err(StageError::EncryptedDocument);
        }
        debug!("Decrypted PDF with empty password");
    }

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text.trim_end().to_string()),
            Ok(_) => {}
            Err(e) => warn!("Failed to extract text from page {page_number}: {e}"),
        }
    }

    Ok(pages.join("\n"))
}

/// Whether the trailer references a security handler, even if the parser gave up on it.
fn declares_encryption(bytes: &[u8]) -> bool {
    bytes.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt")
}

/// Runs third-party PDF code, converting a panic into a decode failure.
fn guarded<F>(f: F) -> Result<String, StageError>
where
    F: FnOnce() -> Result<String, StageError>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "PDF parser panicked".to_string());
        Err(decode_failure(message))
    })
}

fn decode_failure(message: String) -> StageError {
    StageError::DecodeFailure {
        format: FORMAT,
        message,
    }
}
