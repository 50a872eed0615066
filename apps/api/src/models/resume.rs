use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// File format of an uploaded resume, inferred from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
    Unknown,
}

impl DocumentFormat {
    /// Case-insensitive dispatch on the extension: `Resume.PDF` is a PDF.
    pub fn from_filename(filename: &str) -> Self {
        match extension_of(filename).as_deref() {
            Some("pdf") => DocumentFormat::Pdf,
            Some("docx") => DocumentFormat::Docx,
            Some("txt") => DocumentFormat::Txt,
            _ => DocumentFormat::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Txt => "TXT",
            DocumentFormat::Unknown => "plain text",
        }
    }

    /// Whether uploads in this format are accepted at the HTTP boundary.
    pub fn is_accepted_upload(&self) -> bool {
        !matches!(self, DocumentFormat::Unknown)
    }
}

/// Lowercased extension without the dot, if the filename has one.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// An uploaded resume. Immutable; dropped once its text has been extracted.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    raw_bytes: Bytes,
    filename: String,
    format: DocumentFormat,
}

impl ResumeDocument {
    pub fn new(raw_bytes: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let format = DocumentFormat::from_filename(&filename);
        Self {
            raw_bytes: raw_bytes.into(),
            filename,
            format,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_inference_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_filename("cv.PDF"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_filename("Resume.Docx"), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_filename("notes.txt"), DocumentFormat::Txt);
    }

    #[test]
    fn test_unknown_extensions() {
        assert_eq!(DocumentFormat::from_filename("resume.md"), DocumentFormat::Unknown);
        assert_eq!(DocumentFormat::from_filename("resume"), DocumentFormat::Unknown);
        assert_eq!(DocumentFormat::from_filename(".pdf"), DocumentFormat::Unknown);
        assert!(!DocumentFormat::Unknown.is_accepted_upload());
    }

    #[test]
    fn test_document_keeps_filename_and_bytes() {
        let doc = ResumeDocument::new(b"hello".to_vec(), "me.txt");
        assert_eq!(doc.filename(), "me.txt");
        assert_eq!(doc.bytes(), b"hello");
        assert_eq!(doc.format(), DocumentFormat::Txt);
    }
}
