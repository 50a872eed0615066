use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};

use crate::errors::StageError;

/// Concatenates paragraph texts in document order, one paragraph per line.
pub fn extract(bytes: &[u8]) -> Result<String, StageError> {
    let docx = read_docx(bytes).map_err(|e| StageError::DecodeFailure {
        format: "DOCX",
        message: format!("{e:?}"),
    })?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    _ => {}
                }
            }
        }
    }
    text
}
