//! Document text extraction: résumé bytes to plain text.
//!
//! Dispatch is by the declared filename's extension only. Decoding is CPU-bound;
//! async callers go through `extract_blocking`, which runs on the blocking pool.

use std::sync::Arc;

use bytes::Bytes;
use docx_rs::{DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Page-structured documents.
    Pdf,
    /// XML-zip word-processor documents.
    Docx,
}

impl DocumentFormat {
    /// Resolves the format from the trailing extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentFormat::Pdf)
        } else if lower.ends_with(".docx") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("text extraction failed: {0}")]
    Failure(String),
}

/// Seam for the extractor so the intake pipeline can run against a stub.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractionError>;
}

/// Default extractor backed by `pdf-extract` and `docx-rs`.
pub struct DocumentTextExtractor;

impl TextExtractor for DocumentTextExtractor {
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
        extract_text(bytes, filename)
    }
}

pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
    match DocumentFormat::from_filename(filename) {
        Some(DocumentFormat::Pdf) => extract_pdf(bytes),
        Some(DocumentFormat::Docx) => extract_docx(bytes),
        None => Err(ExtractionError::UnsupportedFormat(filename.to_string())),
    }
}

/// Runs an extractor on the blocking pool. A panic inside the decoder is
/// reported as an extraction failure rather than taking the request down.
pub async fn extract_blocking(
    extractor: Arc<dyn TextExtractor>,
    bytes: Bytes,
    filename: String,
) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extractor.extract(&bytes, &filename))
        .await
        .map_err(|e| ExtractionError::Failure(format!("extraction task aborted: {e}")))?
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractionError::Failure(format!("PDF decode error: {e}")))?;
    // pdf-extract opens each page with the line breaks implied by glyph position.
    let pages = pages
        .into_iter()
        .map(|page| page.trim_matches(|c: char| c == '\n' || c == '\r').to_string());
    Ok(join_trimmed(pages))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractionError::Failure(format!("DOCX decode error: {e}")))?;

    let paragraphs = docx.document.children.iter().filter_map(|child| match child {
        DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
        _ => None,
    });
    Ok(join_trimmed(paragraphs))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children_text(&paragraph.children, &mut text);
    text
}

/// Collects visible text from runs, including runs nested in hyperlinks and
/// tracked insertions. Tabs and breaks keep their plain-text form.
fn push_children_text(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run_text(run, text),
            ParagraphChild::Hyperlink(link) => push_children_text(&link.children, text),
            ParagraphChild::Insert(insert) => {
                for insert_child in &insert.children {
                    if let InsertChild::Run(run) = insert_child {
                        push_run_text(run, text);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run_text(run: &Run, text: &mut String) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) | RunChild::PTab(_) => text.push('\t'),
            RunChild::Break(_) | RunChild::CarriageReturn(_) => text.push('\n'),
            _ => {}
        }
    }
}

/// Newline-joins the parts in order, then trims the whole result.
fn join_trimmed<I>(parts: I) -> String
where
    I: IntoIterator<Item = String>,
{
    parts
        .into_iter()
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
