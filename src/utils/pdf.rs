// src/utils/pdf.rs
//! PDF helpers for certificate uploads.
//!
//! Text extraction is CPU bound and `pdf-extract` may panic on damaged files,
//! so it runs on the blocking pool where a panic surfaces as a join error.

use bytes::Bytes;
use thiserror::Error;
use tokio::task;

/// Failure to turn an uploaded PDF into text.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to extract text from PDF: {0}")]
    Extraction(String),

    #[error("PDF extraction worker failed: {0}")]
    Worker(#[from] task::JoinError),
}

/// Returns `true` if the declared content type names a PDF.
///
/// Mirrors how browsers label uploads: `application/pdf`, occasionally
/// `application/x-pdf`. Matching is a case-insensitive substring test.
pub fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("pdf"))
        .unwrap_or(false)
}

/// Extracts the text layer of a PDF held in memory.
///
/// # Errors
/// - `PdfError::Extraction` if the document cannot be parsed
/// - `PdfError::Worker` if the extraction thread panicked
pub async fn extract_text(bytes: Bytes) -> Result<String, PdfError> {
    task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| PdfError::Extraction(e.to_string()))
    })
    .await?
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(Some("application/pdf")));
        assert!(is_pdf(Some("Application/X-PDF")));
        assert!(!is_pdf(Some("text/plain")));
        assert!(!is_pdf(None));
    }

    #[tokio::test]
    async fn test_extract_text_rejects_garbage() {
        let result = extract_text(Bytes::from_static(b"definitely not a pdf")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_extract_text_reads_text_layer() {
        let pdf = fixtures::text_pdf(&["Project Name: Amazon Rainforest", "Vintage Year: 2023"]);
        let text = extract_text(Bytes::from(pdf)).await.unwrap();

        assert!(text.contains("Project Name: Amazon Rainforest"));
        assert!(text.contains("Vintage Year: 2023"));
    }
}
