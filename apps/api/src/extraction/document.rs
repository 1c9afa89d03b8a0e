//! Document-text source: turns uploaded bytes into plain text for the pipeline.
//!
//! PDF parsing is CPU-bound and may panic on malformed input, so it runs inside
//! `spawn_blocking` and a panicked worker is reported as an unreadable document.

use std::str::Utf8Error;

use thiserror::Error;
use tracing::debug;

/// Uploads larger than this are rejected before parsing.
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported document format: {0}")]
    Unsupported(String),

    #[error("document is empty")]
    Empty,

    #[error("document exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),
}

impl DocumentFormat {
    /// Maps a `Content-Type` header value (parameters ignored) to a format.
    pub fn from_content_type(content_type: &str) -> Result<Self, DocumentError> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "application/pdf" => Ok(DocumentFormat::Pdf),
            "text/plain" => Ok(DocumentFormat::PlainText),
            _ => Err(DocumentError::Unsupported(mime)),
        }
    }
}

/// Extracts plain text from document bytes.
pub async fn extract_text(bytes: &[u8], format: DocumentFormat) -> Result<String, DocumentError> {
    if bytes.is_empty() {
        return Err(DocumentError::Empty);
    }
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(DocumentError::TooLarge {
            limit: MAX_DOCUMENT_BYTES,
        });
    }

    match format {
        DocumentFormat::PlainText => {
            let text = std::str::from_utf8(bytes)?;
            Ok(text.trim_start_matches('\u{feff}').to_string())
        }
        DocumentFormat::Pdf => {
            let owned = bytes.to_vec();
            let text = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&owned).map_err(|e| e.to_string())
            })
            .await
            .map_err(|e| DocumentError::Pdf(format!("PDF parser aborted: {e}")))?
            .map_err(DocumentError::Pdf)?;
            debug!("Extracted {} chars from {} byte PDF", text.len(), bytes.len());
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(
            DocumentFormat::from_content_type("application/pdf").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_content_type("Text/Plain; charset=utf-8").unwrap(),
            DocumentFormat::PlainText
        );
    }

    #[test]
    fn test_docx_is_unsupported() {
        let err = DocumentFormat::from_content_type(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        )
        .unwrap_err();
        assert!(matches!(err, DocumentError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_plain_text_passthrough_strips_bom() {
        let text = extract_text("\u{feff}Jane Doe".as_bytes(), DocumentFormat::PlainText)
            .await
            .unwrap();
        assert_eq!(text, "Jane Doe");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_encoding_error() {
        let err = extract_text(&[0xff, 0xfe, 0x00, 0x41], DocumentFormat::PlainText)
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_empty_and_oversized_documents_rejected() {
        assert!(matches!(
            extract_text(&[], DocumentFormat::Pdf).await.unwrap_err(),
            DocumentError::Empty
        ));
        let big = vec![b'a'; MAX_DOCUMENT_BYTES + 1];
        assert!(matches!(
            extract_text(&big, DocumentFormat::PlainText).await.unwrap_err(),
            DocumentError::TooLarge { .. }
        ));
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_pdf_error() {
        let err = extract_text(b"definitely not a pdf", DocumentFormat::Pdf)
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Pdf(_)));
    }
}
