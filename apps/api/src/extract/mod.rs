//! Document Text Extractor: plain text out of an uploaded resume PDF.
//!
//! The upload is staged in a `NamedTempFile` so the parser reads from disk; the guard
//! deletes the file when it drops, whichever way extraction ends.

use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::AppError;

/// Carried in `AppState` as `Arc<dyn ResumeExtractor>`.
#[async_trait]
pub trait ResumeExtractor: Send + Sync {
    async fn extract(&self, pdf: &[u8]) -> Result<String, AppError>;
}

/// `pdf-extract` backed extractor. Parsing runs on the blocking pool.
pub struct PdfTextExtractor;

#[async_trait]
impl ResumeExtractor for PdfTextExtractor {
    async fn extract(&self, pdf: &[u8]) -> Result<String, AppError> {
        let bytes = pdf.to_vec();
        // A panic inside the parser surfaces as a JoinError rather than taking the worker down.
        tokio::task::spawn_blocking(move || {
            with_staged_file(&bytes, |path| {
                pdf_extract::extract_text(path).map_err(|e| {
                    AppError::Extraction(format!("Error extracting text from PDF: {e}"))
                })
            })
        })
        .await
        .map_err(|e| AppError::Extraction(format!("PDF parser aborted: {e}")))?
    }
}

/// Writes `bytes` to a scoped temp file and hands its path to `f`.
/// The file is removed when this returns, on success and on failure alike.
fn with_staged_file<T, F>(bytes: &[u8], f: F) -> Result<T, AppError>
where
    F: FnOnce(&Path) -> Result<T, AppError>,
{
    let mut staged = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| AppError::Extraction(format!("Could not stage upload: {e}")))?;

    write_all(&mut staged, bytes)?;
    debug!("Staged {} byte upload at {}", bytes.len(), staged.path().display());

    f(staged.path())
}

fn write_all(staged: &mut NamedTempFile, bytes: &[u8]) -> Result<(), AppError> {
    staged
        .write_all(bytes)
        .and_then(|_| staged.flush())
        .map_err(|e| AppError::Extraction(format!("Could not stage upload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_staged_file_holds_bytes_and_is_removed_after_success() {
        let mut seen: Option<PathBuf> = None;
        let out = with_staged_file(b"%PDF-1.4 body", |path| {
            seen = Some(path.to_path_buf());
            Ok(std::fs::read(path).unwrap())
        })
        .unwrap();

        assert_eq!(out, b"%PDF-1.4 body");
        let path = seen.unwrap();
        assert!(!path.exists(), "temp file should be deleted after extraction");
    }

    #[test]
    fn test_staged_file_is_removed_after_failure() {
        let mut seen: Option<PathBuf> = None;
        let result: Result<(), AppError> = with_staged_file(b"garbage", |path| {
            seen = Some(path.to_path_buf());
            Err(AppError::Extraction("boom".to_string()))
        });

        assert!(result.is_err());
        assert!(!seen.unwrap().exists(), "temp file should be deleted on failure");
    }

    #[test]
    fn test_staged_file_has_pdf_suffix() {
        with_staged_file(b"", |path| {
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
            Ok(())
        })
        .unwrap();
    }

    #[tokio::test]
    async fn test_extract_rejects_non_pdf_bytes() {
        let result = PdfTextExtractor.extract(b"this is not a pdf").await;
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }
}
