//! Plain-text documents (already OCR'd elsewhere).

use std::path::Path;

use super::TextSource;
use crate::error::OcrError;

/// Reads a UTF-8 text file; invalid sequences are replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn extract_text(&self, path: &Path) -> Result<String, OcrError> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.txt");
        std::fs::write(&path, b"TC-5589 \xff TESTING").unwrap();

        let text = PlainTextSource.extract_text(&path).unwrap();
        assert!(text.starts_with("TC-5589"));
        assert!(text.ends_with("TESTING"));
    }

    #[test]
    fn test_missing_file() {
        let result = PlainTextSource.extract_text(Path::new("/nonexistent/labcert/scan.txt"));
        assert!(matches!(result, Err(OcrError::Io(_))));
    }
}
