//! Text sources: turning an uploaded document into plain text.
//!
//! Recognition itself is delegated to external tools; this module only wires
//! them up with explicit configuration.

#[cfg(feature = "pdf")]
mod pdf;
mod plain;
mod tesseract;

#[cfg(feature = "pdf")]
pub use pdf::embedded_text;
pub use plain::PlainTextSource;
pub use tesseract::TesseractSource;

use std::path::Path;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Anything that can produce the text of a document.
pub trait TextSource {
    /// Extract the document's text.
    fn extract_text(&self, path: &Path) -> Result<String, OcrError>;
}

impl<T: TextSource + ?Sized> TextSource for Box<T> {
    fn extract_text(&self, path: &Path) -> Result<String, OcrError> {
        (**self).extract_text(path)
    }
}

/// Kind of uploaded document, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
    Image,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "txt" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Pick the text source for a document.
pub fn text_source_for(path: &Path, config: &OcrConfig) -> Result<Box<dyn TextSource>, OcrError> {
    match DocumentKind::from_path(path) {
        Some(DocumentKind::PlainText) => Ok(Box::new(PlainTextSource)),
        Some(DocumentKind::Pdf | DocumentKind::Image) => Ok(Box::new(TesseractSource::new(config.clone()))),
        None => Err(OcrError::UnsupportedFormat(path.display().to_string())),
    }
}

/// An uploaded document: its raw bytes and recognized text.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub text: String,
}

/// Read a document from disk and recognize its text.
pub fn read_document(path: &Path, config: &OcrConfig) -> crate::Result<Document> {
    let source = text_source_for(path, config)?;
    let bytes = std::fs::read(path)?;
    let text = source.extract_text(path)?;
    Ok(Document { bytes, text })
}
