//! Error types for the labcert-core library.

use thiserror::Error;

/// Main error type for the labcert library.
///
/// Validation outcomes are never errors; they are reported through
/// [`crate::ValidationStatus`]. Only collaborator failures end up here.
#[derive(Error, Debug)]
pub enum LabcertError {
    /// Registry or report-store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Text source (OCR) failure.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the registry and report-store collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite backend failure.
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A schema migration could not be applied.
    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    /// A report referenced by id does not exist.
    #[error("report not found: {0}")]
    ReportNotFound(i64),

    /// A document handed in for re-validation is not the one the report was
    /// stored for.
    #[error("document does not match report {report_id} (expected content hash {expected}, got {actual})")]
    DocumentMismatch {
        report_id: i64,
        expected: String,
        actual: String,
    },

    /// Registry seed data could not be decoded.
    #[error("invalid registry data: {0}")]
    InvalidData(String),

    /// The store is unavailable (poisoned lock, closed connection).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while turning an uploaded document into text.
#[derive(Error, Debug)]
pub enum OcrError {
    /// An external tool could not be started.
    #[error("failed to run {tool}: {reason}")]
    ToolLaunch { tool: String, reason: String },

    /// An external tool exited unsuccessfully.
    #[error("{tool} exited with status {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    /// The PDF text layer could not be read.
    #[error("failed to read PDF text: {0}")]
    Pdf(String),

    /// The document format is not supported by any text source.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Rasterization produced no page images.
    #[error("no pages rendered from {0}")]
    NoPages(String),

    /// I/O error while reading the document or scratch files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the labcert library.
pub type Result<T> = std::result::Result<T, LabcertError>;
