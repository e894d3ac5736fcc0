//! Core library for laboratory accreditation certificate verification.
//!
//! This crate provides:
//! - Field extraction from OCR text (certificate number, ULR, issue date, category)
//! - Validation of extracted certificates against an accreditation registry
//! - Registry and report-store collaborators (in-memory and SQLite)
//! - Text sources for uploaded documents (plain text, PDF text layer, Tesseract)
//! - A verification service tying extraction, validation and persistence together

pub mod error;
pub mod extraction;
pub mod hash;
pub mod models;
pub mod ocr;
pub mod service;
pub mod store;
pub mod validation;

pub use error::{LabcertError, OcrError, Result, StoreError};
pub use extraction::{CertificateParser, ExtractionResult, FieldParser, UlrSegments};
pub use hash::content_hash;
pub use models::certificate::{Category, CertificateRecord, ExtractedFields};
pub use models::config::LabcertConfig;
pub use models::report::{NewReport, ReportRecord, ValidationStatus, VerificationResponse};
pub use ocr::{Document, PlainTextSource, TesseractSource, TextSource, read_document, text_source_for};
pub use service::VerificationService;
pub use store::{CertificateRegistry, MemoryRegistry, MemoryReportStore, ReportStore};
#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
pub use validation::{CertificateValidator, Verdict, parse_date};
