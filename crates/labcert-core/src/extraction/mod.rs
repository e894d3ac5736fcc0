//! Certificate field extraction module.

mod parser;
pub mod rules;

pub use parser::{CertificateParser, ExtractionResult};
pub use rules::UlrSegments;

/// Trait for certificate field parsers.
///
/// Parsing never fails: a field that cannot be found is simply absent.
pub trait FieldParser {
    /// Parse certificate fields from raw OCR text.
    fn parse(&self, text: &str) -> ExtractionResult;
}
