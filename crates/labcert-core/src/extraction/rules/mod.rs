//! Rule-based field extractors for accreditation certificates.
//!
//! Every extractor here expects text that has already been through
//! [`normalize_text`].

pub mod category;
pub mod certificate;
pub mod dates;
pub mod lab_name;
pub mod normalize;
pub mod patterns;
pub mod ulr;

pub use category::{CategoryExtractor, extract_category};
pub use certificate::{CertificateNumberExtractor, extract_certificate_number};
pub use dates::{DateTextExtractor, extract_issue_date_text};
pub use lab_name::match_laboratory_name;
pub use normalize::normalize_text;
pub use ulr::{UlrExtractor, UlrSegments, UlrStrategy, extract_ulr};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, best candidate first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
