//! Tiered rule-based certificate parser.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::certificate::ExtractedFields;
use crate::models::config::ExtractionConfig;
use crate::store::CertificateRegistry;

use super::FieldParser;
use super::rules::{
    CategoryExtractor, CertificateNumberExtractor, DateTextExtractor, FieldExtractor, UlrExtractor,
    match_laboratory_name, normalize_text,
};

/// Result of certificate extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: ExtractedFields,
    /// Text after normalization, as seen by the patterns.
    pub normalized_text: String,
    /// Fields that could not be found.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Rule-based parser for accreditation certificates.
pub struct CertificateParser {
    /// Fall back to any two-letter certificate prefix.
    generic_prefix_fallback: bool,
    /// Run the registry name pass when a registry is supplied.
    match_lab_names: bool,
}

impl CertificateParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            generic_prefix_fallback: true,
            match_lab_names: true,
        }
    }

    /// Create a parser from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_lab_name_matching(config.match_lab_names)
    }

    /// Set whether unknown two-letter prefixes are accepted.
    pub fn with_generic_prefix_fallback(mut self, enabled: bool) -> Self {
        self.generic_prefix_fallback = enabled;
        self
    }

    /// Set whether registry laboratory names are searched for.
    pub fn with_lab_name_matching(mut self, enabled: bool) -> Self {
        self.match_lab_names = enabled;
        self
    }

    /// Parse, additionally matching laboratory names from the registry.
    pub fn parse_with_registry<R>(&self, text: &str, registry: &R) -> ExtractionResult
    where
        R: CertificateRegistry + ?Sized,
    {
        let mut result = self.parse(text);

        if self.match_lab_names {
            result.fields.laboratory_name = match_laboratory_name(&result.normalized_text, registry);
            if result.fields.laboratory_name.is_none() {
                result.warnings.push("No registry laboratory name found in text".to_string());
            }
        }

        result
    }

    fn extract_fields(&self, text: &str) -> ExtractedFields {
        let certificate_number = CertificateNumberExtractor::new()
            .with_generic_fallback(self.generic_prefix_fallback)
            .extract(text)
            .map(|m| m.value);

        let unique_registration_number = UlrExtractor::new()
            .with_certificate_number(certificate_number.as_deref())
            .extract(text)
            .map(|m| {
                let (value, strategy) = m.value;
                debug!("Registration number {} found via {:?} strategy", value, strategy);
                value
            });

        ExtractedFields {
            certificate_number,
            unique_registration_number,
            issue_date_text: DateTextExtractor::new().extract(text).map(|m| m.value),
            category: CategoryExtractor::new().extract(text).map(|m| m.value),
            laboratory_name: None,
        }
    }
}

impl Default for CertificateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldParser for CertificateParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing certificate from {} characters of text", text.len());

        let normalized_text = normalize_text(text);
        let fields = self.extract_fields(&normalized_text);

        if fields.certificate_number.is_none() {
            warnings.push("Could not extract certificate number".to_string());
        }
        if fields.unique_registration_number.is_none() {
            warnings.push("Could not extract registration number".to_string());
        }
        if fields.issue_date_text.is_none() {
            warnings.push("Could not extract issue date".to_string());
        }
        if fields.category.is_none() {
            warnings.push("Could not infer laboratory category".to_string());
        }

        debug!(
            "Extracted certificate {:?}, ULR {:?}, issue date {:?}, category {:?}",
            fields.certificate_number, fields.unique_registration_number, fields.issue_date_text, fields.category
        );

        ExtractionResult {
            fields,
            normalized_text,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::certificate::{Category, CertificateRecord};
    use crate::store::MemoryRegistry;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
        NATIONAL ACCREDITATION BOARD FOR TESTING AND CALIBRATION LABORATORIES
        Accreditation Certificate  TC – 5589
        Acme Analytical Services Pvt. Ltd.
        ULR No: TC558924000000001F
        Issue Date 01/01/2023   Valid Until 31 Dec 2027
        Discipline: Chemical
    "#;

    #[test]
    fn test_parse_full_certificate() {
        let result = CertificateParser::new().parse(SAMPLE);

        assert_eq!(
            result.fields,
            ExtractedFields {
                certificate_number: Some("TC-5589".to_string()),
                unique_registration_number: Some("TC558924000000001F".to_string()),
                issue_date_text: Some("01/01/2023".to_string()),
                category: Some(Category::Testing),
                laboratory_name: None,
            }
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_garbage_degrades_to_absent_fields() {
        let result = CertificateParser::new().parse("@@@ ### \u{0}\u{7f} lorem ipsum");
        assert_eq!(result.fields, ExtractedFields::default());
        assert_eq!(result.warnings.len(), 4);

        let empty = CertificateParser::new().parse("");
        assert_eq!(empty.fields, ExtractedFields::default());
    }

    #[test]
    fn test_derived_ulr_without_label() {
        let text = "Certificate No. CC-2456 report CC245623100000012P dated 12 Mar 2024";
        let fields = CertificateParser::new().parse(text).fields;
        assert_eq!(fields.certificate_number.as_deref(), Some("CC-2456"));
        assert_eq!(fields.unique_registration_number.as_deref(), Some("CC245623100000012P"));
        assert_eq!(fields.issue_date_text.as_deref(), Some("12 MAR 2024"));
    }

    #[test]
    fn test_label_ulr_without_certificate_number() {
        let fields = CertificateParser::new().parse("ulr no: AB 12 CD 34 56 78").fields;
        assert_eq!(fields.certificate_number, None);
        assert_eq!(fields.unique_registration_number.as_deref(), Some("AB12CD345678"));
    }

    #[test]
    fn test_lab_name_pass() {
        let registry = MemoryRegistry::new(vec![
            CertificateRecord::new("L1", "Acme Analytical Services", "TC-5589"),
        ]);

        let result = CertificateParser::new().parse_with_registry(SAMPLE, &registry);
        assert_eq!(result.fields.laboratory_name.as_deref(), Some("Acme Analytical Services"));

        let disabled = CertificateParser::new()
            .with_lab_name_matching(false)
            .parse_with_registry(SAMPLE, &registry);
        assert_eq!(disabled.fields.laboratory_name, None);
    }
}
