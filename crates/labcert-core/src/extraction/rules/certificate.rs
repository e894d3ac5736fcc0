//! Certificate number extraction.

use regex::Regex;

use super::patterns::{CERT_GENERIC, CERT_KNOWN_PREFIX};
use super::{ExtractionMatch, FieldExtractor};

/// Certificate number extractor.
///
/// Two tiers: a known accreditation prefix first, any two-letter prefix as
/// fallback. Both yield the canonical `PREFIX-DIGITS` form.
pub struct CertificateNumberExtractor {
    generic_fallback: bool,
}

impl CertificateNumberExtractor {
    pub fn new() -> Self {
        Self {
            generic_fallback: true,
        }
    }

    /// Set whether to fall back to the generic two-letter pattern.
    pub fn with_generic_fallback(mut self, enabled: bool) -> Self {
        self.generic_fallback = enabled;
        self
    }

    fn collect(pattern: &Regex, confidence: f32, text: &str, results: &mut Vec<ExtractionMatch<String>>) {
        for caps in pattern.captures_iter(text) {
            let Some(full_match) = caps.get(0) else {
                continue;
            };
            let prefix: String = caps[1].chars().filter(|c| !c.is_whitespace()).collect();
            let number = format!("{}-{}", prefix, &caps[2]);

            if results.iter().any(|r| r.value == number) {
                continue;
            }

            results.push(
                ExtractionMatch::new(number, confidence, full_match.as_str())
                    .with_position(full_match.start(), full_match.end()),
            );
        }
    }
}

impl Default for CertificateNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CertificateNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        Self::collect(&CERT_KNOWN_PREFIX, 0.95, text, &mut results);

        if self.generic_fallback {
            Self::collect(&CERT_GENERIC, 0.7, text, &mut results);
        }

        results
    }
}

/// Extract the certificate number from normalized text.
pub fn extract_certificate_number(text: &str) -> Option<String> {
    CertificateNumberExtractor::new().extract(text).map(|m| m.value)
}
