//! Unique registration number (ULR) extraction and decoding.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::patterns::{ULR_LABEL, ULR_STRUCTURE};
use super::{ExtractionMatch, FieldExtractor};

/// Minimum length of a registration number.
pub const MIN_ULR_LENGTH: usize = 8;

/// How a registration number was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UlrStrategy {
    /// Printed after a `ULR` / `ULR NO:` label.
    Label,
    /// The certificate number followed directly by more characters.
    Derived,
}

/// ULR field extractor.
///
/// The label strategy always takes priority; the derived strategy needs the
/// certificate number found earlier in the same text.
pub struct UlrExtractor {
    certificate_number: Option<String>,
}

impl UlrExtractor {
    pub fn new() -> Self {
        Self {
            certificate_number: None,
        }
    }

    /// Enable the derived strategy for the given certificate number.
    pub fn with_certificate_number(mut self, certificate_number: Option<&str>) -> Self {
        self.certificate_number = certificate_number.map(str::to_string);
        self
    }

    fn extract_labeled(&self, text: &str, results: &mut Vec<ExtractionMatch<(String, UlrStrategy)>>) {
        for label in ULR_LABEL.find_iter(text) {
            let rest = &text[label.end()..];
            let Some((value, consumed)) = read_spaced_token(rest) else {
                continue;
            };
            if value.len() < MIN_ULR_LENGTH {
                trace!("Ignoring short ULR candidate {:?}", value);
                continue;
            }
            let end = label.end() + consumed;
            results.push(
                ExtractionMatch::new((value, UlrStrategy::Label), 0.95, &text[label.start()..end])
                    .with_position(label.start(), end),
            );
        }
    }

    fn extract_derived(&self, text: &str, results: &mut Vec<ExtractionMatch<(String, UlrStrategy)>>) {
        let Some(cert) = self.certificate_number.as_deref() else {
            return;
        };
        let stripped = cert.replace('-', "");
        if stripped.is_empty() {
            return;
        }

        let pattern = format!(r"\b{}[A-Z0-9]{{{},}}\b", regex::escape(&stripped), MIN_ULR_LENGTH);
        let Ok(re) = Regex::new(&pattern) else {
            return;
        };

        for m in re.find_iter(text) {
            let value = m.as_str().to_string();
            if results.iter().any(|r| r.value.0 == value) {
                continue;
            }
            results.push(
                ExtractionMatch::new((value, UlrStrategy::Derived), 0.8, m.as_str())
                    .with_position(m.start(), m.end()),
            );
        }
    }
}

impl Default for UlrExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for UlrExtractor {
    type Output = ExtractionMatch<(String, UlrStrategy)>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();
        self.extract_labeled(text, &mut results);
        self.extract_derived(text, &mut results);
        results
    }
}

/// Read a possibly space-broken registration number from the start of `rest`.
///
/// OCR often splits a ULR into groups (`AB 12 CD 3456 78`). The first token is
/// always taken, and on its own when it already has the minimum ULR length.
/// Otherwise later tokens are joined while they look like short OCR groups.
/// Returns the joined value and the number of bytes consumed.
fn read_spaced_token(rest: &str) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut consumed = 0;

    for (i, raw) in rest.split(' ').enumerate() {
        let token = raw.trim_end_matches(['.', ',', ';', ':', ')']);
        let is_code = !token.is_empty()
            && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !is_code {
            break;
        }
        if i > 0 && !continues_ulr(token) {
            break;
        }

        if i > 0 {
            consumed += 1;
        }
        value.push_str(token);
        consumed += token.len();

        if token.len() != raw.len() || (i == 0 && token.len() >= MIN_ULR_LENGTH) {
            break;
        }
    }

    if value.is_empty() { None } else { Some((value, consumed)) }
}

/// Longest token accepted as a continuation group.
const MAX_GROUP_LENGTH: usize = 4;

fn continues_ulr(token: &str) -> bool {
    token.len() <= MAX_GROUP_LENGTH && (token.chars().any(|c| c.is_ascii_digit()) || token.len() <= 2)
}

/// Extract the registration number from normalized text.
pub fn extract_ulr(text: &str, certificate_number: Option<&str>) -> Option<String> {
    UlrExtractor::new()
        .with_certificate_number(certificate_number)
        .extract(text)
        .map(|m| m.value.0)
}

/// Segments of a structured registration number.
///
/// Layout: `TC|CC|RC`, 4-digit certificate number, 2-digit year, location
/// digit, 8 hex ledger characters, then `F` (full scope) or `P` (partial).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UlrSegments {
    pub kind: String,
    pub certificate_digits: String,
    pub year: String,
    pub location: String,
    pub ledger: String,
    pub scope: char,
}

impl UlrSegments {
    /// Decode a registration number, or `None` if it does not follow the layout.
    pub fn parse(ulr: &str) -> Option<Self> {
        let normalized = ulr.trim().to_uppercase();
        let caps = ULR_STRUCTURE.captures(&normalized)?;
        Some(Self {
            kind: caps[1].to_string(),
            certificate_digits: caps[2].to_string(),
            year: caps[3].to_string(),
            location: caps[4].to_string(),
            ledger: caps[5].to_string(),
            scope: caps[6].chars().next()?,
        })
    }

    /// Whether the report covers the full accredited scope.
    pub fn is_full_scope(&self) -> bool {
        self.scope == 'F'
    }

    /// Space-separated rendering of the segments.
    pub fn format(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.kind, self.certificate_digits, self.year, self.location, self.ledger, self.scope
        )
    }
}
