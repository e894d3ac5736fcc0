//! Issue-date extraction and parsing.

use chrono::NaiveDate;

use super::patterns::{DATE_MONTH_ABBR, DATE_NUMERIC};
use super::{ExtractionMatch, FieldExtractor};

/// Formats accepted by [`parse_date`], in the order they are tried.
const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%d %b %Y"];

/// Issue-date text extractor.
///
/// Returns the raw matched substring so that dates which later fail to parse
/// can still be reported.
pub struct DateTextExtractor;

impl DateTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateTextExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // DD/MM/YYYY anywhere beats DD MMM YYYY
        for (pattern, confidence) in [(&*DATE_NUMERIC, 0.9), (&*DATE_MONTH_ABBR, 0.85)] {
            for m in pattern.find_iter(text) {
                results.push(
                    ExtractionMatch::new(m.as_str().to_string(), confidence, m.as_str())
                        .with_position(m.start(), m.end()),
                );
            }
        }

        results
    }
}

/// Extract the raw issue-date text from normalized text.
pub fn extract_issue_date_text(text: &str) -> Option<String> {
    DateTextExtractor::new().extract(text).map(|m| m.value)
}

/// Parse a date written as `DD/MM/YYYY` or `DD MMM YYYY`.
///
/// Month abbreviations are case-insensitive. Empty or malformed input yields
/// `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim().to_uppercase();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&value, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_numeric_date_has_priority() {
        let text = "VALID FROM 15 MAR 2022 ISSUE DATE 01/01/2023";
        assert_eq!(extract_issue_date_text(text), Some("01/01/2023".to_string()));
    }

    #[test]
    fn test_month_abbreviation_date() {
        let text = "ISSUED ON 05 JUN 2021 BY THE BOARD";
        assert_eq!(extract_issue_date_text(text), Some("05 JUN 2021".to_string()));
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_issue_date_text("NO DATES HERE 2023"), None);
    }

    #[test]
    fn test_unparseable_date_text_is_still_extracted() {
        let text = "ISSUE DATE 31/02/2023";
        assert_eq!(extract_issue_date_text(text), Some("31/02/2023".to_string()));
        assert_eq!(parse_date("31/02/2023"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("01/01/2023"), Some(date(2023, 1, 1)));
        assert_eq!(parse_date(" 05 Jun 2021 "), Some(date(2021, 6, 5)));
        assert_eq!(parse_date("05 jun 2021"), Some(date(2021, 6, 5)));
        assert_eq!(parse_date("2021-06-05"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
    }
}
