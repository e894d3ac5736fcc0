//! Registry entries and fields extracted from certificate text.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Accreditation domain a certificate covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Testing,
    Calibration,
    Medical,
    Chemical,
    Biological,
    Microbiological,
    /// Category present in the registry but outside the known list.
    Other(String),
}

impl Category {
    /// Keyword cascade used when inferring a category from text.
    ///
    /// Order matters: the first keyword present wins, wherever it sits in the
    /// text.
    pub const KEYWORDS: &'static [(&'static str, Category)] = &[
        ("TESTING", Category::Testing),
        ("CALIBRATION", Category::Calibration),
        ("MEDICAL", Category::Medical),
        ("CHEMICAL", Category::Chemical),
        ("BIOLOGICAL", Category::Biological),
        ("MICROBIOLOGICAL", Category::Microbiological),
        ("MICROBIOLOGY", Category::Microbiological),
    ];

    /// Parse a category name, case-insensitively.
    ///
    /// Returns `None` for blank input.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }

        let category = match trimmed.to_lowercase().as_str() {
            "testing" => Self::Testing,
            "calibration" => Self::Calibration,
            "medical" => Self::Medical,
            "chemical" => Self::Chemical,
            "biological" => Self::Biological,
            "microbiological" | "microbiology" => Self::Microbiological,
            _ => Self::Other(trimmed.to_string()),
        };
        Some(category)
    }

    /// Display name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Testing => "Testing",
            Self::Calibration => "Calibration",
            Self::Medical => "Medical",
            Self::Chemical => "Chemical",
            Self::Biological => "Biological",
            Self::Microbiological => "Microbiological",
            Self::Other(name) => name,
        }
    }

    /// Case-insensitive comparison of category names.
    pub fn matches(&self, other: &Category) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Category::parse(&s).ok_or_else(|| serde::de::Error::custom("empty category"))
    }
}

/// A row of the accreditation registry.
///
/// The registry is owned elsewhere; the engines only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Opaque laboratory identifier.
    pub identifier: String,

    /// Laboratory display name.
    pub laboratory_name: String,

    /// Normalized certificate number, e.g. `TC-5589`.
    pub certificate_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,

    /// Nominal expiry date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,

    /// Extension overriding the nominal expiry date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_expiry_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl CertificateRecord {
    /// Create a record with the natural key set and every date absent.
    pub fn new(
        identifier: impl Into<String>,
        laboratory_name: impl Into<String>,
        certificate_number: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            laboratory_name: laboratory_name.into(),
            certificate_number: certificate_number.into(),
            category: None,
            issue_date: None,
            expiry_date: None,
            extended_expiry_date: None,
            city: None,
            state: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_issue_date(mut self, date: NaiveDate) -> Self {
        self.issue_date = Some(date);
        self
    }

    pub fn with_expiry_date(mut self, date: NaiveDate) -> Self {
        self.expiry_date = Some(date);
        self
    }

    pub fn with_extended_expiry_date(mut self, date: NaiveDate) -> Self {
        self.extended_expiry_date = Some(date);
        self
    }

    /// Extended expiry if present, otherwise the nominal expiry.
    pub fn effective_expiry(&self) -> Option<NaiveDate> {
        self.extended_expiry_date.or(self.expiry_date)
    }
}

/// Candidate fields pulled out of certificate text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Certificate number in `PREFIX-DIGITS` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,

    /// Unique registration number (ULR), at least 8 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_registration_number: Option<String>,

    /// Raw issue-date substring, not yet parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Registry laboratory name found verbatim in the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laboratory_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(Category::parse("testing"), Some(Category::Testing));
        assert_eq!(Category::parse(" CALIBRATION "), Some(Category::Calibration));
        assert_eq!(Category::parse("Microbiology"), Some(Category::Microbiological));
        assert_eq!(
            Category::parse("Proficiency Testing Provider"),
            Some(Category::Other("Proficiency Testing Provider".to_string()))
        );
        assert_eq!(Category::parse("   "), None);
    }

    #[test]
    fn test_category_matches_ignores_case() {
        let other = Category::Other("Forensic".to_string());
        assert!(other.matches(&Category::Other("FORENSIC".to_string())));
        assert!(Category::Testing.matches(&Category::Other("testing".to_string())));
        assert!(!Category::Testing.matches(&Category::Calibration));
    }

    #[test]
    fn test_effective_expiry_prefers_extension() {
        let record = CertificateRecord::new("L1", "Lab", "TC-1")
            .with_expiry_date(date(2024, 1, 1))
            .with_extended_expiry_date(date(2025, 1, 1));
        assert_eq!(record.effective_expiry(), Some(date(2025, 1, 1)));

        let nominal = CertificateRecord::new("L1", "Lab", "TC-1").with_expiry_date(date(2024, 1, 1));
        assert_eq!(nominal.effective_expiry(), Some(date(2024, 1, 1)));

        assert_eq!(CertificateRecord::new("L1", "Lab", "TC-1").effective_expiry(), None);
    }

    #[test]
    fn test_record_json_roundtrip_uses_display_names() {
        let record = CertificateRecord::new("L1", "Acme Labs", "TC-5589")
            .with_category(Category::Testing)
            .with_expiry_date(date(2030, 1, 1));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["category"], "Testing");
        assert_eq!(json["expiry_date"], "2030-01-01");
        assert!(json.get("city").is_none());

        let back: CertificateRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
