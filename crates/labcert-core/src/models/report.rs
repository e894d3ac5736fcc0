//! Uploaded-report records and verification outcomes.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::certificate::{Category, CertificateRecord, ExtractedFields};
use crate::extraction::UlrSegments;
use crate::validation::parse_date;

/// Outcome of certificate validation.
///
/// The string forms are stable: they are stored and returned to callers as
/// user-facing reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Valid,
    InvalidCertificate,
    DuplicateUlr,
    CertificateExpired,
    InvalidIssueDate,
}

impl ValidationStatus {
    /// Stable reason code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::InvalidCertificate => "INVALID_CERTIFICATE",
            Self::DuplicateUlr => "DUPLICATE_ULR",
            Self::CertificateExpired => "CERTIFICATE_EXPIRED",
            Self::InvalidIssueDate => "INVALID_ISSUE_DATE",
        }
    }

    /// Parse a stored reason code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "VALID" => Some(Self::Valid),
            "INVALID_CERTIFICATE" => Some(Self::InvalidCertificate),
            "DUPLICATE_ULR" => Some(Self::DuplicateUlr),
            "CERTIFICATE_EXPIRED" => Some(Self::CertificateExpired),
            "INVALID_ISSUE_DATE" => Some(Self::InvalidIssueDate),
            _ => None,
        }
    }

    /// Legacy coarse score: 100 for valid certificates, 0 otherwise.
    pub fn validation_score(&self) -> u8 {
        match self {
            Self::Valid => 100,
            _ => 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored report, one per distinct uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Store-assigned identifier.
    pub id: i64,

    /// SHA-256 of the uploaded bytes; unique across reports.
    pub content_hash: String,

    pub certificate_number: Option<String>,
    pub unique_registration_number: Option<String>,
    pub laboratory_name: Option<String>,
    pub category: Option<Category>,
    pub issue_date_text: Option<String>,

    pub status: ValidationStatus,
    pub validation_score: u8,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written to the report store after a verification run.
///
/// Stores insert a new row for an unseen content hash and update the existing
/// row in place otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub content_hash: String,
    pub certificate_number: Option<String>,
    pub unique_registration_number: Option<String>,
    pub laboratory_name: Option<String>,
    pub category: Option<Category>,
    pub issue_date_text: Option<String>,
    pub status: ValidationStatus,
}

impl NewReport {
    /// Build the row for a verification run.
    ///
    /// Laboratory name and category come from the matched registry entry when
    /// there is one, falling back to what was read from the document.
    pub fn from_verdict(
        content_hash: impl Into<String>,
        fields: &ExtractedFields,
        entry: Option<&CertificateRecord>,
        status: ValidationStatus,
    ) -> Self {
        Self {
            content_hash: content_hash.into(),
            certificate_number: fields.certificate_number.clone(),
            unique_registration_number: fields.unique_registration_number.clone(),
            laboratory_name: entry
                .map(|e| e.laboratory_name.clone())
                .or_else(|| fields.laboratory_name.clone()),
            category: entry
                .and_then(|e| e.category.clone())
                .or_else(|| fields.category.clone()),
            issue_date_text: fields.issue_date_text.clone(),
            status,
        }
    }

    /// Materialize into a stored record.
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> ReportRecord {
        ReportRecord {
            id,
            content_hash: self.content_hash,
            certificate_number: self.certificate_number,
            unique_registration_number: self.unique_registration_number,
            laboratory_name: self.laboratory_name,
            category: self.category,
            issue_date_text: self.issue_date_text,
            validation_score: self.status.validation_score(),
            status: self.status,
            created_at,
            updated_at,
        }
    }
}

/// What the upload and lookup surfaces return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub report_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub laboratory_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_registration_number: Option<String>,

    pub status: ValidationStatus,
    pub validation_score: u8,

    /// Issue date exactly as it appeared in the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_expiry_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ulr_segments: Option<UlrSegments>,

    /// The uploaded bytes matched a report that was already stored.
    pub previously_seen: bool,
}

impl VerificationResponse {
    pub fn new(report: &ReportRecord, entry: Option<&CertificateRecord>, previously_seen: bool) -> Self {
        Self {
            report_id: report.id,
            laboratory_name: report.laboratory_name.clone(),
            category: report.category.clone(),
            certificate_number: report.certificate_number.clone(),
            unique_registration_number: report.unique_registration_number.clone(),
            status: report.status,
            validation_score: report.validation_score,
            issue_date_text: report.issue_date_text.clone(),
            issue_date: report.issue_date_text.as_deref().and_then(parse_date),
            effective_expiry_date: entry.and_then(CertificateRecord::effective_expiry),
            city: entry.and_then(|e| e.city.clone()),
            state: entry.and_then(|e| e.state.clone()),
            ulr_segments: report
                .unique_registration_number
                .as_deref()
                .and_then(UlrSegments::parse),
            previously_seen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_codes_are_stable() {
        let all = [
            ValidationStatus::Valid,
            ValidationStatus::InvalidCertificate,
            ValidationStatus::DuplicateUlr,
            ValidationStatus::CertificateExpired,
            ValidationStatus::InvalidIssueDate,
        ];
        for status in all {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(ValidationStatus::from_code(status.as_str()), Some(status));
        }
        assert_eq!(ValidationStatus::from_code("PENDING"), None);
    }

    #[test]
    fn test_validation_score_is_binary() {
        assert_eq!(ValidationStatus::Valid.validation_score(), 100);
        assert_eq!(ValidationStatus::DuplicateUlr.validation_score(), 0);
        assert_eq!(ValidationStatus::InvalidIssueDate.validation_score(), 0);
    }

    #[test]
    fn test_new_report_prefers_registry_metadata() {
        let fields = ExtractedFields {
            certificate_number: Some("TC-5589".to_string()),
            category: Some(Category::Calibration),
            laboratory_name: Some("ACME".to_string()),
            ..Default::default()
        };
        let entry = CertificateRecord::new("L1", "Acme Testing Labs", "TC-5589")
            .with_category(Category::Testing);

        let row = NewReport::from_verdict("abc", &fields, Some(&entry), ValidationStatus::Valid);
        assert_eq!(row.laboratory_name.as_deref(), Some("Acme Testing Labs"));
        assert_eq!(row.category, Some(Category::Testing));

        let orphan = NewReport::from_verdict("abc", &fields, None, ValidationStatus::InvalidCertificate);
        assert_eq!(orphan.laboratory_name.as_deref(), Some("ACME"));
        assert_eq!(orphan.category, Some(Category::Calibration));
    }
}
