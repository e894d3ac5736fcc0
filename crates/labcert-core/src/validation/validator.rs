//! Ordered validation rules.
//!
//! Rules run in a fixed order and the first one that fires decides the
//! outcome:
//!
//! 1. no certificate number → `INVALID_CERTIFICATE`
//! 2. no registry entry → `INVALID_CERTIFICATE`
//! 3. registration number already on another report → `DUPLICATE_ULR`
//! 4. no effective expiry on the entry → `INVALID_CERTIFICATE`
//! 5. today after effective expiry → `CERTIFICATE_EXPIRED`
//! 6. issue date earlier than the registry's → `INVALID_ISSUE_DATE`
//! 7. otherwise `VALID`

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use super::parse_date;
use crate::error::StoreError;
use crate::models::certificate::{CertificateRecord, ExtractedFields};
use crate::models::report::ValidationStatus;
use crate::store::{CertificateRegistry, ReportStore};

/// Result of validating one set of extracted fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Matched registry entry, kept even for duplicates and expired
    /// certificates so callers can show laboratory metadata.
    pub entry: Option<CertificateRecord>,
    pub status: ValidationStatus,
}

impl Verdict {
    fn new(entry: Option<CertificateRecord>, status: ValidationStatus) -> Self {
        info!("Validation outcome: {}", status);
        Self { entry, status }
    }
}

/// Certificate validation engine.
///
/// Holds no state between calls; it only reads through the two collaborators.
/// Collaborator errors are returned unchanged.
pub struct CertificateValidator<'a, R: ?Sized, S: ?Sized> {
    registry: &'a R,
    reports: &'a S,
}

impl<'a, R, S> CertificateValidator<'a, R, S>
where
    R: CertificateRegistry + ?Sized,
    S: ReportStore + ?Sized,
{
    pub fn new(registry: &'a R, reports: &'a S) -> Self {
        Self { registry, reports }
    }

    /// Validate against today's local date.
    ///
    /// `exclude_report` is the id of the report being re-validated, so its own
    /// registration number does not count as a duplicate.
    pub fn validate(&self, fields: &ExtractedFields, exclude_report: Option<i64>) -> Result<Verdict, StoreError> {
        self.validate_on(fields, exclude_report, Local::now().date_naive())
    }

    /// Validate as of the given date.
    pub fn validate_on(
        &self,
        fields: &ExtractedFields,
        exclude_report: Option<i64>,
        today: NaiveDate,
    ) -> Result<Verdict, StoreError> {
        let Some(certificate_number) = fields.certificate_number.as_deref() else {
            debug!("No certificate number extracted");
            return Ok(Verdict::new(None, ValidationStatus::InvalidCertificate));
        };

        let Some(entry) = self.lookup_entry(certificate_number, fields)? else {
            debug!("Certificate {} not in registry", certificate_number);
            return Ok(Verdict::new(None, ValidationStatus::InvalidCertificate));
        };

        if let Some(ulr) = fields.unique_registration_number.as_deref() {
            if self.reports.registration_number_exists(ulr, exclude_report)? {
                debug!("Registration number {} already used by another report", ulr);
                return Ok(Verdict::new(Some(entry), ValidationStatus::DuplicateUlr));
            }
        }

        let Some(expiry) = entry.effective_expiry() else {
            debug!("Registry entry for {} has no expiry date", certificate_number);
            return Ok(Verdict::new(Some(entry), ValidationStatus::InvalidCertificate));
        };

        if today > expiry {
            debug!("Certificate {} expired on {}", certificate_number, expiry);
            return Ok(Verdict::new(Some(entry), ValidationStatus::CertificateExpired));
        }

        let issued = fields.issue_date_text.as_deref().and_then(parse_date);
        if let (Some(issued), Some(registered)) = (issued, entry.issue_date) {
            if issued < registered {
                debug!("Issue date {} precedes registry issue date {}", issued, registered);
                return Ok(Verdict::new(Some(entry), ValidationStatus::InvalidIssueDate));
            }
        }

        Ok(Verdict::new(Some(entry), ValidationStatus::Valid))
    }

    /// Pick the registry entry: category match first, else the first row.
    fn lookup_entry(
        &self,
        certificate_number: &str,
        fields: &ExtractedFields,
    ) -> Result<Option<CertificateRecord>, StoreError> {
        let mut candidates = self.registry.find_by_certificate_number(certificate_number)?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let preferred = fields.category.as_ref().and_then(|category| {
            candidates.iter().position(|c| {
                c.category
                    .as_ref()
                    .is_some_and(|registered| registered.matches(category))
            })
        });

        let entry = candidates.swap_remove(preferred.unwrap_or(0));
        debug!(
            "Selected registry entry {} ({}) for {}",
            entry.identifier, entry.laboratory_name, certificate_number
        );
        Ok(Some(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::certificate::Category;
    use crate::models::report::NewReport;
    use crate::store::{MemoryRegistry, MemoryReportStore};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn registry() -> MemoryRegistry {
        MemoryRegistry::new(vec![
            CertificateRecord::new("L1", "Acme Calibration", "TC-5589")
                .with_category(Category::Calibration)
                .with_issue_date(date(2022, 6, 1))
                .with_expiry_date(date(2030, 1, 1)),
            CertificateRecord::new("L1", "Acme Testing", "TC-5589")
                .with_category(Category::Testing)
                .with_issue_date(date(2022, 6, 1))
                .with_expiry_date(date(2030, 1, 1)),
        ])
    }

    fn fields(cert: Option<&str>, ulr: Option<&str>, issue: Option<&str>, category: Option<Category>) -> ExtractedFields {
        ExtractedFields {
            certificate_number: cert.map(str::to_string),
            unique_registration_number: ulr.map(str::to_string),
            issue_date_text: issue.map(str::to_string),
            category,
            laboratory_name: None,
        }
    }

    fn store_with_ulr(ulr: &str) -> (MemoryReportStore, i64) {
        let store = MemoryReportStore::new();
        let record = store
            .upsert(NewReport {
                content_hash: "existing".to_string(),
                certificate_number: Some("TC-5589".to_string()),
                unique_registration_number: Some(ulr.to_string()),
                laboratory_name: None,
                category: None,
                issue_date_text: None,
                status: ValidationStatus::Valid,
            })
            .unwrap();
        (store, record.id)
    }

    fn today() -> NaiveDate {
        date(2025, 3, 1)
    }

    #[test]
    fn test_missing_certificate_number() {
        let registry = registry();
        let store = MemoryReportStore::new();
        let verdict = CertificateValidator::new(&registry, &store)
            .validate_on(&ExtractedFields::default(), None, today())
            .unwrap();
        assert_eq!(verdict, Verdict { entry: None, status: ValidationStatus::InvalidCertificate });
    }

    #[test]
    fn test_unregistered_certificate_precedes_duplicate() {
        let registry = registry();
        let (store, _) = store_with_ulr("TC999924000000001F");
        let verdict = CertificateValidator::new(&registry, &store)
            .validate_on(&fields(Some("TC-9999"), Some("TC999924000000001F"), None, None), None, today())
            .unwrap();
        assert_eq!(verdict.status, ValidationStatus::InvalidCertificate);
        assert!(verdict.entry.is_none());
    }

    #[test]
    fn test_category_selects_entry() {
        let registry = registry();
        let store = MemoryReportStore::new();
        let validator = CertificateValidator::new(&registry, &store);

        let testing = validator
            .validate_on(&fields(Some("TC-5589"), None, None, Some(Category::Testing)), None, today())
            .unwrap();
        assert_eq!(testing.entry.unwrap().laboratory_name, "Acme Testing");

        let unknown = validator
            .validate_on(&fields(Some("TC-5589"), None, None, Some(Category::Medical)), None, today())
            .unwrap();
        assert_eq!(unknown.entry.unwrap().laboratory_name, "Acme Calibration");

        let none = validator
            .validate_on(&fields(Some("TC-5589"), None, None, None), None, today())
            .unwrap();
        assert_eq!(none.entry.unwrap().laboratory_name, "Acme Calibration");
    }

    #[test]
    fn test_duplicate_keeps_entry_and_respects_exclusion() {
        let registry = registry();
        let (store, own_id) = store_with_ulr("TC558924000000001F");
        let validator = CertificateValidator::new(&registry, &store);
        let extracted = fields(Some("TC-5589"), Some("TC558924000000001F"), None, None);

        let duplicate = validator.validate_on(&extracted, None, today()).unwrap();
        assert_eq!(duplicate.status, ValidationStatus::DuplicateUlr);
        assert!(duplicate.entry.is_some());

        let own = validator.validate_on(&extracted, Some(own_id), today()).unwrap();
        assert_eq!(own.status, ValidationStatus::Valid);

        // Re-running gives the same answer.
        assert_eq!(validator.validate_on(&extracted, Some(own_id), today()).unwrap(), own);
    }

    #[test]
    fn test_missing_expiry_is_invalid() {
        let registry = MemoryRegistry::new(vec![CertificateRecord::new("L2", "No Dates Lab", "CC-1001")]);
        let store = MemoryReportStore::new();
        let verdict = CertificateValidator::new(&registry, &store)
            .validate_on(&fields(Some("CC-1001"), None, None, None), None, today())
            .unwrap();
        assert_eq!(verdict.status, ValidationStatus::InvalidCertificate);
        assert_eq!(verdict.entry.unwrap().identifier, "L2");
    }

    #[test]
    fn test_expiry_boundary() {
        let registry = MemoryRegistry::new(vec![
            CertificateRecord::new("L3", "Edge Lab", "TC-2000").with_expiry_date(date(2025, 3, 1)),
        ]);
        let store = MemoryReportStore::new();
        let validator = CertificateValidator::new(&registry, &store);
        let extracted = fields(Some("TC-2000"), None, None, None);

        let on_expiry = validator.validate_on(&extracted, None, date(2025, 3, 1)).unwrap();
        assert_eq!(on_expiry.status, ValidationStatus::Valid);

        let day_after = validator.validate_on(&extracted, None, date(2025, 3, 2)).unwrap();
        assert_eq!(day_after.status, ValidationStatus::CertificateExpired);
    }

    #[test]
    fn test_extension_overrides_nominal_expiry() {
        let registry = MemoryRegistry::new(vec![
            CertificateRecord::new("L4", "Extended Lab", "TC-3000")
                .with_expiry_date(date(2020, 1, 1))
                .with_extended_expiry_date(date(2026, 1, 1)),
        ]);
        let store = MemoryReportStore::new();
        let verdict = CertificateValidator::new(&registry, &store)
            .validate_on(&fields(Some("TC-3000"), None, None, None), None, today())
            .unwrap();
        assert_eq!(verdict.status, ValidationStatus::Valid);
    }

    #[test]
    fn test_issue_date_consistency() {
        let registry = registry();
        let store = MemoryReportStore::new();
        let validator = CertificateValidator::new(&registry, &store);

        let early = validator
            .validate_on(&fields(Some("TC-5589"), None, Some("01/01/2022"), None), None, today())
            .unwrap();
        assert_eq!(early.status, ValidationStatus::InvalidIssueDate);

        let same_day = validator
            .validate_on(&fields(Some("TC-5589"), None, Some("01 JUN 2022"), None), None, today())
            .unwrap();
        assert_eq!(same_day.status, ValidationStatus::Valid);

        let garbled = validator
            .validate_on(&fields(Some("TC-5589"), None, Some("99/99/2022"), None), None, today())
            .unwrap();
        assert_eq!(garbled.status, ValidationStatus::Valid);
    }

    #[test]
    fn test_expired_precedes_issue_date_check() {
        let registry = MemoryRegistry::new(vec![
            CertificateRecord::new("L5", "Old Lab", "TC-4000")
                .with_issue_date(date(2019, 1, 1))
                .with_expiry_date(date(2020, 1, 1)),
        ]);
        let store = MemoryReportStore::new();
        let verdict = CertificateValidator::new(&registry, &store)
            .validate_on(&fields(Some("TC-4000"), None, Some("01/01/2010"), None), None, today())
            .unwrap();
        assert_eq!(verdict.status, ValidationStatus::CertificateExpired);
    }

    struct FailingStore;

    impl ReportStore for FailingStore {
        fn registration_number_exists(&self, _: &str, _: Option<i64>) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("database is down".to_string()))
        }
        fn find_by_content_hash(&self, _: &str) -> Result<Option<crate::ReportRecord>, StoreError> {
            Ok(None)
        }
        fn find_by_id(&self, _: i64) -> Result<Option<crate::ReportRecord>, StoreError> {
            Ok(None)
        }
        fn find_latest_by_registration_number(&self, _: &str) -> Result<Option<crate::ReportRecord>, StoreError> {
            Ok(None)
        }
        fn upsert(&self, _: NewReport) -> Result<crate::ReportRecord, StoreError> {
            Err(StoreError::Unavailable("database is down".to_string()))
        }
    }

    #[test]
    fn test_store_failure_propagates() {
        let registry = registry();
        let result = CertificateValidator::new(&registry, &FailingStore).validate_on(
            &fields(Some("TC-5589"), Some("TC558924000000001F"), None, None),
            None,
            today(),
        );
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
