//! Verification service: upload, re-validation and lookup flows.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::extraction::{CertificateParser, ExtractionResult};
use crate::hash::content_hash;
use crate::models::certificate::CertificateRecord;
use crate::models::report::{NewReport, ReportRecord, VerificationResponse};
use crate::store::{CertificateRegistry, ReportStore};
use crate::validation::{CertificateValidator, Verdict};

/// Ties extraction, validation and persistence together.
///
/// First-time validation and re-validation run the same algorithm; the only
/// difference is that re-validation excludes the report's own id from the
/// duplicate check.
pub struct VerificationService<R, S> {
    registry: R,
    store: S,
    parser: CertificateParser,
    today: Option<NaiveDate>,
}

impl<R, S> VerificationService<R, S>
where
    R: CertificateRegistry,
    S: ReportStore,
{
    pub fn new(registry: R, store: S) -> Self {
        Self {
            registry,
            store,
            parser: CertificateParser::new(),
            today: None,
        }
    }

    /// Use a specific parser configuration.
    pub fn with_parser(mut self, parser: CertificateParser) -> Self {
        self.parser = parser;
        self
    }

    /// Pin the date expiry is checked against.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run extraction only.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        self.parser.parse_with_registry(text, &self.registry)
    }

    /// Verify an uploaded document given its bytes and recognized text.
    ///
    /// A document whose bytes were seen before is re-validated and its report
    /// updated in place rather than duplicated.
    pub fn verify_document(&self, bytes: &[u8], text: &str) -> Result<VerificationResponse, StoreError> {
        let hash = content_hash(bytes);
        let existing = self.store.find_by_content_hash(&hash)?;
        if let Some(report) = &existing {
            info!("Document {} already known as report {}, re-validating", hash, report.id);
        }

        let (record, verdict) = self.run(hash, text, existing.as_ref().map(|r| r.id))?;
        Ok(VerificationResponse::new(&record, verdict.entry.as_ref(), existing.is_some()))
    }

    /// Re-validate a stored report from its document bytes and freshly
    /// recognized text.
    ///
    /// The bytes must hash to the report's content hash; a different document
    /// is rejected rather than written over the stored row.
    pub fn revalidate(&self, report_id: i64, bytes: &[u8], text: &str) -> Result<VerificationResponse, StoreError> {
        let report = self
            .store
            .find_by_id(report_id)?
            .ok_or(StoreError::ReportNotFound(report_id))?;

        let hash = content_hash(bytes);
        if hash != report.content_hash {
            warn!("Refusing to re-validate report {} with a different document", report_id);
            return Err(StoreError::DocumentMismatch {
                report_id,
                expected: report.content_hash,
                actual: hash,
            });
        }

        let (record, verdict) = self.run(report.content_hash, text, Some(report_id))?;
        Ok(VerificationResponse::new(&record, verdict.entry.as_ref(), true))
    }

    /// Latest verdict recorded for a registration number.
    pub fn lookup(&self, ulr: &str) -> Result<Option<VerificationResponse>, StoreError> {
        let Some(report) = self.store.find_latest_by_registration_number(ulr.trim())? else {
            return Ok(None);
        };

        let entry = self.registry_entry_for(&report)?;
        Ok(Some(VerificationResponse::new(&report, entry.as_ref(), true)))
    }

    fn run(
        &self,
        hash: String,
        text: &str,
        exclude_report: Option<i64>,
    ) -> Result<(ReportRecord, Verdict), StoreError> {
        let extraction = self.extract(text);
        let fields = extraction.fields;

        let validator = CertificateValidator::new(&self.registry, &self.store);
        let verdict = match self.today {
            Some(today) => validator.validate_on(&fields, exclude_report, today)?,
            None => validator.validate(&fields, exclude_report)?,
        };

        let record = self.store.upsert(NewReport::from_verdict(
            hash,
            &fields,
            verdict.entry.as_ref(),
            verdict.status,
        ))?;
        info!("Report {} stored with status {}", record.id, record.status);

        Ok((record, verdict))
    }

    /// Registry entry matching a stored report's certificate and category.
    fn registry_entry_for(&self, report: &ReportRecord) -> Result<Option<CertificateRecord>, StoreError> {
        let Some(certificate_number) = report.certificate_number.as_deref() else {
            return Ok(None);
        };

        let candidates = self.registry.find_by_certificate_number(certificate_number)?;
        let preferred = report.category.as_ref().and_then(|category| {
            candidates
                .iter()
                .find(|c| c.category.as_ref().is_some_and(|registered| registered.matches(category)))
                .cloned()
        });
        Ok(preferred.or_else(|| candidates.into_iter().next()))
    }
}
