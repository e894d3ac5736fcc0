//! Registry and report-store collaborators.
//!
//! The engines only ever read through these traits. Writes happen in the
//! verification service after a verdict has been reached.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::{MemoryRegistry, MemoryReportStore};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::models::certificate::CertificateRecord;
use crate::models::report::{NewReport, ReportRecord};

/// Read access to the accreditation registry.
pub trait CertificateRegistry {
    /// All entries with exactly this certificate number, in natural order.
    fn find_by_certificate_number(&self, certificate_number: &str) -> Result<Vec<CertificateRecord>, StoreError>;

    /// Entries whose laboratory name contains `fragment`, case-insensitively.
    fn find_by_name(&self, fragment: &str) -> Result<Vec<CertificateRecord>, StoreError>;

    /// Every laboratory name, in a deterministic order for one snapshot.
    fn laboratory_names(&self) -> Result<Vec<String>, StoreError>;
}

/// Access to previously uploaded reports.
pub trait ReportStore {
    /// Whether a report other than `exclude_id` carries this registration number.
    fn registration_number_exists(&self, ulr: &str, exclude_id: Option<i64>) -> Result<bool, StoreError>;

    fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<ReportRecord>, StoreError>;

    fn find_by_id(&self, id: i64) -> Result<Option<ReportRecord>, StoreError>;

    /// Most recently updated report with this registration number.
    fn find_latest_by_registration_number(&self, ulr: &str) -> Result<Option<ReportRecord>, StoreError>;

    /// Insert a report, or update the one with the same content hash in place.
    fn upsert(&self, report: NewReport) -> Result<ReportRecord, StoreError>;
}

impl<T: CertificateRegistry + ?Sized> CertificateRegistry for &T {
    fn find_by_certificate_number(&self, certificate_number: &str) -> Result<Vec<CertificateRecord>, StoreError> {
        (**self).find_by_certificate_number(certificate_number)
    }

    fn find_by_name(&self, fragment: &str) -> Result<Vec<CertificateRecord>, StoreError> {
        (**self).find_by_name(fragment)
    }

    fn laboratory_names(&self) -> Result<Vec<String>, StoreError> {
        (**self).laboratory_names()
    }
}

impl<T: ReportStore + ?Sized> ReportStore for &T {
    fn registration_number_exists(&self, ulr: &str, exclude_id: Option<i64>) -> Result<bool, StoreError> {
        (**self).registration_number_exists(ulr, exclude_id)
    }

    fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<ReportRecord>, StoreError> {
        (**self).find_by_content_hash(content_hash)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<ReportRecord>, StoreError> {
        (**self).find_by_id(id)
    }

    fn find_latest_by_registration_number(&self, ulr: &str) -> Result<Option<ReportRecord>, StoreError> {
        (**self).find_latest_by_registration_number(ulr)
    }

    fn upsert(&self, report: NewReport) -> Result<ReportRecord, StoreError> {
        (**self).upsert(report)
    }
}
