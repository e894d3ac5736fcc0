//! In-process registry and report store.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use super::{CertificateRegistry, ReportStore};
use crate::error::StoreError;
use crate::models::certificate::CertificateRecord;
use crate::models::report::{NewReport, ReportRecord};

/// Registry held in memory; iteration order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    records: Vec<CertificateRecord>,
}

impl MemoryRegistry {
    pub fn new(records: Vec<CertificateRecord>) -> Self {
        Self { records }
    }

    pub fn insert(&mut self, record: CertificateRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CertificateRegistry for MemoryRegistry {
    fn find_by_certificate_number(&self, certificate_number: &str) -> Result<Vec<CertificateRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.certificate_number == certificate_number)
            .cloned()
            .collect())
    }

    fn find_by_name(&self, fragment: &str) -> Result<Vec<CertificateRecord>, StoreError> {
        let needle = fragment.to_lowercase();
        Ok(self
            .records
            .iter()
            .filter(|r| r.laboratory_name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn laboratory_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.records.iter().map(|r| r.laboratory_name.clone()).collect())
    }
}

#[derive(Debug, Default)]
struct Reports {
    rows: Vec<ReportRecord>,
    next_id: i64,
}

/// Report store held in memory.
///
/// The content-hash check and the insert happen under one lock, so concurrent
/// uploads of identical bytes converge on one record.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: Mutex<Reports>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Reports>, StoreError> {
        self.reports
            .lock()
            .map_err(|_| StoreError::Unavailable("report store lock poisoned".to_string()))
    }
}

impl ReportStore for MemoryReportStore {
    fn registration_number_exists(&self, ulr: &str, exclude_id: Option<i64>) -> Result<bool, StoreError> {
        let reports = self.lock()?;
        Ok(reports.rows.iter().any(|r| {
            r.unique_registration_number.as_deref() == Some(ulr) && Some(r.id) != exclude_id
        }))
    }

    fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<ReportRecord>, StoreError> {
        let reports = self.lock()?;
        Ok(reports.rows.iter().find(|r| r.content_hash == content_hash).cloned())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<ReportRecord>, StoreError> {
        let reports = self.lock()?;
        Ok(reports.rows.iter().find(|r| r.id == id).cloned())
    }

    fn find_latest_by_registration_number(&self, ulr: &str) -> Result<Option<ReportRecord>, StoreError> {
        let reports = self.lock()?;
        Ok(reports
            .rows
            .iter()
            .filter(|r| r.unique_registration_number.as_deref() == Some(ulr))
            .max_by_key(|r| (r.updated_at, r.id))
            .cloned())
    }

    fn upsert(&self, report: NewReport) -> Result<ReportRecord, StoreError> {
        let mut reports = self.lock()?;
        let now = Utc::now();

        if let Some(existing) = reports
            .rows
            .iter_mut()
            .find(|r| r.content_hash == report.content_hash)
        {
            debug!("Updating report {} in place", existing.id);
            *existing = report.into_record(existing.id, existing.created_at, now);
            return Ok(existing.clone());
        }

        reports.next_id += 1;
        let record = report.into_record(reports.next_id, now, now);
        debug!("Created report {}", record.id);
        reports.rows.push(record.clone());
        Ok(record)
    }
}
