//! SQLite-backed registry and report store.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use super::{CertificateRegistry, ReportStore};
use crate::error::StoreError;
use crate::models::certificate::{Category, CertificateRecord};
use crate::models::report::{NewReport, ReportRecord, ValidationStatus};

const REPORT_COLUMNS: &str = "id, content_hash, certificate_number, unique_registration_number, \
     laboratory_name, category, issue_date_text, status, validation_score, created_at, updated_at";

const CERTIFICATE_COLUMNS: &str = "identifier, laboratory_name, certificate_number, category, \
     issue_date, expiry_date, extended_expiry_date, city, state";

/// One SQLite connection serving as both registry and report store.
///
/// Content-hash uniqueness is a table constraint, and uploads go through
/// `INSERT ... ON CONFLICT DO UPDATE`, so identical documents always land on
/// the same row.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Add one registry entry.
    pub fn insert_certificate(&self, record: &CertificateRecord) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO certificate_records (identifier, laboratory_name, certificate_number, category,
             issue_date, expiry_date, extended_expiry_date, city, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.identifier,
                record.laboratory_name,
                record.certificate_number,
                record.category.as_ref().map(Category::as_str),
                record.issue_date,
                record.expiry_date,
                record.extended_expiry_date,
                record.city,
                record.state,
            ],
        )?;
        Ok(())
    }

    /// Load registry entries from a JSON array of [`CertificateRecord`]s.
    ///
    /// Certificate numbers are upper-cased and trimmed on the way in. Returns
    /// the number of entries inserted.
    pub fn load_registry_json(&self, json: &str) -> Result<usize, StoreError> {
        let records: Vec<CertificateRecord> =
            serde_json::from_str(json).map_err(|e| StoreError::InvalidData(e.to_string()))?;

        let tx = self.conn.unchecked_transaction()?;
        for mut record in records.iter().cloned() {
            record.certificate_number = record.certificate_number.trim().to_uppercase();
            self.insert_certificate(&record)?;
        }
        tx.commit()?;

        info!("Loaded {} registry entries", records.len());
        Ok(records.len())
    }

    /// Number of registry entries.
    pub fn certificate_count(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM certificate_records", [], |row| row.get(0))?;
        Ok(count)
    }

    fn query_certificates(&self, sql: &str, param: &str) -> Result<Vec<CertificateRecord>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![param], certificate_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn query_report(&self, sql: &str, param: impl rusqlite::ToSql) -> Result<Option<ReportRecord>, StoreError> {
        let row = self
            .conn
            .query_row(sql, params![param], ReportRow::from_row)
            .optional()?;
        row.map(ReportRow::into_record).transpose()
    }
}

/// Run all pending migrations.
fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(1, include_str!("../../migrations/001_initial.sql"))];

    for (version, sql) in migrations {
        if version > current_version {
            info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| StoreError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Current schema version (0 if no schema exists yet).
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i64>>(0)
    })
    .ok()
    .flatten()
    .unwrap_or(0)
}

fn certificate_from_row(row: &Row<'_>) -> rusqlite::Result<CertificateRecord> {
    Ok(CertificateRecord {
        identifier: row.get(0)?,
        laboratory_name: row.get(1)?,
        certificate_number: row.get(2)?,
        category: row.get::<_, Option<String>>(3)?.as_deref().and_then(Category::parse),
        issue_date: row.get::<_, Option<NaiveDate>>(4)?,
        expiry_date: row.get::<_, Option<NaiveDate>>(5)?,
        extended_expiry_date: row.get::<_, Option<NaiveDate>>(6)?,
        city: row.get(7)?,
        state: row.get(8)?,
    })
}

struct ReportRow {
    id: i64,
    content_hash: String,
    certificate_number: Option<String>,
    unique_registration_number: Option<String>,
    laboratory_name: Option<String>,
    category: Option<String>,
    issue_date_text: Option<String>,
    status: String,
    validation_score: u8,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReportRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content_hash: row.get(1)?,
            certificate_number: row.get(2)?,
            unique_registration_number: row.get(3)?,
            laboratory_name: row.get(4)?,
            category: row.get(5)?,
            issue_date_text: row.get(6)?,
            status: row.get(7)?,
            validation_score: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_record(self) -> Result<ReportRecord, StoreError> {
        let status = ValidationStatus::from_code(&self.status)
            .ok_or_else(|| StoreError::InvalidData(format!("unknown status {:?}", self.status)))?;

        Ok(ReportRecord {
            id: self.id,
            content_hash: self.content_hash,
            certificate_number: self.certificate_number,
            unique_registration_number: self.unique_registration_number,
            laboratory_name: self.laboratory_name,
            category: self.category.as_deref().and_then(Category::parse),
            issue_date_text: self.issue_date_text,
            status,
            validation_score: self.validation_score,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl CertificateRegistry for SqliteStore {
    fn find_by_certificate_number(&self, certificate_number: &str) -> Result<Vec<CertificateRecord>, StoreError> {
        self.query_certificates(
            &format!(
                "SELECT {CERTIFICATE_COLUMNS} FROM certificate_records
                 WHERE certificate_number = ?1 ORDER BY row_id"
            ),
            certificate_number,
        )
    }

    fn find_by_name(&self, fragment: &str) -> Result<Vec<CertificateRecord>, StoreError> {
        self.query_certificates(
            &format!(
                "SELECT {CERTIFICATE_COLUMNS} FROM certificate_records
                 WHERE instr(lower(laboratory_name), lower(?1)) > 0 ORDER BY row_id"
            ),
            fragment,
        )
    }

    fn laboratory_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT laboratory_name FROM certificate_records ORDER BY row_id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for name in rows {
            names.push(name?);
        }
        Ok(names)
    }
}

impl ReportStore for SqliteStore {
    fn registration_number_exists(&self, ulr: &str, exclude_id: Option<i64>) -> Result<bool, StoreError> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM reports
             WHERE unique_registration_number = ?1 AND (?2 IS NULL OR id != ?2))",
            params![ulr, exclude_id],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }

    fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<ReportRecord>, StoreError> {
        self.query_report(
            &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE content_hash = ?1"),
            content_hash,
        )
    }

    fn find_by_id(&self, id: i64) -> Result<Option<ReportRecord>, StoreError> {
        self.query_report(&format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"), id)
    }

    fn find_latest_by_registration_number(&self, ulr: &str) -> Result<Option<ReportRecord>, StoreError> {
        self.query_report(
            &format!(
                "SELECT {REPORT_COLUMNS} FROM reports WHERE unique_registration_number = ?1
                 ORDER BY updated_at DESC, id DESC LIMIT 1"
            ),
            ulr,
        )
    }

    fn upsert(&self, report: NewReport) -> Result<ReportRecord, StoreError> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO reports (content_hash, certificate_number, unique_registration_number,
             laboratory_name, category, issue_date_text, status, validation_score, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(content_hash) DO UPDATE SET
                certificate_number = excluded.certificate_number,
                unique_registration_number = excluded.unique_registration_number,
                laboratory_name = excluded.laboratory_name,
                category = excluded.category,
                issue_date_text = excluded.issue_date_text,
                status = excluded.status,
                validation_score = excluded.validation_score,
                updated_at = excluded.updated_at",
            params![
                report.content_hash,
                report.certificate_number,
                report.unique_registration_number,
                report.laboratory_name,
                report.category.as_ref().map(Category::as_str),
                report.issue_date_text,
                report.status.as_str(),
                report.status.validation_score(),
                now,
            ],
        )?;

        debug!("Upserted report for content hash {}", report.content_hash);
        self.find_by_content_hash(&report.content_hash)?
            .ok_or_else(|| StoreError::InvalidData("report missing after upsert".to_string()))
    }
}
