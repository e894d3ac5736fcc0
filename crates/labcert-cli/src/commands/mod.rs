//! Subcommands and the helpers they share.

pub mod config;
pub mod extract;
pub mod lookup;
pub mod registry;
pub mod revalidate;
pub mod verify;

use std::fs;
use std::path::{Path, PathBuf};

use labcert_core::{CertificateParser, LabcertConfig, SqliteStore, VerificationService};
use tracing::debug;

/// Load configuration: an explicit path, then the user config file, then defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<LabcertConfig> {
    if let Some(path) = config_path {
        return Ok(LabcertConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(LabcertConfig::from_file(&default_path)?)
    } else {
        Ok(LabcertConfig::default())
    }
}

/// Open the SQLite registry/report database.
pub fn open_store(db: Option<&PathBuf>, config: &LabcertConfig) -> anyhow::Result<SqliteStore> {
    let path = db.unwrap_or(&config.store.database_path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    debug!("Opening database {}", path.display());
    Ok(SqliteStore::open(path)?)
}

/// Build the verification service over one database used as both registry and report store.
pub fn service<'a>(
    store: &'a SqliteStore,
    config: &LabcertConfig,
) -> VerificationService<&'a SqliteStore, &'a SqliteStore> {
    VerificationService::new(store, store).with_parser(CertificateParser::from_config(&config.extraction))
}
