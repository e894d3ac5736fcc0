//! Configuration structures for the verification pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for labcert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabcertConfig {
    /// OCR collaborator configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Registry and report-store configuration.
    pub store: StoreConfig,
}

/// Text-source configuration.
///
/// External tool locations are handed to the OCR collaborator when it is
/// built; nothing reads them from process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable.
    pub tesseract_cmd: PathBuf,

    /// Poppler `pdftoppm` executable used to rasterize PDF pages.
    pub pdftoppm_cmd: PathBuf,

    /// Tesseract language code.
    pub language: String,

    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Try the PDF's embedded text layer before falling back to OCR.
    pub prefer_embedded_text: bool,

    /// Minimum embedded text length to skip OCR.
    pub min_text_length: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: PathBuf::from("tesseract"),
            pdftoppm_cmd: PathBuf::from("pdftoppm"),
            language: "eng".to_string(),
            render_dpi: 300,
            prefer_embedded_text: true,
            min_text_length: 50,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Look for registry laboratory names verbatim in the text.
    pub match_lab_names: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            match_lab_names: true,
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database holding the registry and the report store.
    pub database_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("labcert.db"),
        }
    }
}

impl LabcertConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: LabcertConfig =
            serde_json::from_str(r#"{"ocr": {"tesseract_cmd": "/opt/tesseract/bin/tesseract"}}"#).unwrap();
        assert_eq!(config.ocr.tesseract_cmd, PathBuf::from("/opt/tesseract/bin/tesseract"));
        assert_eq!(config.ocr.pdftoppm_cmd, PathBuf::from("pdftoppm"));
        assert_eq!(config.ocr.render_dpi, 300);
        assert!(config.extraction.match_lab_names);
        assert_eq!(config.store.database_path, PathBuf::from("labcert.db"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = LabcertConfig::default();
        config.ocr.language = "eng+hin".to_string();
        config.extraction.match_lab_names = false;
        config.save(&path).unwrap();

        let loaded = LabcertConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ocr.language, "eng+hin");
        assert!(!loaded.extraction.match_lab_names);
    }
}
