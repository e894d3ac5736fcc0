//! Tesseract-backed recognition for scanned PDFs and images.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, info, warn};

use super::{DocumentKind, TextSource};
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Runs `pdftoppm` and `tesseract` at the paths given in [`OcrConfig`].
#[derive(Debug, Clone)]
pub struct TesseractSource {
    config: OcrConfig,
}

impl TesseractSource {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Recognize a single image.
    pub fn recognize_image(&self, image: &Path) -> Result<String, OcrError> {
        let output = run(
            Command::new(&self.config.tesseract_cmd)
                .arg(image)
                .arg("stdout")
                .arg("-l")
                .arg(&self.config.language),
            &self.config.tesseract_cmd,
        )?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Render every PDF page to PNG inside `dir`, in page order.
    fn rasterize(&self, pdf: &Path, dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
        run(
            Command::new(&self.config.pdftoppm_cmd)
                .arg("-r")
                .arg(self.config.render_dpi.to_string())
                .arg("-png")
                .arg(pdf)
                .arg(dir.join("page")),
            &self.config.pdftoppm_cmd,
        )?;

        let mut pages: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        // pdftoppm zero-pads page numbers, so lexical order is page order.
        pages.sort();
        Ok(pages)
    }

    fn extract_pdf(&self, path: &Path) -> Result<String, OcrError> {
        #[cfg(feature = "pdf")]
        if self.config.prefer_embedded_text {
            let data = std::fs::read(path)?;
            match super::embedded_text(&data) {
                Ok(text) if text.trim().len() >= self.config.min_text_length => {
                    debug!("Using embedded PDF text ({} chars)", text.len());
                    return Ok(text);
                }
                Ok(_) => debug!("Embedded PDF text too short, falling back to OCR"),
                Err(e) => warn!("Could not read PDF text layer, falling back to OCR: {}", e),
            }
        }

        let scratch = tempfile::tempdir()?;
        let pages = self.rasterize(path, scratch.path())?;
        if pages.is_empty() {
            return Err(OcrError::NoPages(path.display().to_string()));
        }

        info!("Running OCR on {} rendered pages", pages.len());
        let mut texts = Vec::with_capacity(pages.len());
        for page in &pages {
            texts.push(self.recognize_image(page)?);
        }
        Ok(texts.join("\n"))
    }
}

impl TextSource for TesseractSource {
    fn extract_text(&self, path: &Path) -> Result<String, OcrError> {
        match DocumentKind::from_path(path) {
            Some(DocumentKind::Pdf) => self.extract_pdf(path),
            Some(DocumentKind::Image) => self.recognize_image(path),
            Some(DocumentKind::PlainText) | None => {
                Err(OcrError::UnsupportedFormat(path.display().to_string()))
            }
        }
    }
}

fn run(command: &mut Command, tool: &Path) -> Result<Output, OcrError> {
    let tool = tool.display().to_string();
    debug!("Running {:?}", command);

    let output = command.output().map_err(|e| OcrError::ToolLaunch {
        tool: tool.clone(),
        reason: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(OcrError::ToolFailed {
            tool,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_tools() -> OcrConfig {
        OcrConfig {
            tesseract_cmd: PathBuf::from("/nonexistent/labcert/tesseract"),
            pdftoppm_cmd: PathBuf::from("/nonexistent/labcert/pdftoppm"),
            ..OcrConfig::default()
        }
    }

    #[test]
    fn test_configured_tesseract_path_is_used() {
        let source = TesseractSource::new(missing_tools());
        let err = source.extract_text(Path::new("scan.png")).unwrap_err();
        match err {
            OcrError::ToolLaunch { tool, .. } => assert_eq!(tool, "/nonexistent/labcert/tesseract"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pdf_falls_back_to_configured_rasterizer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"not really a pdf").unwrap();

        let err = TesseractSource::new(missing_tools()).extract_text(&path).unwrap_err();
        match err {
            OcrError::ToolLaunch { tool, .. } => assert_eq!(tool, "/nonexistent/labcert/pdftoppm"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_is_not_handled() {
        let err = TesseractSource::new(OcrConfig::default())
            .extract_text(Path::new("notes.txt"))
            .unwrap_err();
        assert!(matches!(err, OcrError::UnsupportedFormat(_)));
    }
}
