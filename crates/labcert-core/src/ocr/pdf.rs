//! Embedded PDF text layer.

use lopdf::Document;
use tracing::debug;

use crate::error::OcrError;

/// Read the text layer of a PDF.
///
/// PDFs encrypted with an empty password are decrypted first; anything else
/// encrypted is an error.
pub fn embedded_text(data: &[u8]) -> Result<String, OcrError> {
    let mut doc = Document::load_mem(data).map_err(|e| OcrError::Pdf(e.to_string()))?;

    let raw = if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|_| OcrError::Pdf("document is encrypted".to_string()))?;
        debug!("Decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| OcrError::Pdf(format!("failed to save decrypted PDF: {}", e)))?;
        decrypted
    } else {
        data.to_vec()
    };

    if doc.get_pages().is_empty() {
        return Err(OcrError::Pdf("document has no pages".to_string()));
    }

    pdf_extract::extract_text_from_mem(&raw).map_err(|e| OcrError::Pdf(e.to_string()))
}
