//! services/api/src/ingest/pdf.rs
//!
//! PDF text extraction using lopdf. The uploaded bytes are parsed in memory;
//! pages that fail to decode are skipped with a warning rather than failing
//! the whole upload.

use tracing::{debug, warn};

use doc_chat_core::ports::{PortError, PortResult};

/// Extracts the text content of a PDF from its raw bytes.
///
/// Returns a validation error when the document parses but contains no
/// extractable text at all.
pub fn extract_text(bytes: &[u8]) -> PortResult<String> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| PortError::Unexpected(format!("Failed to load PDF: {}", e)))?;

    let pages = doc.get_pages();
    debug!(page_count = pages.len(), "Extracting text from PDF");

    let mut text = String::new();
    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => {
                warn!(page = page_num, error = %e, "Failed to extract text from page, skipping");
            }
        }
    }

    if text.trim().is_empty() {
        return Err(PortError::Validation(
            "No usable text content found in the document".to_string(),
        ));
    }

    Ok(text)
}
