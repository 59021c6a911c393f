//! PDF text extraction.

use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use crate::document::Document;
use crate::error::{RagError, Result};

/// How far into the upload the `%PDF-` marker may appear.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Loads PDF bytes into a [`Document`].
///
/// Text is extracted page by page and concatenated in page order. A page that
/// has no text layer, or whose content cannot be decoded, contributes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse `bytes` as a PDF named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidDocument`] if the bytes are empty, lack a PDF
    /// header, or cannot be parsed.
    pub fn load(&self, name: &str, bytes: &[u8]) -> Result<Document> {
        if bytes.is_empty() {
            return Err(RagError::InvalidDocument(format!("'{name}' is empty")));
        }
        let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
        if !window.windows(5).any(|w| w == b"%PDF-") {
            return Err(RagError::InvalidDocument(format!("'{name}' is not a PDF file")));
        }

        let pdf = lopdf::Document::load_mem(bytes).map_err(|e| {
            warn!(document.name = name, error = %e, "failed to parse PDF");
            RagError::InvalidDocument(format!("'{name}' could not be parsed: {e}"))
        })?;

        let pages = pdf.get_pages();
        let mut text = String::new();
        let mut empty_pages = 0;

        for &page_number in pages.keys() {
            match pdf.extract_text(&[page_number]) {
                Ok(page_text) if !page_text.trim().is_empty() => text.push_str(&page_text),
                Ok(_) => {
                    warn!(document.name = name, page = page_number, "page has no extractable text");
                    empty_pages += 1;
                }
                Err(e) => {
                    warn!(
                        document.name = name,
                        page = page_number,
                        error = %e,
                        "skipping page without extractable text"
                    );
                    empty_pages += 1;
                }
            }
        }

        if text.trim().is_empty() {
            warn!(document.name = name, page_count = pages.len(), "no extractable text in PDF");
        }

        let document = Document {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            page_count: pages.len(),
            metadata: HashMap::from([
                ("source".to_string(), name.to_string()),
                ("page_count".to_string(), pages.len().to_string()),
            ]),
            text,
        };

        info!(
            document.id = %document.id,
            document.name = name,
            page_count = document.page_count,
            empty_pages,
            char_count = document.char_count(),
            "loaded PDF"
        );

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{pdf_with_pages, pdf_without_text};

    #[test]
    fn extracts_pages_in_order() {
        let bytes =
            pdf_with_pages(&["Alpha page one", "Bravo page two\nsecond line", "Charlie page three"]);
        let document = PdfLoader::new().load("three.pdf", &bytes).unwrap();

        assert_eq!(document.page_count, 3);
        assert_eq!(document.name, "three.pdf");
        let alpha = document.text.find("Alpha").unwrap();
        let bravo = document.text.find("Bravo").unwrap();
        let charlie = document.text.find("Charlie").unwrap();
        assert!(alpha < bravo && bravo < charlie);
        assert!(document.text.contains("second line"));
        assert_eq!(document.metadata.get("page_count").map(String::as_str), Some("3"));
    }

    #[test]
    fn pages_without_text_contribute_nothing() {
        let document = PdfLoader::new().load("scan.pdf", &pdf_without_text(2)).unwrap();
        assert_eq!(document.page_count, 2);
        assert!(document.text.trim().is_empty());
    }

    #[test]
    fn blank_page_between_text_pages_is_skipped() {
        let bytes = pdf_with_pages(&["Alpha page one", "", "Charlie page three"]);
        let document = PdfLoader::new().load("gap.pdf", &bytes).unwrap();

        assert_eq!(document.page_count, 3);
        let alpha = document.text.find("Alpha").unwrap();
        let charlie = document.text.find("Charlie").unwrap();
        assert!(alpha < charlie);
        assert_eq!(document.text.trim().lines().filter(|l| !l.trim().is_empty()).count(), 2);
    }

    #[test]
    fn rejects_non_pdf_input() {
        let loader = PdfLoader::new();
        for bytes in [&b""[..], b"hello, plain text", b"\x89PNG\r\n\x1a\n"] {
            let err = loader.load("upload.bin", bytes).unwrap_err();
            assert!(matches!(err, RagError::InvalidDocument(_)), "got {err:?}");
        }
    }

    #[test]
    fn rejects_truncated_pdf() {
        let bytes = pdf_with_pages(&["will be cut"]);
        let err = PdfLoader::new().load("cut.pdf", &bytes[..bytes.len() / 3]).unwrap_err();
        assert!(matches!(err, RagError::InvalidDocument(_)), "got {err:?}");
    }
}
