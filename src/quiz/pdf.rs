//! PDF text-extraction collaborator.
//!
//! All the quiz core needs from a PDF is its text, pages in order, with at
//! least whitespace between pages. `pdf-extract` provides exactly that; the
//! structural work of finding questions happens in [`crate::quiz::extract`].

use crate::quiz::error::SourceError;

/// Extracts all text from the PDF bytes. Corrupt or unsupported files are
/// reported as [`SourceError::PdfExtraction`] with the library's message.
pub fn extract_text(bytes: &[u8]) -> Result<String, SourceError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|err| SourceError::PdfExtraction(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_reported_not_panicked() {
        let result = extract_text(b"this is not a pdf");
        assert!(matches!(result, Err(SourceError::PdfExtraction(_))));
    }
}
