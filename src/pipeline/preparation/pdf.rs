use super::PreparationError;

/// Extract the embedded text layer of a digital PDF, page by page.
///
/// Pages are joined with a blank line. A PDF whose text layer is empty or
/// whitespace-only (typically a scan) yields `NoTextFound`: the caller must
/// not forward it to analysis.
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, PreparationError> {
    // pdf-extract can panic on malformed fonts/glyphs instead of erroring.
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(pdf_bytes))
        .map_err(|_| PreparationError::PdfParsing("PDF parser panicked on malformed content".into()))?
        .map_err(|e| PreparationError::PdfParsing(e.to_string()))?;

    let page_count = pages.len();
    let text = pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    if text.trim().is_empty() {
        tracing::warn!(page_count, "PDF has no extractable text layer");
        return Err(PreparationError::NoTextFound);
    }

    tracing::debug!(page_count, text_len = text.len(), "PDF text extracted");
    Ok(text)
}
