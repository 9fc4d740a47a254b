//! Page orchestration over any [`PdfBackend`].
//!
//! A page is interpreted into glyph records with resolved colors, grouped
//! into words, and each word becomes a [`TextElement`] stamped with the
//! 1-based page number. Documents are processed page by page in order, and
//! the first failing page aborts the whole document.

use pdfvision_core::{
    ExtractOptions, ExtractResult, GlyphRecord, PdfError, TextElement, WordGrouper,
};
use pdfvision_parse::PdfBackend;

use crate::collector::GlyphCollector;

/// 1-based page number for a 0-based page index.
pub(crate) fn page_number(index: usize) -> Result<u32, PdfError> {
    index
        .checked_add(1)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| PdfError::Other(format!("page index {index} exceeds the page number range")))
}

/// Interpret one page and return its glyphs with colors resolved.
///
/// # Errors
///
/// Returns [`PdfError`] if the page does not exist or its content cannot be
/// decoded.
pub fn page_glyphs<B: PdfBackend>(
    doc: &B::Document,
    index: usize,
    options: &ExtractOptions,
) -> Result<ExtractResult<Vec<GlyphRecord>>, PdfError> {
    let page = B::get_page(doc, index).map_err(Into::<PdfError>::into)?;
    let mut collector = GlyphCollector::new(index, options.collect_warnings);
    B::interpret_page(doc, &page, &mut collector, options).map_err(Into::<PdfError>::into)?;
    Ok(ExtractResult::with_warnings(
        collector.glyphs,
        collector.warnings,
    ))
}

/// Extract the text elements of one page.
///
/// # Errors
///
/// Returns [`PdfError`] if the page does not exist or its content cannot be
/// decoded.
pub fn page_elements<B: PdfBackend>(
    doc: &B::Document,
    index: usize,
    options: &ExtractOptions,
) -> Result<ExtractResult<Vec<TextElement>>, PdfError> {
    let number = page_number(index)?;
    let ExtractResult {
        value: glyphs,
        warnings,
    } = page_glyphs::<B>(doc, index, options)?;
    let glyph_count = glyphs.len();

    let elements: Vec<TextElement> = WordGrouper::new(options.grouping.clone())
        .group(glyphs)
        .into_iter()
        .map(|group| TextElement::from_group(group, number))
        .collect();

    tracing::debug!(
        page = number,
        glyphs = glyph_count,
        elements = elements.len(),
        "extracted page"
    );
    for warning in &warnings {
        tracing::warn!(page = number, "{warning}");
    }
    Ok(ExtractResult::with_warnings(elements, warnings))
}

/// Extract the text elements of every page, in page order.
///
/// # Errors
///
/// Returns the first page's [`PdfError`]; no partial result is produced.
pub fn document_elements<B: PdfBackend>(
    doc: &B::Document,
    options: &ExtractOptions,
) -> Result<ExtractResult<Vec<TextElement>>, PdfError> {
    let mut elements = Vec::new();
    let mut warnings = Vec::new();
    for index in 0..B::page_count(doc) {
        let page = page_elements::<B>(doc, index, options)?;
        elements.extend(page.value);
        warnings.extend(page.warnings);
    }
    Ok(ExtractResult::with_warnings(elements, warnings))
}
