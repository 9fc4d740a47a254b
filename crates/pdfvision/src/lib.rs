//! pdfvision: Extract styled text elements from PDF documents.
//!
//! Every word on every page comes out as a [`TextElement`] with its position,
//! size, font family, weight, style, effective color, and 1-based page
//! number.
//!
//! # Architecture
//!
//! - **pdfvision-core**: Backend-independent types, color resolution, font
//!   attributes and the word grouping algorithm
//! - **pdfvision-parse**: PDF decoding and the content stream interpreter
//!   that produces glyphs
//! - **pdfvision** (this crate): Page orchestration and the public API
//!
//! # Example
//!
//! ```ignore
//! let bytes = std::fs::read("report.pdf")?;
//! let elements = pdfvision::extract_text_elements(&bytes, None)?;
//! ```

mod collector;
mod pdf;
pub mod pipeline;

pub use pdf::Pdf;
pub use pdfvision_core;
pub use pdfvision_core::{
    Color, ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, FontAttributes,
    GlyphRecord, GroupingOptions, HexColor, PdfError, TextElement, TextRenderMode,
};
pub use pdfvision_parse;

/// Extract the text elements of every page of a PDF held in memory.
///
/// The document is opened, processed in page order and released before
/// returning, whether extraction succeeds or a page fails.
///
/// # Errors
///
/// Returns [`PdfError`] if the document cannot be opened or any page cannot
/// be decoded. No partial result is returned.
pub fn extract_text_elements(
    bytes: &[u8],
    options: Option<ExtractOptions>,
) -> Result<Vec<TextElement>, PdfError> {
    let pdf = Pdf::open(bytes, options)?;
    pdf.extract_text_elements()
}

/// Serialize text elements as a JSON array with camelCase field names.
///
/// # Errors
///
/// Returns [`PdfError::Other`] if serialization fails.
#[cfg(feature = "serde")]
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, PdfError> {
    serde_json::to_string(value)
        .map_err(|e| PdfError::Other(format!("JSON serialization failed: {e}")))
}
