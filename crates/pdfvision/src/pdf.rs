//! Top-level PDF document type for opening and extracting text elements.

use pdfvision_core::{ExtractOptions, ExtractResult, GlyphRecord, PdfError, TextElement};
use pdfvision_parse::{LopdfBackend, LopdfDocument, PdfBackend};

use crate::pipeline;

/// A PDF document opened for extraction.
///
/// Owns the decoded document for as long as the handle lives; dropping the
/// handle releases it.
///
/// # Example
///
/// ```ignore
/// let pdf = Pdf::open(bytes, None)?;
/// for element in pdf.extract_text_elements()? {
///     println!("{} on page {} in {}", element.text, element.page_number, element.color);
/// }
/// ```
pub struct Pdf {
    doc: LopdfDocument,
    options: ExtractOptions,
}

impl std::fmt::Debug for Pdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pdf")
            .field("page_count", &self.page_count())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Pdf {
    /// Open a PDF document from a file path.
    ///
    /// Reads the whole file into memory and calls [`Pdf::open`].
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the file cannot be read or is not a valid PDF.
    #[cfg(feature = "std")]
    pub fn open_file(
        path: impl AsRef<std::path::Path>,
        options: Option<ExtractOptions>,
    ) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| PdfError::IoError(e.to_string()))?;
        Self::open(&bytes, options)
    }

    /// Open a PDF document from bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw PDF file bytes.
    /// * `options` - Extraction options (resource limits, grouping
    ///   tolerances). Uses defaults if `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::ResourceLimitExceeded`] when the input or its page
    /// count is over the configured limits, [`PdfError::PasswordRequired`] if
    /// the PDF is encrypted, and [`PdfError::ParseError`] if the bytes are
    /// not a readable PDF.
    pub fn open(bytes: &[u8], options: Option<ExtractOptions>) -> Result<Self, PdfError> {
        let options = options.unwrap_or_default();
        if let Some(max_bytes) = options.max_input_bytes {
            if bytes.len() > max_bytes {
                return Err(PdfError::ResourceLimitExceeded {
                    limit_name: "max_input_bytes".to_string(),
                    limit_value: max_bytes,
                    actual_value: bytes.len(),
                });
            }
        }

        let doc = LopdfBackend::open(bytes).map_err(PdfError::from)?;

        let page_count = LopdfBackend::page_count(&doc);
        if let Some(max_pages) = options.max_pages {
            if page_count > max_pages {
                return Err(PdfError::ResourceLimitExceeded {
                    limit_name: "max_pages".to_string(),
                    limit_value: max_pages,
                    actual_value: page_count,
                });
            }
        }

        Ok(Self { doc, options })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        LopdfBackend::page_count(&self.doc)
    }

    /// Glyph records of a page (0-based index), in content stream order,
    /// with effective colors resolved.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the index is out of range or the page content
    /// cannot be decoded.
    pub fn page_glyphs(&self, index: usize) -> Result<ExtractResult<Vec<GlyphRecord>>, PdfError> {
        pipeline::page_glyphs::<LopdfBackend>(&self.doc, index, &self.options)
    }

    /// Text elements of a page (0-based index).
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the index is out of range or the page content
    /// cannot be decoded.
    pub fn page_elements(&self, index: usize) -> Result<ExtractResult<Vec<TextElement>>, PdfError> {
        pipeline::page_elements::<LopdfBackend>(&self.doc, index, &self.options)
    }

    /// Text elements of every page, ordered by page number.
    ///
    /// # Errors
    ///
    /// Fails as a whole on the first page that cannot be decoded.
    pub fn extract_text_elements(&self) -> Result<Vec<TextElement>, PdfError> {
        Ok(self.extract_text_elements_with_warnings()?.value)
    }

    /// Like [`Pdf::extract_text_elements`], also returning the non-fatal
    /// warnings collected along the way.
    ///
    /// # Errors
    ///
    /// Fails as a whole on the first page that cannot be decoded.
    pub fn extract_text_elements_with_warnings(
        &self,
    ) -> Result<ExtractResult<Vec<TextElement>>, PdfError> {
        pipeline::document_elements::<LopdfBackend>(&self.doc, &self.options)
    }

    /// Extract all pages concurrently using rayon.
    ///
    /// Pages are processed independently; the result is assembled in page
    /// order regardless of which page finishes first. Any failing page fails
    /// the whole call.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let pdf = Pdf::open(bytes, None)?;
    /// let elements = pdf.extract_text_elements_parallel()?;
    /// ```
    #[cfg(feature = "parallel")]
    pub fn extract_text_elements_parallel(&self) -> Result<Vec<TextElement>, PdfError> {
        let all: Vec<usize> = (0..self.page_count()).collect();
        self.extract_pages_parallel(&all)
    }

    /// Extract the given pages (0-based indices) concurrently. Output follows
    /// the order of `indices`.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any listed page is out of range or cannot be
    /// decoded.
    #[cfg(feature = "parallel")]
    pub fn extract_pages_parallel(&self, indices: &[usize]) -> Result<Vec<TextElement>, PdfError> {
        use rayon::prelude::*;

        let pages: Vec<Vec<TextElement>> = indices
            .par_iter()
            .map(|&index| self.page_elements(index).map(|page| page.value))
            .collect::<Result<_, _>>()?;
        Ok(pages.into_iter().flatten().collect())
    }
}
