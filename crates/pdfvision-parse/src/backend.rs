//! PDF decoding backend trait.
//!
//! Defines the [`PdfBackend`] trait that abstracts document decoding so the
//! extraction pipeline can run over lopdf or a test double.

use pdfvision_core::{ExtractOptions, PdfError};

use crate::handler::GlyphSink;

/// Trait abstracting PDF decoding operations.
///
/// # Usage
///
/// ```ignore
/// let doc = MyBackend::open(pdf_bytes)?;
/// for index in 0..MyBackend::page_count(&doc) {
///     let page = MyBackend::get_page(&doc, index)?;
///     MyBackend::interpret_page(&doc, &page, &mut sink, &options)?;
/// }
/// ```
pub trait PdfBackend {
    /// The parsed document type.
    type Document;

    /// A reference to a single page within a document.
    type Page;

    /// Backend-specific error type, convertible to [`PdfError`].
    type Error: std::error::Error + Into<PdfError>;

    /// Parse PDF bytes into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable PDF, or the document
    /// is encrypted.
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    /// Number of pages in the document.
    fn page_count(doc: &Self::Document) -> usize;

    /// Access a page by 0-based index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the page cannot be loaded.
    fn get_page(doc: &Self::Document, index: usize) -> Result<Self::Page, Self::Error>;

    /// Interpret the page's content stream, reporting glyphs to `sink`.
    ///
    /// Resource limits from `options` are enforced during interpretation.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be decoded or a resource limit
    /// is exceeded.
    fn interpret_page(
        doc: &Self::Document,
        page: &Self::Page,
        sink: &mut dyn GlyphSink,
        options: &ExtractOptions,
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::GlyphEvent;
    use pdfvision_core::{Color, ExtractWarning, TextRenderMode};

    struct MockDocument {
        /// Text shown on each page, one glyph per char.
        pages: Vec<String>,
    }

    struct MockPage {
        index: usize,
    }

    #[derive(Default)]
    struct CollectingSink {
        glyphs: Vec<GlyphEvent>,
        warnings: Vec<ExtractWarning>,
    }

    impl GlyphSink for CollectingSink {
        fn on_glyph(&mut self, event: GlyphEvent) {
            self.glyphs.push(event);
        }

        fn on_warning(&mut self, warning: ExtractWarning) {
            self.warnings.push(warning);
        }
    }

    struct MockBackend;

    impl PdfBackend for MockBackend {
        type Document = MockDocument;
        type Page = MockPage;
        type Error = PdfError;

        fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
            if bytes.is_empty() {
                return Err(PdfError::ParseError("empty input".to_string()));
            }
            let text = std::str::from_utf8(bytes)
                .map_err(|e| PdfError::ParseError(e.to_string()))?;
            Ok(MockDocument {
                pages: text.split('\x0c').map(str::to_string).collect(),
            })
        }

        fn page_count(doc: &Self::Document) -> usize {
            doc.pages.len()
        }

        fn get_page(doc: &Self::Document, index: usize) -> Result<Self::Page, Self::Error> {
            if index >= doc.pages.len() {
                return Err(PdfError::ParseError(format!(
                    "page index {index} out of range (0..{})",
                    doc.pages.len()
                )));
            }
            Ok(MockPage { index })
        }

        fn interpret_page(
            doc: &Self::Document,
            page: &Self::Page,
            sink: &mut dyn GlyphSink,
            options: &ExtractOptions,
        ) -> Result<(), Self::Error> {
            let text = &doc.pages[page.index];
            let count = text.chars().count();
            if count > options.max_glyphs_per_page {
                return Err(PdfError::ResourceLimitExceeded {
                    limit_name: "max_glyphs_per_page".to_string(),
                    limit_value: options.max_glyphs_per_page,
                    actual_value: count,
                });
            }
            for (i, ch) in text.chars().enumerate() {
                sink.on_glyph(GlyphEvent {
                    char_code: ch as u32,
                    unicode: Some(ch.to_string()),
                    font_id: "Helvetica".to_string(),
                    font_size: 10.0,
                    text_matrix: [1.0, 0.0, 0.0, 1.0, 72.0 + 6.0 * i as f64, 700.0],
                    ctm: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
                    displacement: 600.0,
                    space_width: 278.0,
                    h_scaling: 1.0,
                    rise: 0.0,
                    ascent: 750.0,
                    descent: -250.0,
                    render_mode: TextRenderMode::Fill,
                    fill_color: Some(Color::black()),
                    stroke_color: None,
                });
            }
            Ok(())
        }
    }

    #[test]
    fn mock_backend_pages_and_glyphs() {
        let doc = MockBackend::open(b"ab\x0cxyz").unwrap();
        assert_eq!(MockBackend::page_count(&doc), 2);

        let page = MockBackend::get_page(&doc, 1).unwrap();
        let mut sink = CollectingSink::default();
        MockBackend::interpret_page(&doc, &page, &mut sink, &ExtractOptions::default()).unwrap();
        let text: String = sink
            .glyphs
            .iter()
            .filter_map(|g| g.unicode.clone())
            .collect();
        assert_eq!(text, "xyz");
        assert!(sink.warnings.is_empty());
    }

    #[test]
    fn mock_backend_rejects_bad_index_and_empty_input() {
        let doc = MockBackend::open(b"a").unwrap();
        assert!(MockBackend::get_page(&doc, 1).is_err());
        assert!(MockBackend::open(b"").is_err());
    }

    #[test]
    fn mock_backend_enforces_glyph_limit() {
        let doc = MockBackend::open(b"abcdef").unwrap();
        let page = MockBackend::get_page(&doc, 0).unwrap();
        let options = ExtractOptions {
            max_glyphs_per_page: 3,
            ..ExtractOptions::default()
        };
        let err = MockBackend::interpret_page(&doc, &page, &mut CollectingSink::default(), &options)
            .unwrap_err();
        assert!(matches!(err, PdfError::ResourceLimitExceeded { actual_value: 6, .. }));
    }

    #[test]
    fn backend_error_converts_to_pdf_error() {
        fn to_pdf<B: PdfBackend>(e: B::Error) -> PdfError {
            e.into()
        }
        let err = to_pdf::<MockBackend>(PdfError::Other("x".to_string()));
        assert_eq!(err, PdfError::Other("x".to_string()));
    }
}
