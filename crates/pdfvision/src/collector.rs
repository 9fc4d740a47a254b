//! Glyph sink that turns interpreter events into colored glyph records.

use pdfvision_core::{ExtractWarning, GlyphRecord};
use pdfvision_parse::{GlyphEvent, GlyphSink, glyph_from_event};

/// Collects the glyphs and warnings of one page.
///
/// Each event is placed in page space and its effective color resolved as
/// it arrives, so the records leave the collector ready for grouping.
pub(crate) struct GlyphCollector {
    pub(crate) glyphs: Vec<GlyphRecord>,
    pub(crate) warnings: Vec<ExtractWarning>,
    page_index: usize,
    collect_warnings: bool,
}

impl GlyphCollector {
    pub(crate) fn new(page_index: usize, collect_warnings: bool) -> Self {
        Self {
            glyphs: Vec::new(),
            warnings: Vec::new(),
            page_index,
            collect_warnings,
        }
    }
}

impl GlyphSink for GlyphCollector {
    fn on_glyph(&mut self, event: GlyphEvent) {
        let mut glyph = glyph_from_event(&event);
        glyph.resolve_color();
        self.glyphs.push(glyph);
    }

    fn on_warning(&mut self, warning: ExtractWarning) {
        if self.collect_warnings {
            self.warnings.push(warning.or_page(self.page_index));
        }
    }
}
