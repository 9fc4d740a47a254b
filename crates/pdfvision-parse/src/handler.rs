//! Glyph sink callback trait for content stream interpretation.
//!
//! The interpreter reports every shown glyph as a [`GlyphEvent`] carrying the
//! raw text-space context. Sinks turn events into page-space records (see
//! [`glyph_from_event`](crate::glyph_from_event)) or just count them.

use pdfvision_core::{Color, ExtractWarning, TextRenderMode};

/// A glyph shown by `Tj`, `TJ`, `'` or `"`.
#[derive(Debug, Clone)]
pub struct GlyphEvent {
    /// Character code from the string operand.
    pub char_code: u32,
    /// Decoded Unicode text, `None` when the font has no mapping for the code.
    pub unicode: Option<String>,
    /// Font identifier: BaseFont, else descriptor FontName, else resource name.
    pub font_id: String,
    /// Font size from `Tf`, in text space units.
    pub font_size: f64,
    /// Text matrix at the time the glyph was shown.
    pub text_matrix: [f64; 6],
    /// Current transformation matrix.
    pub ctm: [f64; 6],
    /// Advance width in glyph space (1/1000 of text space).
    pub displacement: f64,
    /// Width of the font's space glyph in glyph space; `0.0` when undeclared.
    pub space_width: f64,
    /// `Tz` as a fraction (100% = 1.0).
    pub h_scaling: f64,
    /// `Ts` text rise.
    pub rise: f64,
    /// Font ascent in glyph space.
    pub ascent: f64,
    /// Font descent in glyph space (usually negative).
    pub descent: f64,
    pub render_mode: TextRenderMode,
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
}

/// Receives glyphs and warnings while a page is interpreted.
///
/// Both methods default to no-ops so a sink can subscribe to only one.
pub trait GlyphSink {
    /// Called once per shown glyph, in content stream order.
    fn on_glyph(&mut self, _event: GlyphEvent) {}

    /// Called for a non-fatal problem; interpretation continues with defaults.
    fn on_warning(&mut self, _warning: ExtractWarning) {}
}
