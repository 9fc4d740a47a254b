//! Page-space glyph records from interpreter events.
//!
//! Builds the text rendering matrix `Trm = [Tfs*Th, 0, 0, Tfs, 0, Trise] x Tm x CTM`
//! and measures the glyph through it.

use pdfvision_core::{Ctm, GlyphRecord};

use crate::handler::GlyphEvent;

/// Convert a [`GlyphEvent`] into a [`GlyphRecord`] in PDF user space.
///
/// * `x`, `y`: glyph origin on the baseline (rise included), `y` measured
///   from the bottom of the page.
/// * `width`: the glyph's own advance `w0`, without `Tc`/`Tw` spacing.
/// * `height`: the font's ascent-to-descent extent.
/// * `font_size`: `Tf` size scaled by the vertical factor of `Tm x CTM`.
/// * `declared_space_width`: the font's space advance measured like `width`,
///   `0.0` when the font declares none.
///
/// The paint colors are copied; the effective color is resolved later.
pub fn glyph_from_event(event: &GlyphEvent) -> GlyphRecord {
    let tm = Ctm::from_array(event.text_matrix);
    let ctm = Ctm::from_array(event.ctm);
    let text_to_page = tm.concat(&ctm);
    let font_matrix = Ctm::new(
        event.font_size * event.h_scaling,
        0.0,
        0.0,
        event.font_size,
        0.0,
        event.rise,
    );
    let trm = font_matrix.concat(&text_to_page);

    let h_scale = trm.horizontal_scale();
    let extent = (event.ascent - event.descent) / 1000.0;

    GlyphRecord {
        text: event.unicode.clone(),
        x: trm.e,
        y: trm.f,
        width: event.displacement / 1000.0 * h_scale,
        height: extent * trm.vertical_scale(),
        font_id: event.font_id.clone(),
        font_size: event.font_size * text_to_page.vertical_scale(),
        declared_space_width: event.space_width / 1000.0 * h_scale,
        render_mode: event.render_mode,
        fill_color: event.fill_color.clone(),
        stroke_color: event.stroke_color.clone(),
        resolved_color: None,
    }
}
