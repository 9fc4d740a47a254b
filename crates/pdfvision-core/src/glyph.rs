//! Per-character glyph records produced by a decoding backend.

use crate::color::{Color, HexColor, TextRenderMode, resolve_color};

/// A single rendered glyph on a page.
///
/// Coordinates are in PDF user space: `x`/`y` is the baseline origin with
/// `y` measured from the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlyphRecord {
    /// Decoded character(s). `None` when the glyph could not be decoded.
    pub text: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Font identifier, typically the PostScript base font name.
    pub font_id: String,
    /// Effective font size in points.
    pub font_size: f64,
    /// Width of a space in the active font. Values `<= 0` mean the font
    /// does not declare a usable space width.
    pub declared_space_width: f64,
    pub render_mode: TextRenderMode,
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    /// Effective color, attached by [`GlyphRecord::resolve_color`].
    pub resolved_color: Option<HexColor>,
}

impl GlyphRecord {
    /// Create a glyph with fill rendering and no paint colors.
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        font_id: impl Into<String>,
        font_size: f64,
    ) -> Self {
        Self {
            text: Some(text.into()),
            x,
            y,
            width,
            height,
            font_id: font_id.into(),
            font_size,
            declared_space_width: 0.0,
            render_mode: TextRenderMode::Fill,
            fill_color: None,
            stroke_color: None,
            resolved_color: None,
        }
    }

    /// True when the glyph has text that is empty or all whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.text
            .as_deref()
            .is_some_and(|t| t.chars().all(char::is_whitespace))
    }

    /// Space width to use for gap tests: the declared width when usable,
    /// otherwise the glyph's own width.
    pub fn valid_space_width(&self) -> f64 {
        if self.declared_space_width > 0.0 {
            self.declared_space_width
        } else {
            self.width
        }
    }

    /// Compute and attach the effective color from the render mode and paints.
    pub fn resolve_color(&mut self) -> HexColor {
        let color = resolve_color(
            self.render_mode,
            self.fill_color.as_ref(),
            self.stroke_color.as_ref(),
        );
        self.resolved_color = Some(color);
        color
    }

    /// The attached color, or black when none was resolved.
    pub fn color(&self) -> HexColor {
        self.resolved_color.unwrap_or_default()
    }
}
