//! Text object state: the `Tf`/`Tc`/`Tw`/`Tz`/`TL`/`Tr`/`Ts` parameters plus
//! the text and line matrices of the current `BT`/`ET` block.

use pdfvision_core::{Ctm, TextRenderMode};

/// Text parameters that `q`/`Q` save and restore along with the graphics
/// state. The matrices are not among them.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    /// `Tc`, added after every glyph.
    pub char_spacing: f64,
    /// `Tw`, added after single-byte code 32 only.
    pub word_spacing: f64,
    /// `Tz` in percent.
    pub h_scaling: f64,
    /// `TL`, used by `T*`, `'` and `"`.
    pub leading: f64,
    /// The `/F1` of `/F1 12 Tf`.
    pub font_resource: String,
    pub font_size: f64,
    pub render_mode: TextRenderMode,
    /// `Ts`
    pub rise: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            font_resource: String::new(),
            font_size: 0.0,
            render_mode: TextRenderMode::Fill,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextState {
    pub params: TextParams,
    text_matrix: Ctm,
    line_matrix: Ctm,
}

impl TextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_matrix(&self) -> &Ctm {
        &self.text_matrix
    }

    /// `Tz` as a factor.
    pub fn h_scale(&self) -> f64 {
        self.params.h_scaling / 100.0
    }

    /// `BT`
    pub fn begin_text(&mut self) {
        self.text_matrix = Ctm::identity();
        self.line_matrix = Ctm::identity();
    }

    pub fn set_font(&mut self, font_resource: String, font_size: f64) {
        self.params.font_resource = font_resource;
        self.params.font_size = font_size;
    }

    /// `Tm` replaces both matrices.
    pub fn set_text_matrix(&mut self, m: Ctm) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: offsets are relative to the start of the current line.
    pub fn next_line_at(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`
    pub fn next_line_at_with_leading(&mut self, tx: f64, ty: f64) {
        self.params.leading = -ty;
        self.next_line_at(tx, ty);
    }

    /// `T*`
    pub fn next_line(&mut self) {
        self.next_line_at(0.0, -self.params.leading);
    }

    /// Move the pen `tx` text space units along the baseline.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, 0.0).concat(&self.text_matrix);
    }

    /// Pen movement after a glyph of width `w0` (glyph space, 1/1000 em).
    pub fn glyph_advance(&self, w0: f64, is_word_space: bool) -> f64 {
        let p = &self.params;
        let tw = if is_word_space { p.word_spacing } else { 0.0 };
        (w0 / 1000.0 * p.font_size + p.char_spacing + tw) * self.h_scale()
    }

    /// Pen movement for a number inside a `TJ` array. Positive numbers move left.
    pub fn tj_adjustment(&self, adjustment: f64) -> f64 {
        -adjustment / 1000.0 * self.params.font_size * self.h_scale()
    }
}
