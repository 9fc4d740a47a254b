//! Content stream interpreter.
//!
//! Walks tokenized operators, maintaining graphics and text state, and
//! reports each shown glyph to a [`GlyphSink`]. Form XObjects invoked with
//! `Do` are interpreted recursively with their own `/Matrix` and
//! `/Resources`.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfvision_core::{
    Ctm, ExtractOptions, ExtractWarning, ExtractWarningCode, PdfError, TextRenderMode,
};

use crate::color_space::{ResolvedColorSpace, resolve_color_space_name};
use crate::error::BackendError;
use crate::font::LoadedFont;
use crate::graphics_state::GraphicsState;
use crate::handler::{GlyphEvent, GlyphSink};
use crate::lopdf_backend::{decode_stream, object_to_f64, resolve_ref};
use crate::text_state::{TextParams, TextState};
use crate::tokenizer::{Operand, Operator, tokenize};

/// Interpreter for one page, including any forms it draws.
pub(crate) struct Interpreter<'a> {
    doc: &'a Document,
    sink: &'a mut dyn GlyphSink,
    options: &'a ExtractOptions,
    gstate: GraphicsState,
    tstate: TextState,
    font: Option<Rc<LoadedFont>>,
    /// Text state and font saved by `q`, parallel to the graphics stack.
    text_stack: Vec<(TextParams, Option<Rc<LoadedFont>>)>,
    font_cache: HashMap<ObjectId, Rc<LoadedFont>>,
    /// Fonts already reported for unmapped codes.
    fallback_reported: HashSet<String>,
    glyph_count: usize,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(
        doc: &'a Document,
        sink: &'a mut dyn GlyphSink,
        options: &'a ExtractOptions,
    ) -> Self {
        Self {
            doc,
            sink,
            options,
            gstate: GraphicsState::new(),
            tstate: TextState::new(),
            font: None,
            text_stack: Vec::new(),
            font_cache: HashMap::new(),
            fallback_reported: HashSet::new(),
            glyph_count: 0,
        }
    }

    pub(crate) fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    /// Interpret a decoded content stream against `resources`.
    ///
    /// # Errors
    ///
    /// Fails on untokenizable content, on forms nested deeper than
    /// `max_recursion_depth`, and when a resource limit is exceeded.
    pub(crate) fn run(
        &mut self,
        content: &[u8],
        resources: &Dictionary,
        depth: usize,
    ) -> Result<(), BackendError> {
        if depth > self.options.max_recursion_depth {
            return Err(BackendError::Interpreter(format!(
                "Form XObject recursion depth {depth} exceeds limit {}",
                self.options.max_recursion_depth
            )));
        }
        let operators = tokenize(content)?;
        for (op_index, op) in operators.iter().enumerate() {
            self.apply(op_index, op, resources, depth)?;
        }
        Ok(())
    }

    fn apply(
        &mut self,
        op_index: usize,
        op: &Operator,
        resources: &Dictionary,
        depth: usize,
    ) -> Result<(), BackendError> {
        let operands = op.operands.as_slice();
        match op.name.as_str() {
            // graphics state
            "q" => self.save_state(),
            "Q" => self.restore_state(),
            "cm" => {
                if let Some(m) = matrix_operands(operands) {
                    self.gstate.concat_matrix(&m);
                }
            }

            // color
            "g" => {
                if let Some(g) = get_f32(operands, 0) {
                    self.gstate.set_fill_gray(g);
                }
            }
            "G" => {
                if let Some(g) = get_f32(operands, 0) {
                    self.gstate.set_stroke_gray(g);
                }
            }
            "rg" | "RG" => {
                if let [r, g, b] = components(operands)[..] {
                    if op.name == "rg" {
                        self.gstate.set_fill_rgb(r, g, b);
                    } else {
                        self.gstate.set_stroke_rgb(r, g, b);
                    }
                }
            }
            "k" | "K" => {
                if let [c, m, y, k] = components(operands)[..] {
                    if op.name == "k" {
                        self.gstate.set_fill_cmyk(c, m, y, k);
                    } else {
                        self.gstate.set_stroke_cmyk(c, m, y, k);
                    }
                }
            }
            "cs" | "CS" => {
                if let Some(name) = operands.first().and_then(Operand::as_name) {
                    let space = resolve_color_space_name(name, self.doc, resources);
                    if let ResolvedColorSpace::Unsupported { name: family } = &space {
                        self.warn(
                            ExtractWarningCode::UnsupportedColorSpace,
                            format!("color space /{name} ({family}) has no RGB conversion"),
                            op_index,
                        );
                    } else if let Some(problem) = space.tint_transform_problem() {
                        self.warn(
                            ExtractWarningCode::UnsupportedColorSpace,
                            format!("color space /{name}: {problem}"),
                            op_index,
                        );
                    }
                    if op.name == "cs" {
                        self.gstate.set_fill_color_space(space);
                    } else {
                        self.gstate.set_stroke_color_space(space);
                    }
                }
            }
            "sc" | "scn" => self.gstate.set_fill_components(&components(operands)),
            "SC" | "SCN" => self.gstate.set_stroke_components(&components(operands)),

            // text objects and state
            "BT" => self.tstate.begin_text(),
            "Tc" | "Tw" | "Tz" | "TL" | "Ts" => {
                if let Some(v) = get_f64(operands, 0) {
                    let p = &mut self.tstate.params;
                    match op.name.as_str() {
                        "Tc" => p.char_spacing = v,
                        "Tw" => p.word_spacing = v,
                        "Tz" => p.h_scaling = v,
                        "TL" => p.leading = v,
                        _ => p.rise = v,
                    }
                }
            }
            "Tr" => {
                if let Some(v) = get_f64(operands, 0) {
                    self.tstate.params.render_mode =
                        TextRenderMode::from_i64(v as i64).unwrap_or_default();
                }
            }
            "Tf" => {
                if let (Some(name), Some(size)) =
                    (operands.first().and_then(Operand::as_name), get_f64(operands, 1))
                {
                    self.set_font(name, size, resources, op_index);
                }
            }

            // text positioning
            "Td" => {
                if let (Some(tx), Some(ty)) = (get_f64(operands, 0), get_f64(operands, 1)) {
                    self.tstate.next_line_at(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (get_f64(operands, 0), get_f64(operands, 1)) {
                    self.tstate.next_line_at_with_leading(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operands(operands) {
                    self.tstate.set_text_matrix(m);
                }
            }
            "T*" => self.tstate.next_line(),

            // text showing
            "Tj" => {
                if let Some(bytes) = operands.first().and_then(Operand::as_bytes) {
                    self.show_string(bytes, op_index)?;
                }
            }
            "'" => {
                self.tstate.next_line();
                if let Some(bytes) = operands.first().and_then(Operand::as_bytes) {
                    self.show_string(bytes, op_index)?;
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (get_f64(operands, 0), get_f64(operands, 1)) {
                    self.tstate.params.word_spacing = aw;
                    self.tstate.params.char_spacing = ac;
                }
                self.tstate.next_line();
                if let Some(bytes) = operands.get(2).and_then(Operand::as_bytes) {
                    self.show_string(bytes, op_index)?;
                }
            }
            "TJ" => {
                if let Some(Operand::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Operand::String(bytes) => self.show_string(bytes, op_index)?,
                            other => {
                                if let Some(adj) = other.as_f64() {
                                    let tx = self.tstate.tj_adjustment(adj);
                                    self.tstate.advance(tx);
                                }
                            }
                        }
                    }
                }
            }

            // XObjects
            "Do" => {
                if let Some(name) = operands.first().and_then(Operand::as_name) {
                    self.do_xobject(name, resources, depth, op_index)?;
                }
            }

            // paths, images, marked content and the rest draw no text
            _ => {}
        }
        Ok(())
    }

    fn save_state(&mut self) {
        self.gstate.save_state();
        self.text_stack
            .push((self.tstate.params.clone(), self.font.clone()));
    }

    fn restore_state(&mut self) {
        if self.gstate.restore_state() {
            if let Some((params, font)) = self.text_stack.pop() {
                self.tstate.params = params;
                self.font = font;
            }
        }
    }

    fn warn(&mut self, code: ExtractWarningCode, description: String, op_index: usize) {
        if !self.options.collect_warnings {
            return;
        }
        let warning = ExtractWarning {
            operator_index: Some(op_index),
            ..ExtractWarning::with_code(code, description)
        };
        self.sink.on_warning(warning);
    }

    fn warn_font(&mut self, code: ExtractWarningCode, description: String, op_index: usize) {
        if !self.options.collect_warnings {
            return;
        }
        let font_name = self.tstate.params.font_resource.clone();
        self.sink.on_warning(ExtractWarning::with_operator_context(
            code,
            description,
            op_index,
            font_name,
        ));
    }

    /// `Tf`: select a font from `/Resources/Font`, loading it on first use.
    fn set_font(&mut self, name: &str, size: f64, resources: &Dictionary, op_index: usize) {
        self.tstate.set_font(name.to_string(), size);
        let doc = self.doc;
        let entry = resources
            .get(b"Font")
            .ok()
            .and_then(|o| resolve_ref(doc, o).as_dict().ok())
            .and_then(|fonts| fonts.get(name.as_bytes()).ok());

        let Some(entry) = entry else {
            self.warn_font(
                ExtractWarningCode::MissingFont,
                format!("font /{name} not found in resources, using default metrics"),
                op_index,
            );
            self.font = Some(Rc::new(LoadedFont::fallback(name)));
            return;
        };

        if let Object::Reference(id) = entry {
            if let Some(cached) = self.font_cache.get(id) {
                self.font = Some(Rc::clone(cached));
                return;
            }
        }

        let font = match resolve_ref(doc, entry).as_dict() {
            Ok(dict) => {
                let (font, problems) = LoadedFont::load(doc, dict, name);
                for problem in problems {
                    self.warn_font(ExtractWarningCode::MalformedObject, problem, op_index);
                }
                tracing::trace!(resource = name, font_id = font.font_id(), "loaded font");
                font
            }
            Err(_) => {
                self.warn_font(
                    ExtractWarningCode::MalformedObject,
                    format!("font /{name} is not a dictionary, using default metrics"),
                    op_index,
                );
                LoadedFont::fallback(name)
            }
        };
        let font = Rc::new(font);
        if let Object::Reference(id) = entry {
            self.font_cache.insert(*id, Rc::clone(&font));
        }
        self.font = Some(font);
    }

    /// Emit one event per code in `bytes` and advance the text matrix.
    fn show_string(&mut self, bytes: &[u8], op_index: usize) -> Result<(), BackendError> {
        let font = match &self.font {
            Some(font) => Rc::clone(font),
            None => {
                self.warn(
                    ExtractWarningCode::MissingFont,
                    "text shown before any Tf, using default metrics".to_string(),
                    op_index,
                );
                let fallback = Rc::new(LoadedFont::fallback("Unknown"));
                self.font = Some(Rc::clone(&fallback));
                fallback
            }
        };

        for glyph in font.decode(bytes) {
            if self.glyph_count >= self.options.max_glyphs_per_page {
                return Err(BackendError::Core(PdfError::ResourceLimitExceeded {
                    limit_name: "max_glyphs_per_page".to_string(),
                    limit_value: self.options.max_glyphs_per_page,
                    actual_value: self.glyph_count + 1,
                }));
            }
            if glyph.unicode.is_none() && self.fallback_reported.insert(font.font_id().to_string())
            {
                self.warn_font(
                    ExtractWarningCode::EncodingFallback,
                    format!(
                        "font {} has no Unicode mapping for code {:#06x}",
                        font.font_id(),
                        glyph.code
                    ),
                    op_index,
                );
            }

            let event = GlyphEvent {
                char_code: glyph.code,
                unicode: glyph.unicode,
                font_id: font.font_id().to_string(),
                font_size: self.tstate.params.font_size,
                text_matrix: self.tstate.text_matrix().to_array(),
                ctm: self.gstate.ctm().to_array(),
                displacement: glyph.width,
                space_width: font.space_width(),
                h_scaling: self.tstate.h_scale(),
                rise: self.tstate.params.rise,
                ascent: font.ascent(),
                descent: font.descent(),
                render_mode: self.tstate.params.render_mode,
                fill_color: Some(self.gstate.fill_color().clone()),
                stroke_color: Some(self.gstate.stroke_color().clone()),
            };
            self.sink.on_glyph(event);
            self.glyph_count += 1;

            let tx = self.tstate.glyph_advance(glyph.width, glyph.is_word_space);
            self.tstate.advance(tx);
        }
        Ok(())
    }

    /// `Do`: interpret a Form XObject; images and other subtypes are skipped.
    fn do_xobject(
        &mut self,
        name: &str,
        resources: &Dictionary,
        depth: usize,
        op_index: usize,
    ) -> Result<(), BackendError> {
        let doc = self.doc;
        let stream = resources
            .get(b"XObject")
            .ok()
            .and_then(|o| resolve_ref(doc, o).as_dict().ok())
            .and_then(|xobjects| xobjects.get(name.as_bytes()).ok())
            .and_then(|o| resolve_ref(doc, o).as_stream().ok());
        let Some(stream) = stream else {
            self.warn(
                ExtractWarningCode::MalformedObject,
                format!("XObject /{name} not found in resources"),
                op_index,
            );
            return Ok(());
        };

        let is_form = matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Form");
        if !is_form {
            return Ok(());
        }

        let content = decode_stream(stream, self.options)?;
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve_ref(doc, o).as_dict().ok())
            .unwrap_or(resources);

        tracing::debug!(form = name, depth = depth + 1, "entering form XObject");
        self.save_state();
        if let Some(matrix) = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| resolve_ref(doc, o).as_array().ok())
            .and_then(|arr| matrix_objects(arr))
        {
            self.gstate.concat_matrix(&matrix);
        }
        let result = self.run(&content, form_resources, depth + 1);
        self.restore_state();
        result
    }
}

fn get_f64(operands: &[Operand], index: usize) -> Option<f64> {
    operands.get(index).and_then(Operand::as_f64)
}

fn get_f32(operands: &[Operand], index: usize) -> Option<f32> {
    get_f64(operands, index).map(|v| v as f32)
}

/// Numeric operands as color components; names (pattern names) are skipped.
fn components(operands: &[Operand]) -> Vec<f32> {
    operands
        .iter()
        .filter_map(Operand::as_f64)
        .map(|v| v as f32)
        .collect()
}

fn matrix_operands(operands: &[Operand]) -> Option<Ctm> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [0.0; 6];
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = operand.as_f64()?;
    }
    Some(Ctm::from_array(m))
}

fn matrix_objects(arr: &[Object]) -> Option<Ctm> {
    if arr.len() != 6 {
        return None;
    }
    let mut m = [0.0; 6];
    for (slot, obj) in m.iter_mut().zip(arr) {
        *slot = object_to_f64(obj).ok()?;
    }
    Some(Ctm::from_array(m))
}
