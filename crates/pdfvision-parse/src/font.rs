//! Font loading: identifiers, glyph widths, vertical metrics and text decoding.
//!
//! Simple fonts use one-byte codes with `/Widths`, `/FirstChar` and the
//! descriptor's `/MissingWidth`. Type0 fonts use two-byte codes with the
//! descendant's `/DW` and `/W`. Text comes from `/ToUnicode` when present;
//! simple fonts fall back to Windows-1252.

use std::collections::HashMap;

use encoding_rs::WINDOWS_1252;
use lopdf::{Dictionary, Document, Object};

use crate::cmap::ToUnicodeCMap;
use crate::lopdf_backend::{object_to_f64, resolve_ref};

/// Default ascent when the descriptor gives none (glyph space).
const DEFAULT_ASCENT: f64 = 750.0;

/// Default descent when the descriptor gives none (glyph space).
const DEFAULT_DESCENT: f64 = -250.0;

/// Width for simple-font codes without a declared width.
const DEFAULT_WIDTH: f64 = 600.0;

/// Width of code 32 in a simple font without `/Widths`.
const DEFAULT_SPACE_WIDTH: f64 = 250.0;

/// `/DW` default for CID fonts.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// How codes are read from strings and how widths are looked up.
#[derive(Debug, Clone, PartialEq)]
pub enum FontKind {
    /// One byte per code.
    Simple {
        widths: Vec<f64>,
        first_char: u32,
        missing_width: f64,
    },
    /// Type0 with two-byte codes.
    Composite {
        default_width: f64,
        widths: HashMap<u32, f64>,
    },
}

/// One code read from a string operand.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGlyph {
    pub code: u32,
    /// `None` when a composite font has no Unicode mapping for the code.
    pub unicode: Option<String>,
    /// Advance width in glyph space.
    pub width: f64,
    /// Single-byte code 32, which receives word spacing.
    pub is_word_space: bool,
}

/// A font resource prepared for showing text.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    font_id: String,
    kind: FontKind,
    ascent: f64,
    descent: f64,
    to_unicode: Option<ToUnicodeCMap>,
}

impl LoadedFont {
    /// Load a font dictionary. Problems that leave the font usable (such as
    /// an unreadable `/ToUnicode`) are returned as warning messages.
    pub fn load(doc: &Document, dict: &Dictionary, resource_name: &str) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let is_type0 = name_entry(dict, b"Subtype").as_deref() == Some("Type0");

        let descendant = if is_type0 {
            descendant_font(doc, dict)
        } else {
            None
        };
        if is_type0 && descendant.is_none() {
            warnings.push(format!("Type0 font {resource_name} has no descendant font"));
        }
        let metrics_dict = descendant.unwrap_or(dict);
        let descriptor = dict_entry(doc, metrics_dict, b"FontDescriptor");

        let font_id = name_entry(dict, b"BaseFont")
            .or_else(|| descriptor.and_then(|d| name_entry(d, b"FontName")))
            .unwrap_or_else(|| resource_name.to_string());

        let kind = if is_type0 {
            FontKind::Composite {
                default_width: metrics_dict
                    .get(b"DW")
                    .ok()
                    .and_then(|o| object_to_f64(resolve_ref(doc, o)).ok())
                    .unwrap_or(DEFAULT_CID_WIDTH),
                widths: metrics_dict
                    .get(b"W")
                    .ok()
                    .and_then(|o| resolve_ref(doc, o).as_array().ok())
                    .map(|arr| parse_w_array(doc, arr))
                    .unwrap_or_default(),
            }
        } else {
            FontKind::Simple {
                widths: dict
                    .get(b"Widths")
                    .ok()
                    .and_then(|o| resolve_ref(doc, o).as_array().ok())
                    .map(|arr| {
                        arr.iter()
                            .map(|o| object_to_f64(resolve_ref(doc, o)).unwrap_or(0.0))
                            .collect()
                    })
                    .unwrap_or_default(),
                first_char: dict
                    .get(b"FirstChar")
                    .ok()
                    .and_then(|o| resolve_ref(doc, o).as_i64().ok())
                    .map_or(0, |v| v.max(0) as u32),
                missing_width: descriptor
                    .and_then(|d| d.get(b"MissingWidth").ok())
                    .and_then(|o| object_to_f64(resolve_ref(doc, o)).ok())
                    .unwrap_or(DEFAULT_WIDTH),
            }
        };

        let metric = |key: &[u8]| {
            descriptor
                .and_then(|d| d.get(key).ok())
                .and_then(|o| object_to_f64(resolve_ref(doc, o)).ok())
        };
        let (ascent, descent) = match (metric(b"Ascent"), metric(b"Descent")) {
            (Some(a), Some(d)) if a != 0.0 || d != 0.0 => (a, d),
            (Some(a), None) if a != 0.0 => (a, DEFAULT_DESCENT),
            _ => (DEFAULT_ASCENT, DEFAULT_DESCENT),
        };

        let to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|o| resolve_ref(doc, o).as_stream().ok())
            .and_then(|stream| {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                match ToUnicodeCMap::parse(&data) {
                    Ok(cmap) => Some(cmap),
                    Err(e) => {
                        warnings.push(format!("font {font_id}: {e}"));
                        None
                    }
                }
            });

        let font = Self {
            font_id,
            kind,
            ascent,
            descent,
            to_unicode,
        };
        (font, warnings)
    }

    /// Stand-in for a font resource that could not be found: default
    /// metrics, Windows-1252 text, and the resource name as identifier.
    pub fn fallback(resource_name: &str) -> Self {
        Self {
            font_id: resource_name.to_string(),
            kind: FontKind::Simple {
                widths: Vec::new(),
                first_char: 0,
                missing_width: DEFAULT_WIDTH,
            },
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            to_unicode: None,
        }
    }

    pub fn font_id(&self) -> &str {
        &self.font_id
    }

    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    pub fn descent(&self) -> f64 {
        self.descent
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, FontKind::Composite { .. })
    }

    /// Advance width of a code in glyph space.
    pub fn width(&self, code: u32) -> f64 {
        match &self.kind {
            FontKind::Simple {
                widths,
                first_char,
                missing_width,
            } => {
                if widths.is_empty() {
                    return if code == 32 {
                        DEFAULT_SPACE_WIDTH
                    } else {
                        DEFAULT_WIDTH
                    };
                }
                code.checked_sub(*first_char)
                    .and_then(|i| widths.get(i as usize))
                    .copied()
                    .unwrap_or(*missing_width)
            }
            FontKind::Composite {
                default_width,
                widths,
            } => widths.get(&code).copied().unwrap_or(*default_width),
        }
    }

    /// Width of the font's space glyph in glyph space, `0.0` when the font
    /// does not declare one.
    pub fn space_width(&self) -> f64 {
        match &self.kind {
            FontKind::Simple {
                widths, first_char, ..
            } => {
                if widths.is_empty() {
                    return DEFAULT_SPACE_WIDTH;
                }
                32u32
                    .checked_sub(*first_char)
                    .and_then(|i| widths.get(i as usize))
                    .copied()
                    .unwrap_or(0.0)
            }
            FontKind::Composite { .. } => self
                .to_unicode
                .as_ref()
                .and_then(|cmap| cmap.code_for(" "))
                .map_or(0.0, |code| self.width(code)),
        }
    }

    /// Split a string operand into codes and decode each one.
    pub fn decode(&self, bytes: &[u8]) -> Vec<DecodedGlyph> {
        match self.kind {
            FontKind::Simple { .. } => bytes
                .iter()
                .map(|&b| {
                    let code = u32::from(b);
                    let unicode = self
                        .mapped(code)
                        .unwrap_or_else(|| decode_windows_1252(b));
                    DecodedGlyph {
                        code,
                        unicode: Some(unicode),
                        width: self.width(code),
                        is_word_space: b == b' ',
                    }
                })
                .collect(),
            FontKind::Composite { .. } => bytes
                .chunks(2)
                .map(|chunk| {
                    let code = chunk.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
                    DecodedGlyph {
                        code,
                        unicode: self.mapped(code),
                        width: self.width(code),
                        is_word_space: false,
                    }
                })
                .collect(),
        }
    }

    fn mapped(&self, code: u32) -> Option<String> {
        self.to_unicode
            .as_ref()
            .and_then(|cmap| cmap.lookup(code))
            .map(str::to_string)
    }
}

fn decode_windows_1252(byte: u8) -> String {
    let bytes = [byte];
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
    text.into_owned()
}

fn name_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

fn dict_entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    resolve_ref(doc, dict.get(key).ok()?).as_dict().ok()
}

fn descendant_font<'a>(doc: &'a Document, type0: &'a Dictionary) -> Option<&'a Dictionary> {
    let arr = resolve_ref(doc, type0.get(b"DescendantFonts").ok()?)
        .as_array()
        .ok()?;
    resolve_ref(doc, arr.first()?).as_dict().ok()
}

/// Parse a CID `/W` array: `c [w1 w2 ...]` assigns consecutive widths from
/// `c`; `c_first c_last w` assigns one width to a range.
pub fn parse_w_array(doc: &Document, objects: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let number = |o: &Object| object_to_f64(resolve_ref(doc, o)).ok();
    let mut i = 0;
    while i < objects.len() {
        let Some(start) = number(&objects[i]) else {
            i += 1;
            continue;
        };
        let start = start.max(0.0) as u32;
        match objects.get(i + 1).map(|o| resolve_ref(doc, o)) {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate() {
                    let Some(cid) = u32::try_from(offset)
                        .ok()
                        .and_then(|offset| start.checked_add(offset))
                    else {
                        break;
                    };
                    if let Some(w) = number(w) {
                        widths.insert(cid, w);
                    }
                }
                i += 2;
            }
            Some(end) => {
                let end = object_to_f64(end).map_or(start, |e| e.max(0.0) as u32);
                if let Some(w) = objects.get(i + 2).and_then(number) {
                    for cid in start..=end.min(start.saturating_add(0xFFFF)) {
                        widths.insert(cid, w);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}
