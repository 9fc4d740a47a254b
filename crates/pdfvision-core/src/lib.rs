//! pdfvision-core: Backend-independent data types and algorithms.
//!
//! This crate provides the glyph and text element types, color resolution,
//! font attribute derivation and the word grouping algorithm used by
//! pdfvision. It performs no PDF parsing; glyphs are supplied by a backend
//! such as `pdfvision-parse`.

pub mod color;
pub mod element;
pub mod error;
pub mod font;
pub mod geometry;
pub mod glyph;
pub mod words;

pub use color::{Color, HexColor, TextRenderMode, resolve_color};
pub use element::TextElement;
pub use error::{ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, PdfError};
pub use font::{FontAttributes, font_style, font_weight, strip_subset_prefix};
pub use geometry::{Ctm, Point};
pub use glyph::GlyphRecord;
pub use words::{GroupingOptions, TextGroup, WordGrouper, group_glyphs};
