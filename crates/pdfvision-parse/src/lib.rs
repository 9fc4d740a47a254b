//! pdfvision-parse: PDF decoding backend for pdfvision.
//!
//! Opens documents with lopdf, interprets page content streams, and reports
//! every shown glyph through the [`GlyphSink`] callback trait together with
//! the text and graphics state needed to place and color it.

pub mod backend;
pub mod cmap;
pub mod color_space;
pub mod error;
pub mod font;
pub mod glyph_extraction;
pub mod graphics_state;
pub mod handler;
mod interpreter;
pub mod lopdf_backend;
pub mod text_state;
pub mod tokenizer;

pub use backend::PdfBackend;
pub use error::BackendError;
pub use glyph_extraction::glyph_from_event;
pub use handler::{GlyphEvent, GlyphSink};
pub use lopdf_backend::{LopdfBackend, LopdfDocument, LopdfPage};
