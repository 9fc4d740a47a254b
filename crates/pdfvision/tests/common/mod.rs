//! Shared fixtures: PDFs assembled with lopdf.

#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// Builder for small test documents. Fonts, color spaces and XObjects are
/// registered on the page tree root and inherited by every page.
pub struct TestPdf {
    doc: Document,
    pages_id: ObjectId,
    fonts: Dictionary,
    color_spaces: Dictionary,
    xobjects: Dictionary,
    kids: Vec<Object>,
}

impl TestPdf {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            fonts: Dictionary::new(),
            color_spaces: Dictionary::new(),
            xobjects: Dictionary::new(),
            kids: Vec::new(),
        }
    }

    /// A simple Type1 font without `/Widths`.
    pub fn font(mut self, resource: &str, base_font: &str) -> Self {
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font,
        });
        self.fonts.set(resource, id);
        self
    }

    /// A simple TrueType font with explicit widths from `first_char`.
    pub fn font_with_widths(
        mut self,
        resource: &str,
        base_font: &str,
        first_char: i64,
        widths: &[i64],
    ) -> Self {
        let descriptor = self.doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => base_font,
            "Ascent" => 800i64,
            "Descent" => -200i64,
        });
        let widths: Vec<Object> = widths.iter().map(|w| Object::Integer(*w)).collect();
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => base_font,
            "FirstChar" => first_char,
            "LastChar" => first_char + widths.len() as i64 - 1,
            "Widths" => widths,
            "FontDescriptor" => descriptor,
        });
        self.fonts.set(resource, id);
        self
    }

    /// A Type0 font with two-byte codes, a ToUnicode CMap and a default width.
    pub fn type0_font(mut self, resource: &str, base_font: &str, cmap: &str, dw: i64) -> Self {
        let cmap_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), cmap.as_bytes().to_vec()));
        let descendant = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => base_font,
            "DW" => dw,
        });
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => base_font,
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(descendant)],
            "ToUnicode" => cmap_id,
        });
        self.fonts.set(resource, id);
        self
    }

    pub fn color_space(mut self, resource: &str, space: Object) -> Self {
        self.color_spaces.set(resource, space);
        self
    }

    /// `[/ICCBased stream]` whose profile declares `n` components.
    pub fn icc_color_space(mut self, resource: &str, n: i64) -> Self {
        let profile = self
            .doc
            .add_object(Stream::new(dictionary! { "N" => n }, Vec::new()));
        let space = Object::Array(vec![Object::Name(b"ICCBased".to_vec()), profile.into()]);
        self.color_spaces.set(resource, space);
        self
    }

    /// A Form XObject without its own resources, drawn with `matrix`.
    pub fn form(mut self, resource: &str, content: &str, matrix: [i64; 6]) -> Self {
        let matrix: Vec<Object> = matrix.iter().map(|v| Object::Integer(*v)).collect();
        let id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Matrix" => matrix,
            },
            content.as_bytes().to_vec(),
        ));
        self.xobjects.set(resource, id);
        self
    }

    pub fn page(mut self, content: &str) -> Self {
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.as_bytes().to_vec()));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        self.kids.push(Object::Reference(page_id));
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
                "Resources" => dictionary! {
                    "Font" => self.fonts,
                    "ColorSpace" => self.color_spaces,
                    "XObject" => self.xobjects,
                },
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }
}

/// Single page showing `content` with Helvetica as `/F1`.
pub fn helvetica_page(content: &str) -> Vec<u8> {
    TestPdf::new().font("F1", "Helvetica").page(content).build()
}

pub fn assert_approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
