use std::collections::BTreeMap;
use std::path::Path;

use pdfvision::{FontAttributes, GlyphRecord};

use crate::cli::FontsFormat;
use crate::shared::{ProgressReporter, open_pdf, page_error, print_json, resolve_pages};

/// A font seen on one page.
#[derive(Debug, PartialEq)]
struct PageFont {
    page: usize,
    font_id: String,
    attributes: FontAttributes,
    glyphs: usize,
}

pub fn run(file: &Path, pages: Option<&str>, format: &FontsFormat) -> Result<(), i32> {
    let pdf = open_pdf(file, None)?;
    let page_indices = resolve_pages(pages, pdf.page_count())?;
    let progress = ProgressReporter::new(page_indices.len());

    let mut fonts = Vec::new();
    for (i, &idx) in page_indices.iter().enumerate() {
        progress.report(i + 1);
        let glyphs = pdf.page_glyphs(idx).map_err(|e| page_error(idx, &e))?;
        fonts.extend(fonts_on_page(idx + 1, &glyphs.value));
    }
    progress.finish();

    match format {
        FontsFormat::Text => {
            println!("page\tfont\tfamily\tweight\tstyle\tglyphs");
            for f in &fonts {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    f.page,
                    f.font_id,
                    f.attributes.family,
                    f.attributes.weight,
                    f.attributes.style,
                    f.glyphs
                );
            }
            Ok(())
        }
        FontsFormat::Json => {
            let values: Vec<serde_json::Value> = fonts
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "page": f.page,
                        "fontId": f.font_id,
                        "fontFamily": f.attributes.family,
                        "fontWeight": f.attributes.weight,
                        "fontStyle": f.attributes.style,
                        "glyphs": f.glyphs,
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(values))
        }
    }
}

/// Distinct font ids on a page, sorted by id, with their glyph counts.
fn fonts_on_page(page: usize, glyphs: &[GlyphRecord]) -> Vec<PageFont> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for g in glyphs {
        *counts.entry(g.font_id.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(font_id, glyphs)| PageFont {
            page,
            font_id: font_id.to_string(),
            attributes: FontAttributes::from_font_id(font_id),
            glyphs,
        })
        .collect()
}
