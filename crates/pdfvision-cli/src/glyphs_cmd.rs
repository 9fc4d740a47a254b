use std::path::Path;

use pdfvision::GlyphRecord;

use crate::cli::OutputFormat;
use crate::shared::{
    ProgressReporter, csv_escape, open_pdf, page_error, print_json, render_mode_str, resolve_pages,
};

pub fn run(file: &Path, pages: Option<&str>, format: &OutputFormat) -> Result<(), i32> {
    let pdf = open_pdf(file, None)?;
    let page_indices = resolve_pages(pages, pdf.page_count())?;
    let progress = ProgressReporter::new(page_indices.len());

    let mut rows: Vec<(usize, GlyphRecord)> = Vec::new();
    for (i, &idx) in page_indices.iter().enumerate() {
        progress.report(i + 1);
        let glyphs = pdf.page_glyphs(idx).map_err(|e| page_error(idx, &e))?;
        rows.extend(glyphs.value.into_iter().map(|g| (idx + 1, g)));
    }
    progress.finish();

    match format {
        OutputFormat::Text => {
            println!("page\ttext\tx\ty\twidth\theight\tfont\tsize\tmode\tcolor");
            for (page, g) in &rows {
                println!(
                    "{page}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}\t{:.2}\t{}\t{}",
                    g.text.as_deref().unwrap_or(""),
                    g.x,
                    g.y,
                    g.width,
                    g.height,
                    g.font_id,
                    g.font_size,
                    render_mode_str(g.render_mode),
                    g.color(),
                );
            }
            Ok(())
        }
        OutputFormat::Csv => {
            println!("page,text,x,y,width,height,font,size,mode,color");
            for (page, g) in &rows {
                println!(
                    "{page},{},{:.2},{:.2},{:.2},{:.2},{},{:.2},{},{}",
                    csv_escape(g.text.as_deref().unwrap_or("")),
                    g.x,
                    g.y,
                    g.width,
                    g.height,
                    csv_escape(&g.font_id),
                    g.font_size,
                    render_mode_str(g.render_mode),
                    g.color(),
                );
            }
            Ok(())
        }
        OutputFormat::Json => {
            let glyphs: Vec<serde_json::Value> = rows
                .iter()
                .map(|(page, g)| {
                    serde_json::json!({
                        "page": page,
                        "text": g.text,
                        "x": g.x,
                        "y": g.y,
                        "width": g.width,
                        "height": g.height,
                        "fontId": g.font_id,
                        "fontSize": g.font_size,
                        "renderMode": render_mode_str(g.render_mode),
                        "color": g.color().to_string(),
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(glyphs))
        }
    }
}
