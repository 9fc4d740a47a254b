use std::path::Path;

use pdfvision::{ExtractOptions, GroupingOptions, Pdf, TextElement};

use crate::cli::OutputFormat;
use crate::shared::{ProgressReporter, csv_escape, open_pdf, page_error, resolve_pages};

pub struct ElementsArgs<'a> {
    pub pages: Option<&'a str>,
    pub format: &'a OutputFormat,
    pub grouping: GroupingOptions,
    pub parallel: bool,
}

pub fn run(file: &Path, args: ElementsArgs<'_>) -> Result<(), i32> {
    let options = ExtractOptions {
        grouping: args.grouping,
        ..ExtractOptions::default()
    };
    let pdf = open_pdf(file, Some(options))?;
    let page_indices = resolve_pages(args.pages, pdf.page_count())?;

    // Nothing is printed unless every selected page succeeds.
    let elements = if args.parallel {
        pdf.extract_pages_parallel(&page_indices).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?
    } else {
        collect_sequential(&pdf, &page_indices)?
    };
    tracing::debug!(
        pages = page_indices.len(),
        elements = elements.len(),
        "extracted text elements"
    );

    match args.format {
        OutputFormat::Json => write_json(&elements),
        OutputFormat::Text => {
            write_text(&elements);
            Ok(())
        }
        OutputFormat::Csv => {
            write_csv(&elements);
            Ok(())
        }
    }
}

fn collect_sequential(pdf: &Pdf, page_indices: &[usize]) -> Result<Vec<TextElement>, i32> {
    let progress = ProgressReporter::new(page_indices.len());
    let mut elements = Vec::new();
    for (i, &idx) in page_indices.iter().enumerate() {
        progress.report(i + 1);
        let page = pdf.page_elements(idx).map_err(|e| page_error(idx, &e))?;
        elements.extend(page.value);
    }
    progress.finish();
    Ok(elements)
}

fn write_json(elements: &[TextElement]) -> Result<(), i32> {
    let json = pdfvision::to_json(elements).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    println!("{json}");
    Ok(())
}

fn write_text(elements: &[TextElement]) {
    println!("page\ttext\tx\ty\twidth\theight\tfont_size\tfont_family\tfont_weight\tfont_style\tcolor");
    for e in elements {
        println!(
            "{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}\t{}\t{}\t{}",
            e.page_number,
            e.text,
            e.x,
            e.y,
            e.width,
            e.height,
            e.font_size,
            e.font_family,
            e.font_weight,
            e.font_style,
            e.color,
        );
    }
}

fn write_csv(elements: &[TextElement]) {
    println!("page,text,x,y,width,height,font_size,font_family,font_weight,font_style,color");
    for e in elements {
        println!(
            "{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{},{},{},{}",
            e.page_number,
            csv_escape(&e.text),
            e.x,
            e.y,
            e.width,
            e.height,
            e.font_size,
            csv_escape(&e.font_family),
            e.font_weight,
            e.font_style,
            e.color,
        );
    }
}
