//! PDF fixtures for the CLI tests.

#![allow(dead_code)]

use std::io::Write;

use lopdf::{Dictionary, Object, Stream, dictionary};

pub fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("pdfvision").unwrap()
}

/// One page per content stream. Every page sees Helvetica as `/F1`,
/// `ABCDEF+Roboto-BoldItalic` as `/F2`, and a Form XObject `/Loop` that
/// draws itself.
pub fn pdf_with_pages(contents: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let roboto = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "ABCDEF+Roboto-BoldItalic",
    });
    let form = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        },
        b"/Loop Do".to_vec(),
    ));

    let mut kids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.as_bytes().to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => helvetica, "F2" => roboto },
                "XObject" => dictionary! { "Loop" => form },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => contents.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Write PDF bytes to a temporary file and return the handle.
pub fn write_temp_pdf(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}

/// Three pages with one line of text each.
pub fn three_page_pdf() -> tempfile::NamedTempFile {
    write_temp_pdf(&pdf_with_pages(&[
        "BT /F1 12 Tf 72 720 Td (Hello World) Tj ET",
        "BT /F2 10 Tf 72 700 Td (second) Tj ET",
        "1 0 0 rg BT /F1 10 Tf 72 700 Td (third) Tj ET",
    ]))
}

pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
