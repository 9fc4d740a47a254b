mod common;

use common::{cmd, pdf_with_pages, stdout_json, three_page_pdf, write_temp_pdf};
use predicates::prelude::*;

#[test]
fn json_lists_fonts_per_page() {
    let f = three_page_pdf();
    let output = cmd()
        .args(["fonts", f.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    let fonts = json.as_array().unwrap();
    assert_eq!(fonts.len(), 3);

    assert_eq!(fonts[0]["page"], 1);
    assert_eq!(fonts[0]["fontId"], "Helvetica");
    assert_eq!(fonts[0]["fontWeight"], "normal");
    // "Hello World" is 11 glyphs including the space
    assert_eq!(fonts[0]["glyphs"], 11);

    assert_eq!(fonts[1]["page"], 2);
    assert_eq!(fonts[1]["fontId"], "ABCDEF+Roboto-BoldItalic");
    assert_eq!(fonts[1]["fontFamily"], "Roboto-BoldItalic");
    assert_eq!(fonts[1]["fontWeight"], "bold");
    assert_eq!(fonts[1]["fontStyle"], "italic");
}

#[test]
fn two_fonts_on_one_page_sorted_by_id() {
    let f = write_temp_pdf(&pdf_with_pages(&[
        "BT /F1 10 Tf 72 700 Td (a) Tj /F2 10 Tf (b) Tj ET",
    ]));
    let output = cmd()
        .args(["fonts", f.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "page\tfont\tfamily\tweight\tstyle\tglyphs");
    assert_eq!(lines[1], "1\tABCDEF+Roboto-BoldItalic\tRoboto-BoldItalic\tbold\titalic\t1");
    assert_eq!(lines[2], "1\tHelvetica\tHelvetica\tnormal\tnormal\t1");
}

#[test]
fn csv_format_not_offered() {
    let f = three_page_pdf();
    cmd()
        .args(["fonts", f.path().to_str().unwrap(), "--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
