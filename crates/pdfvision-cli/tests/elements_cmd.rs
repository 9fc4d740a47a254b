mod common;

use common::{cmd, pdf_with_pages, stdout_json, three_page_pdf, write_temp_pdf};
use predicates::prelude::*;

#[test]
fn json_is_default_and_camel_case() {
    let f = three_page_pdf();
    let output = cmd()
        .args(["elements", f.path().to_str().unwrap()])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    let arr = json.as_array().unwrap();
    assert_eq!(arr.len(), 4);

    let hello = &arr[0];
    assert_eq!(hello["text"], "Hello");
    assert_eq!(hello["x"], 72.0);
    assert_eq!(hello["y"], 720.0);
    assert_eq!(hello["fontSize"], 12.0);
    assert_eq!(hello["fontFamily"], "Helvetica");
    assert_eq!(hello["fontWeight"], "normal");
    assert_eq!(hello["fontStyle"], "normal");
    assert_eq!(hello["color"], "#000000");
    assert_eq!(hello["pageNumber"], 1);

    assert_eq!(arr[2]["fontFamily"], "Roboto-BoldItalic");
    assert_eq!(arr[2]["fontWeight"], "bold");
    assert_eq!(arr[2]["fontStyle"], "italic");
    assert_eq!(arr[3]["color"], "#ff0000");
    assert_eq!(arr[3]["pageNumber"], 3);
}

#[test]
fn page_selection_keeps_document_numbers() {
    let f = three_page_pdf();
    let output = cmd()
        .args(["elements", f.path().to_str().unwrap(), "--pages", "3,2"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    let texts: Vec<(&str, u64)> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| (e["text"].as_str().unwrap(), e["pageNumber"].as_u64().unwrap()))
        .collect();
    assert_eq!(texts, [("second", 2), ("third", 3)]);
}

#[test]
fn parallel_output_matches_sequential() {
    let f = three_page_pdf();
    let path = f.path().to_str().unwrap();
    let sequential = cmd().args(["elements", path]).output().unwrap();
    let parallel = cmd().args(["elements", path, "--parallel"]).output().unwrap();
    assert_eq!(stdout_json(&sequential), stdout_json(&parallel));
}

#[test]
fn large_gap_ratio_merges_words() {
    // a 20pt kerning gap splits at the default ratio but not at 10
    let f = write_temp_pdf(&pdf_with_pages(&["BT /F1 10 Tf 72 700 Td [(ab) -2000 (cd)] TJ ET"]));
    let path = f.path().to_str().unwrap();

    let split = stdout_json(&cmd().args(["elements", path]).output().unwrap());
    assert_eq!(split.as_array().unwrap().len(), 2);

    let merged = stdout_json(
        &cmd()
            .args(["elements", path, "--gap-ratio", "10"])
            .output()
            .unwrap(),
    );
    let merged = merged.as_array().unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0]["text"], "abcd");
}

#[test]
fn text_format_has_header_and_rows() {
    let f = three_page_pdf();
    let output = cmd()
        .args(["elements", f.path().to_str().unwrap(), "--format", "text"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("page\ttext\tx\ty"));
    assert!(header.ends_with("color"));
    let first = lines.next().unwrap();
    assert!(first.starts_with("1\tHello\t72.00\t720.00\t"));
    assert!(first.ends_with("\t#000000"));
}

#[test]
fn csv_format_escapes_commas() {
    let f = write_temp_pdf(&pdf_with_pages(&["BT /F1 10 Tf 72 700 Td (a,b) Tj ET"]));
    cmd()
        .args(["elements", f.path().to_str().unwrap(), "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("page,text,x,y,"))
        .stdout(predicate::str::contains("1,\"a,b\",72.00,700.00"));
}

#[test]
fn empty_document_prints_empty_array() {
    let f = write_temp_pdf(&pdf_with_pages(&["", "0 0 m 10 10 l S"]));
    cmd()
        .args(["elements", f.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn failing_page_prints_nothing_and_exits_1() {
    let f = write_temp_pdf(&pdf_with_pages(&[
        "BT /F1 10 Tf 72 700 Td (fine) Tj ET",
        "/Loop Do",
    ]));
    cmd()
        .args(["elements", f.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Error reading page 2"));
}

#[test]
fn failing_page_in_parallel_exits_1() {
    let f = write_temp_pdf(&pdf_with_pages(&["/Loop Do", "BT /F1 10 Tf (ok) Tj ET"]));
    cmd()
        .args(["elements", f.path().to_str().unwrap(), "--parallel"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn invalid_page_range_exits_1() {
    let f = three_page_pdf();
    cmd()
        .args(["elements", f.path().to_str().unwrap(), "--pages", "4"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exceeds document page count (3)"));
}

#[test]
fn logs_go_to_stderr() {
    let f = three_page_pdf();
    let output = cmd()
        .env("RUST_LOG", "debug")
        .args(["elements", f.path().to_str().unwrap()])
        .output()
        .unwrap();
    // stdout stays parseable JSON even with verbose logging
    let json = stdout_json(&output);
    assert_eq!(json.as_array().unwrap().len(), 4);
}
