mod common;

use std::process::Command;

use persian_pdf_to_excel::{
    ConvertError, ConvertOptions, PageSelection, SelectionThresholds, SheetLayout,
    convert_pdf_bytes_to_csv_string, convert_pdf_to_csv, convert_pdf_to_xlsx, extract_raw_tables,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn converts_single_table_to_xlsx() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("single.pdf");
    let output = dir.path().join("single.xlsx");

    common::TextPdf::new()
        .page(&["Name  Age  Score", "Alice  30  98", "Bob  22  87"])
        .save(&input)
        .expect("PDF fixture should be created");

    let report = convert_pdf_to_xlsx(&input, &output, &ConvertOptions::default())
        .expect("conversion should succeed");

    assert_eq!(report.table_count, 1);
    assert_eq!(report.row_count, 2);
    assert_eq!(report.column_count, 3);

    let rows = common::read_sheet(&output, "Data").expect("sheet should be readable");
    assert_eq!(
        rows,
        vec![
            vec!["Name", "Age", "Score"],
            vec!["Alice", "30", "98"],
            vec!["Bob", "22", "87"],
        ]
    );
}

#[test]
fn merges_tables_from_multiple_pages() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("multi.pdf");
    let output = dir.path().join("multi.csv");

    common::TextPdf::new()
        .page(&["City  Pop  Rank", "A  10  1", "B  20  2"])
        .page(&["Product  Qty  Price", "Pen  3  1.5", "Book  1  9.9"])
        .save(&input)
        .expect("PDF fixture should be created");

    let report = convert_pdf_to_csv(&input, &output, &ConvertOptions::default())
        .expect("conversion should succeed");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert!(
        csv.starts_with("City,Pop,Rank\n"),
        "unexpected CSV output: {csv:?}, report: {report:?}"
    );
    assert!(
        csv.contains("Product,Qty,Price\nPen,3,1.5\n"),
        "unexpected CSV output: {csv:?}, report: {report:?}"
    );
    assert_eq!(report.table_count, 2);
    assert_eq!(report.row_count, 5);
}

#[test]
fn per_table_layout_writes_numbered_sheets() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("split.pdf");
    let output = dir.path().join("split.xlsx");

    common::TextPdf::new()
        .page(&["City  Pop  Rank", "A  10  1"])
        .page(&["Product  Qty  Price", "Pen  3  1.5"])
        .save(&input)
        .expect("PDF fixture should be created");

    let options = ConvertOptions {
        layout: SheetLayout::PerTable,
        sheet_name: "Report".to_string(),
        ..ConvertOptions::default()
    };
    let report = convert_pdf_to_xlsx(&input, &output, &options).expect("conversion should succeed");
    assert_eq!(report.sheet_count, 2);

    let second = common::read_sheet(&output, "Report 2").expect("second sheet should exist");
    assert_eq!(second[0], vec!["Product", "Qty", "Price"]);
}

#[test]
fn page_selection_limits_extraction() {
    let pdf = common::TextPdf::new()
        .page(&["City  Pop  Rank", "A  10  1"])
        .page(&["Product  Qty  Price", "Pen  3  1.5"])
        .to_bytes()
        .expect("PDF fixture should be created");

    let options = ConvertOptions {
        pages: Some("2".parse::<PageSelection>().expect("pages should parse")),
        ..ConvertOptions::default()
    };
    let (csv, report) =
        convert_pdf_bytes_to_csv_string(&pdf, &options).expect("conversion should succeed");

    assert_eq!(report.table_count, 1);
    assert_eq!(csv, "Product,Qty,Price\nPen,3,1.5\n");
}

#[test]
fn non_table_pdf_reports_no_table_found() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("notable.pdf");
    let output = dir.path().join("notable.xlsx");

    common::TextPdf::new()
        .page(&["This is plain narrative text without columns."])
        .save(&input)
        .expect("PDF fixture should be created");

    let error = convert_pdf_to_xlsx(&input, &output, &ConvertOptions::default())
        .expect_err("no table should be selected");
    assert!(matches!(error, ConvertError::NoTableFound { .. }), "{error:?}");
    assert!(!output.exists());
}

#[test]
fn single_row_table_is_rejected_until_thresholds_are_lowered() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("one-row.pdf");

    common::TextPdf::new()
        .page(&["Code  Name  Unit"])
        .save(&input)
        .expect("PDF fixture should be created");

    let (tables, _) = extract_raw_tables(&input, &ConvertOptions::default())
        .expect("extraction should succeed");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].row_count(), 1);
    assert_eq!(tables[0].column_count(), 3);

    let output = dir.path().join("one-row.csv");
    let strict = convert_pdf_to_csv(&input, &output, &ConvertOptions::default());
    assert!(matches!(strict, Err(ConvertError::NoTableFound { .. })));

    let relaxed = ConvertOptions {
        thresholds: SelectionThresholds::new(1, 2),
        ..ConvertOptions::default()
    };
    let report = convert_pdf_to_csv(&input, &output, &relaxed).expect("relaxed should pass");
    assert_eq!(report.table_count, 1);
    assert_eq!(
        std::fs::read_to_string(&output).expect("CSV should be readable"),
        "Code,Name,Unit\n"
    );
}

#[test]
fn cli_exits_with_no_table_code() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("cli-notable.pdf");
    let output = dir.path().join("cli-notable.xlsx");

    common::TextPdf::new()
        .page(&["No table here"])
        .save(&input)
        .expect("PDF fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_pdf2xlsx"))
        .arg("convert")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}

#[test]
fn cli_writes_default_output_next_to_input() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("report.pdf");

    common::TextPdf::new()
        .page(&["Name  Age  Score", "Alice  30  98", "Bob  22  87"])
        .save(&input)
        .expect("PDF fixture should be created");

    let output = Command::new(env!("CARGO_BIN_EXE_pdf2xlsx"))
        .arg("convert")
        .arg(&input)
        .arg("--json")
        .output()
        .expect("CLI should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("report_converted.xlsx").exists());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["table_count"], 1);
    assert_eq!(report["row_count"], 2);
}

#[test]
fn cli_rejects_non_pdf_input() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "Name  Age").expect("input should be written");

    let status = Command::new(env!("CARGO_BIN_EXE_pdf2xlsx"))
        .arg("convert")
        .arg(&input)
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(1));
}

#[test]
fn cli_inspect_lists_candidates() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("inspect.pdf");

    common::TextPdf::new()
        .page(&["Name  Age  Score", "Alice  30  98"])
        .page(&["Code  Name  Unit"])
        .save(&input)
        .expect("PDF fixture should be created");

    let output = Command::new(env!("CARGO_BIN_EXE_pdf2xlsx"))
        .arg("inspect")
        .arg(&input)
        .output()
        .expect("CLI should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#0 page=1 rows=2 cols=3 accepted"), "{stdout}");
    assert!(stdout.contains("#1 page=2 rows=1 cols=3 rejected"), "{stdout}");
}
