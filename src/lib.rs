//! Convert tables in Persian/Arabic PDFs into right-to-left spreadsheets.
//!
//! The pipeline is extraction → [`select_tables`] → per-cell [`normalize`] →
//! writer. The two pure pieces, [`bidi`] and [`select`], can be used on their
//! own with tables coming from any extractor.

pub mod bidi;
mod csv_out;
mod error;
mod model;
mod options;
mod pdf_reader;
pub mod select;
mod sheet;
mod table_detect;
mod table_parse;
mod warning;
mod xlsx_out;

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::csv_out::{write_csv, write_csv_to_string};
use crate::model::PageText;
use crate::pdf_reader::{read_pdf_pages, read_pdf_pages_from_bytes};
use crate::sheet::build_sheets;
use crate::table_detect::detect_tables;
use crate::xlsx_out::{write_xlsx, write_xlsx_to_buffer};

pub use bidi::{normalize, normalize_cell};
pub use error::ConvertError;
pub use model::{AcceptedTable, RawCell, RawTable, SheetData};
pub use options::{
    ConvertOptions, DEFAULT_FONT_NAME, DEFAULT_MIN_COLS, DEFAULT_MIN_ROWS, DEFAULT_SHEET_NAME,
    PageSelection, SelectionThresholds, SheetLayout,
};
pub use select::{Rejection, rejections, select_tables};
pub use warning::{ConvertWarning, WarningCode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// Tables handed to the selector.
    pub candidate_count: usize,
    /// Tables that passed selection.
    pub table_count: usize,
    pub rejected_count: usize,
    pub sheet_count: usize,
    /// Body rows written across all sheets, header rows excluded.
    pub row_count: usize,
    pub column_count: usize,
    pub warnings: Vec<ConvertWarning>,
}

fn validate_options(options: &ConvertOptions) -> Result<(), ConvertError> {
    if options.font_name.trim().is_empty() {
        return Err(ConvertError::InvalidOption(
            "font name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Selects, normalizes and lays out `tables` without touching the filesystem.
///
/// Returns [`ConvertError::NoTableFound`] when no table meets the thresholds.
pub fn convert_tables(
    tables: &[RawTable],
    options: &ConvertOptions,
) -> Result<(Vec<SheetData>, ConversionReport), ConvertError> {
    validate_options(options)?;

    let thresholds = options.thresholds;
    let accepted = select_tables(tables, thresholds)?;

    let mut warnings = Vec::new();
    let dropped = rejections(tables, thresholds);
    for rejection in &dropped {
        warn!(
            page = rejection.page,
            rows = rejection.rows,
            cols = rejection.cols,
            "table rejected by size thresholds"
        );
        warnings.push(
            ConvertWarning::new(
                WarningCode::TableRejected,
                format!(
                    "{}x{} table is below the {}x{} thresholds",
                    rejection.rows, rejection.cols, thresholds.min_rows, thresholds.min_cols
                ),
            )
            .with_page(rejection.page)
            .with_table_index(rejection.source_index),
        );
    }

    if accepted.is_empty() {
        return Err(ConvertError::NoTableFound {
            min_rows: thresholds.min_rows,
            min_cols: thresholds.min_cols,
        });
    }

    let sheets = build_sheets(&accepted, options, &mut warnings);
    let report = ConversionReport {
        candidate_count: tables.len(),
        table_count: accepted.len(),
        rejected_count: dropped.len(),
        sheet_count: sheets.len(),
        row_count: sheets.iter().map(|sheet| sheet.rows.len()).sum(),
        column_count: sheets.iter().map(SheetData::width).max().unwrap_or(0),
        warnings,
    };

    info!(
        candidates = report.candidate_count,
        accepted = report.table_count,
        rows = report.row_count,
        columns = report.column_count,
        "tables converted"
    );
    Ok((sheets, report))
}

fn convert_pages(
    pages: &[PageText],
    options: &ConvertOptions,
) -> Result<(Vec<SheetData>, ConversionReport), ConvertError> {
    let mut detect_warnings = Vec::new();
    let tables = detect_tables(pages, &mut detect_warnings);
    let (sheets, mut report) = convert_tables(&tables, options)?;
    detect_warnings.append(&mut report.warnings);
    report.warnings = detect_warnings;
    Ok((sheets, report))
}

fn single_sheet(sheets: &[SheetData]) -> Result<&SheetData, ConvertError> {
    match sheets {
        [sheet] => Ok(sheet),
        _ => Err(ConvertError::InvalidOption(
            "CSV output holds exactly one sheet; use the merged layout".to_string(),
        )),
    }
}

/// Candidate tables found in a PDF, before any selection.
pub fn extract_raw_tables(
    input_pdf: &Path,
    options: &ConvertOptions,
) -> Result<(Vec<RawTable>, Vec<ConvertWarning>), ConvertError> {
    let pages = read_pdf_pages(input_pdf, options.pages.as_ref())?;
    let mut warnings = Vec::new();
    let tables = detect_tables(&pages, &mut warnings);
    Ok((tables, warnings))
}

pub fn extract_raw_tables_from_bytes(
    input_pdf: &[u8],
    options: &ConvertOptions,
) -> Result<(Vec<RawTable>, Vec<ConvertWarning>), ConvertError> {
    let pages = read_pdf_pages_from_bytes(input_pdf, options.pages.as_ref())?;
    let mut warnings = Vec::new();
    let tables = detect_tables(&pages, &mut warnings);
    Ok((tables, warnings))
}

pub fn convert_pdf_to_xlsx(
    input_pdf: &Path,
    output_xlsx: &Path,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    validate_options(options)?;
    let pages = read_pdf_pages(input_pdf, options.pages.as_ref())?;
    let (sheets, report) = convert_pages(&pages, options)?;
    write_xlsx(output_xlsx, &sheets, &options.font_name)?;
    Ok(report)
}

pub fn convert_pdf_bytes_to_xlsx(
    input_pdf: &[u8],
    options: &ConvertOptions,
) -> Result<(Vec<u8>, ConversionReport), ConvertError> {
    validate_options(options)?;
    let pages = read_pdf_pages_from_bytes(input_pdf, options.pages.as_ref())?;
    let (sheets, report) = convert_pages(&pages, options)?;
    let bytes = write_xlsx_to_buffer(&sheets, &options.font_name)?;
    Ok((bytes, report))
}

pub fn convert_pdf_to_csv(
    input_pdf: &Path,
    output_csv: &Path,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    if options.layout != SheetLayout::Merged {
        return Err(ConvertError::InvalidOption(
            "CSV output requires the merged layout".to_string(),
        ));
    }

    let pages = read_pdf_pages(input_pdf, options.pages.as_ref())?;
    let (sheets, report) = convert_pages(&pages, options)?;
    write_csv(output_csv, single_sheet(&sheets)?, options.delimiter)?;
    Ok(report)
}

pub fn convert_pdf_bytes_to_csv_string(
    input_pdf: &[u8],
    options: &ConvertOptions,
) -> Result<(String, ConversionReport), ConvertError> {
    if options.layout != SheetLayout::Merged {
        return Err(ConvertError::InvalidOption(
            "CSV output requires the merged layout".to_string(),
        ));
    }

    let pages = read_pdf_pages_from_bytes(input_pdf, options.pages.as_ref())?;
    let (sheets, report) = convert_pages(&pages, options)?;
    let csv = write_csv_to_string(single_sheet(&sheets)?, options.delimiter)?;
    Ok((csv, report))
}
