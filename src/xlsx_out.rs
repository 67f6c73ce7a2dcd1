use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook, Worksheet};

use crate::error::ConvertError;
use crate::model::SheetData;

const HEADER_FONT_SIZE: f64 = 12.0;
const BODY_FONT_SIZE: f64 = 11.0;
const HEADER_ROW_HEIGHT: f64 = 25.0;
const BODY_ROW_HEIGHT: f64 = 20.0;
const MIN_COLUMN_WIDTH: f64 = 12.0;
const MAX_COLUMN_WIDTH: f64 = 50.0;
const WIDTH_PER_CHAR: f64 = 1.3;

static NUMERIC_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9\x{06F0}-\x{06F9}\x{0660}-\x{0669},:/\-.]+$")
        .expect("hardcoded numeric cell regex is valid")
});

/// Whether a cell reads as a number, amount or date.
pub(crate) fn looks_numeric(value: &str) -> bool {
    NUMERIC_CELL.is_match(value.trim())
}

pub(crate) fn column_width(longest_cell_chars: usize) -> f64 {
    let chars = f64::from(u32::try_from(longest_cell_chars).unwrap_or(u32::MAX));
    (chars * WIDTH_PER_CHAR).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

struct CellFormats {
    header: Format,
    numeric: Format,
    text: Format,
}

impl CellFormats {
    fn new(font_name: &str) -> Self {
        let base = Format::new()
            .set_font_name(font_name)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);

        Self {
            header: base
                .clone()
                .set_font_size(HEADER_FONT_SIZE)
                .set_bold()
                .set_align(FormatAlign::Center),
            numeric: base
                .clone()
                .set_font_size(BODY_FONT_SIZE)
                .set_align(FormatAlign::Center),
            text: base
                .set_font_size(BODY_FONT_SIZE)
                .set_align(FormatAlign::Right),
        }
    }
}

fn row_number(index: usize) -> Result<RowNum, ConvertError> {
    RowNum::try_from(index)
        .map_err(|_| ConvertError::SheetLimit(format!("row {index} is out of range")))
}

fn col_number(index: usize) -> Result<ColNum, ConvertError> {
    ColNum::try_from(index)
        .map_err(|_| ConvertError::SheetLimit(format!("column {index} is out of range")))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    value: &str,
    format: &Format,
) -> Result<(), ConvertError> {
    if value.is_empty() {
        worksheet.write_blank(row, col, format)?;
    } else {
        worksheet.write_string_with_format(row, col, value, format)?;
    }
    Ok(())
}

fn fill_worksheet(
    worksheet: &mut Worksheet,
    sheet: &SheetData,
    formats: &CellFormats,
) -> Result<(), ConvertError> {
    worksheet.set_name(&sheet.name)?;
    worksheet.set_right_to_left(true);

    for (col, value) in sheet.header.iter().enumerate() {
        write_cell(worksheet, 0, col_number(col)?, value, &formats.header)?;
    }
    worksheet.set_row_height(0, HEADER_ROW_HEIGHT)?;

    for (index, row) in sheet.rows.iter().enumerate() {
        let row_num = row_number(index + 1)?;
        for (col, value) in row.iter().enumerate() {
            let format = if looks_numeric(value) {
                &formats.numeric
            } else {
                &formats.text
            };
            write_cell(worksheet, row_num, col_number(col)?, value, format)?;
        }
        worksheet.set_row_height(row_num, BODY_ROW_HEIGHT)?;
    }

    for col in 0..sheet.width() {
        let longest = std::iter::once(&sheet.header)
            .chain(&sheet.rows)
            .filter_map(|row| row.get(col))
            .map(|value| value.chars().count())
            .max()
            .unwrap_or(0);
        worksheet.set_column_width(col_number(col)?, column_width(longest))?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn build_workbook(sheets: &[SheetData], font_name: &str) -> Result<Workbook, ConvertError> {
    let formats = CellFormats::new(font_name);
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        fill_worksheet(worksheet, sheet, &formats)?;
    }
    Ok(workbook)
}

pub(crate) fn write_xlsx(
    path: &Path,
    sheets: &[SheetData],
    font_name: &str,
) -> Result<(), ConvertError> {
    let mut workbook = build_workbook(sheets, font_name)?;
    workbook.save(path)?;
    Ok(())
}

pub(crate) fn write_xlsx_to_buffer(
    sheets: &[SheetData],
    font_name: &str,
) -> Result<Vec<u8>, ConvertError> {
    let mut workbook = build_workbook(sheets, font_name)?;
    Ok(workbook.save_to_buffer()?)
}
