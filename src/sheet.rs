use tracing::debug;

use crate::bidi::normalize;
use crate::model::{AcceptedTable, RawCell, SheetData};
use crate::options::{ConvertOptions, DEFAULT_SHEET_NAME, SheetLayout};
use crate::table_parse::clean_cell_text;
use crate::warning::{ConvertWarning, WarningCode};

/// Longest worksheet name a workbook accepts.
pub(crate) const MAX_SHEET_NAME_CHARS: usize = 31;
const FORBIDDEN_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Workbooks reject names that start or end with an apostrophe.
fn trim_name_edges(name: &str) -> &str {
    name.trim_matches(|ch: char| ch == '\'' || ch.is_whitespace())
}

pub(crate) fn sanitize_sheet_name(name: &str) -> String {
    let replaced = trim_name_edges(name)
        .chars()
        .map(|ch| {
            if FORBIDDEN_NAME_CHARS.contains(&ch) {
                '_'
            } else {
                ch
            }
        })
        .take(MAX_SHEET_NAME_CHARS)
        .collect::<String>();

    match trim_name_edges(&replaced) {
        "" => DEFAULT_SHEET_NAME.to_string(),
        cleaned => cleaned.to_string(),
    }
}

fn numbered_sheet_name(base: &str, number: usize) -> String {
    let suffix = format!(" {number}");
    let room = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
    let base = sanitize_sheet_name(base);
    let stem = base.chars().take(room).collect::<String>();
    format!("{}{suffix}", trim_name_edges(&stem))
}

fn prepare_cell(cell: &RawCell) -> String {
    cell.as_deref()
        .map(|text| normalize(&clean_cell_text(text)))
        .unwrap_or_default()
}

fn prepare_row(row: &[RawCell], width: usize, mirror: bool) -> Vec<String> {
    let mut out = row.iter().map(prepare_cell).collect::<Vec<_>>();
    out.resize(width, String::new());
    if mirror {
        out.reverse();
    }
    out
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(String::is_empty)
}

/// Prepared body rows, without rows that are empty once cleaned.
fn body_rows<'a>(
    rows: &'a [Vec<RawCell>],
    width: usize,
    mirror: bool,
) -> impl Iterator<Item = Vec<String>> + 'a {
    rows.iter()
        .map(move |row| prepare_row(row, width, mirror))
        .filter(|row| !is_blank_row(row))
}

fn table_sheet(name: String, table: &AcceptedTable, mirror: bool) -> SheetData {
    let width = table.column_count();
    SheetData {
        name,
        header: prepare_row(&table.header, width, mirror),
        rows: body_rows(&table.body, width, mirror).collect(),
    }
}

fn merged_sheet(
    tables: &[AcceptedTable],
    options: &ConvertOptions,
    warnings: &mut Vec<ConvertWarning>,
) -> Option<SheetData> {
    let (first, rest) = tables.split_first()?;
    let width = tables
        .iter()
        .map(AcceptedTable::column_count)
        .max()
        .unwrap_or(0);
    let mirror = options.mirror_columns;

    let header = prepare_row(&first.header, width, mirror);
    let mut rows = body_rows(&first.body, width, mirror).collect::<Vec<_>>();

    for table in rest {
        let table_header = prepare_row(&table.header, width, mirror);
        if table_header == header {
            warnings.push(
                ConvertWarning::new(
                    WarningCode::RepeatedHeaderSkipped,
                    "table repeats the sheet header; header row skipped",
                )
                .with_page(table.page)
                .with_table_index(table.source_index),
            );
        } else if !is_blank_row(&table_header) {
            rows.push(table_header);
        }
        rows.extend(body_rows(&table.body, width, mirror));
    }

    Some(SheetData {
        name: sanitize_sheet_name(&options.sheet_name),
        header,
        rows,
    })
}

/// Cleans and normalizes every cell once and lays accepted tables out as sheets.
pub(crate) fn build_sheets(
    tables: &[AcceptedTable],
    options: &ConvertOptions,
    warnings: &mut Vec<ConvertWarning>,
) -> Vec<SheetData> {
    let sheets = match options.layout {
        SheetLayout::Merged => merged_sheet(tables, options, warnings)
            .into_iter()
            .collect::<Vec<_>>(),
        SheetLayout::PerTable => tables
            .iter()
            .enumerate()
            .map(|(index, table)| {
                table_sheet(
                    numbered_sheet_name(&options.sheet_name, index + 1),
                    table,
                    options.mirror_columns,
                )
            })
            .collect(),
    };

    for sheet in &sheets {
        debug!(
            sheet = %sheet.name,
            rows = sheet.rows.len(),
            columns = sheet.width(),
            "assembled sheet"
        );
    }
    sheets
}
