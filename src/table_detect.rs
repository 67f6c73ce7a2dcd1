use tracing::{debug, warn};

use crate::model::{PageText, RawCell, RawTable};
use crate::table_parse::line_cells;
use crate::warning::{ConvertWarning, WarningCode};

/// Cells a line needs before it counts as a table row.
pub(crate) const MIN_CELLS_PER_LINE: usize = 2;

fn finish_table(
    page: u32,
    rows: &mut Vec<Vec<String>>,
    tables: &mut Vec<RawTable>,
    warnings: &mut Vec<ConvertWarning>,
) {
    if rows.is_empty() {
        return;
    }

    let rows = std::mem::take(rows);
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let ragged = rows.iter().filter(|row| row.len() != width).count();
    if ragged > 0 {
        warn!(page, ragged, width, "padded ragged table rows");
        warnings.push(
            ConvertWarning::new(
                WarningCode::RaggedRowsPadded,
                format!("padded {ragged} short row(s) to {width} columns"),
            )
            .with_page(page)
            .with_table_index(tables.len()),
        );
    }

    let rows = rows
        .into_iter()
        .map(|row| {
            let mut cells = row.into_iter().map(Some).collect::<Vec<RawCell>>();
            cells.resize(width, None);
            cells
        })
        .collect();
    tables.push(RawTable::new(page, rows));
}

/// Every run of consecutive multi-cell lines on a page becomes one candidate.
/// Size filtering is left to the selector.
fn detect_tables_in_page(
    page: &PageText,
    tables: &mut Vec<RawTable>,
    warnings: &mut Vec<ConvertWarning>,
) {
    let before = tables.len();
    let mut current_rows: Vec<Vec<String>> = Vec::new();

    for line in page.text.lines() {
        let cells = line_cells(line, MIN_CELLS_PER_LINE);
        if cells.len() >= MIN_CELLS_PER_LINE {
            current_rows.push(cells);
        } else {
            finish_table(page.page_number, &mut current_rows, tables, warnings);
        }
    }
    finish_table(page.page_number, &mut current_rows, tables, warnings);

    debug!(
        page = page.page_number,
        candidates = tables.len() - before,
        "scanned page for table candidates"
    );
}

pub(crate) fn detect_tables(
    pages: &[PageText],
    warnings: &mut Vec<ConvertWarning>,
) -> Vec<RawTable> {
    let mut tables = Vec::new();
    for page in pages {
        detect_tables_in_page(page, &mut tables, warnings);
    }
    tables
}
