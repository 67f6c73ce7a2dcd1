use crate::error::ConvertError;
use crate::model::{AcceptedTable, RawTable};
use crate::options::SelectionThresholds;

/// A candidate that fell below the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub source_index: usize,
    pub page: u32,
    pub rows: usize,
    pub cols: usize,
}

fn ensure_rectangular(index: usize, table: &RawTable) -> Result<(), ConvertError> {
    let expected = table.column_count();
    match table
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != expected)
    {
        Some((row_index, row)) => Err(ConvertError::MalformedTable {
            table_index: index,
            page: table.page,
            row_index,
            expected,
            found: row.len(),
        }),
        None => Ok(()),
    }
}

fn ensure_all_rectangular(tables: &[RawTable]) -> Result<(), ConvertError> {
    tables
        .iter()
        .enumerate()
        .try_for_each(|(index, table)| ensure_rectangular(index, table))
}

/// Keeps the tables that meet `thresholds`, in their original order.
///
/// Every table must be rectangular; the first ragged one fails the whole call.
/// An empty result is not an error.
pub fn select_tables(
    tables: &[RawTable],
    thresholds: SelectionThresholds,
) -> Result<Vec<AcceptedTable>, ConvertError> {
    ensure_all_rectangular(tables)?;

    Ok(tables
        .iter()
        .enumerate()
        .filter(|(_, table)| thresholds.accepts(table.row_count(), table.column_count()))
        .map(|(source_index, table)| {
            let mut rows = table.rows.iter().cloned();
            let header = rows.next().unwrap_or_default();
            AcceptedTable {
                page: table.page,
                source_index,
                header,
                body: rows.collect(),
            }
        })
        .collect())
}

/// The tables [`select_tables`] drops for `thresholds`.
#[must_use]
pub fn rejections(tables: &[RawTable], thresholds: SelectionThresholds) -> Vec<Rejection> {
    tables
        .iter()
        .enumerate()
        .filter(|(_, table)| !thresholds.accepts(table.row_count(), table.column_count()))
        .map(|(source_index, table)| Rejection {
            source_index,
            page: table.page,
            rows: table.row_count(),
            cols: table.column_count(),
        })
        .collect()
}
