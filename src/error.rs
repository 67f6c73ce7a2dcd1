use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("invalid page selection: {0}")]
    InvalidPageSelection(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no pages available after applying selection")]
    NoPagesSelected,

    #[error(
        "table {table_index} on page {page} is not rectangular: row {row_index} has {found} cells, expected {expected}"
    )]
    MalformedTable {
        table_index: usize,
        page: u32,
        row_index: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "no table matched the thresholds (min_rows={min_rows}, min_cols={min_cols}); try lowering them"
    )]
    NoTableFound { min_rows: usize, min_cols: usize },

    #[error("sheet exceeds spreadsheet limits: {0}")]
    SheetLimit(String),
}
