use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ConvertError;

pub const DEFAULT_MIN_ROWS: usize = 2;
pub const DEFAULT_MIN_COLS: usize = 2;
pub const DEFAULT_SHEET_NAME: &str = "Data";
pub const DEFAULT_FONT_NAME: &str = "Arial";

/// Minimum table dimensions accepted by [`crate::select_tables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionThresholds {
    pub min_rows: usize,
    pub min_cols: usize,
}

impl SelectionThresholds {
    #[must_use]
    pub const fn new(min_rows: usize, min_cols: usize) -> Self {
        Self { min_rows, min_cols }
    }

    #[must_use]
    pub const fn accepts(self, rows: usize, cols: usize) -> bool {
        rows >= self.min_rows && cols >= self.min_cols
    }
}

impl Default for SelectionThresholds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ROWS, DEFAULT_MIN_COLS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetLayout {
    /// All accepted tables stacked under the first table's header.
    #[default]
    Merged,
    /// One worksheet per accepted table.
    PerTable,
}

/// 1-based pages to read, parsed from input like `1-3,5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn page_number(token: &str, raw: &str) -> Result<u32, ConvertError> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ConvertError::InvalidPageSelection(format!(
            "'{token}': pages are 1-based"
        ))),
        Ok(page) => Ok(page),
        Err(_) => Err(ConvertError::InvalidPageSelection(format!(
            "'{token}': '{}' is not a page number",
            raw.trim()
        ))),
    }
}

fn page_range(token: &str) -> Result<RangeInclusive<u32>, ConvertError> {
    let Some((first, last)) = token.split_once('-') else {
        let page = page_number(token, token)?;
        return Ok(page..=page);
    };

    let (first, last) = (page_number(token, first)?, page_number(token, last)?);
    if last < first {
        return Err(ConvertError::InvalidPageSelection(format!(
            "'{token}': range ends before it starts"
        )));
    }
    Ok(first..=last)
}

impl FromStr for PageSelection {
    type Err = ConvertError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in input.split(',').map(str::trim).filter(|token| !token.is_empty()) {
            pages.extend(page_range(token)?);
        }

        if pages.is_empty() {
            return Err(ConvertError::InvalidPageSelection(
                "no pages given".to_string(),
            ));
        }
        Ok(Self { pages })
    }
}

/// Settings for one conversion run. Nothing here is process-wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub pages: Option<PageSelection>,
    pub thresholds: SelectionThresholds,
    pub sheet_name: String,
    pub font_name: String,
    pub layout: SheetLayout,
    /// Reverse the column order of every row before writing.
    pub mirror_columns: bool,
    /// Field delimiter for CSV output.
    pub delimiter: u8,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            pages: None,
            thresholds: SelectionThresholds::default(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            font_name: DEFAULT_FONT_NAME.to_string(),
            layout: SheetLayout::Merged,
            mirror_columns: false,
            delimiter: b',',
        }
    }
}
