/// A cell as handed over by the extractor. `None` marks a missing value.
pub type RawCell = Option<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// A grid of raw cells scanned from one PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub page: u32,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    #[must_use]
    pub fn new(page: u32, rows: Vec<Vec<RawCell>>) -> Self {
        Self { page, rows }
    }

    /// Builds a table where every cell is present.
    #[must_use]
    pub fn from_strings<R, C>(page: u32, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
            .collect();
        Self { page, rows }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first row; tables are expected to be rectangular.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// A table that passed selection, split into its header and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedTable {
    pub page: u32,
    pub source_index: usize,
    pub header: Vec<RawCell>,
    pub body: Vec<Vec<RawCell>>,
}

impl AcceptedTable {
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

/// Normalized, rectangular content of one output sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetData {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    #[must_use]
    pub fn width(&self) -> usize {
        self.header.len()
    }
}
