//! In-memory row/column store standing in for one worksheet.

/// A single cell. `None` is an empty cell.
pub type Cell = Option<String>;

/// Rows of text cells, addressed by 0-based `(row, column)`.
///
/// Rows are ragged: each row is as wide as the cells it holds, so a short
/// row simply ends early.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a grid where every given cell holds text.
    pub fn from_text<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|s| Some(s.into())).collect())
                .collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn row_width(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    /// Text at `(row, column)`. Out-of-range positions read as empty.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Builds one grid, row by row. Each export owns its own builder, so the
/// row cursor never outlives the call that created it.
#[derive(Debug, Default)]
pub struct GridBuilder {
    rows: Vec<Vec<Cell>>,
}

impl GridBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next pushed row will get.
    pub fn next_row(&self) -> usize {
        self.rows.len()
    }

    /// Append a row and return its index.
    pub fn push_row(&mut self, cells: Vec<Cell>) -> usize {
        self.rows.push(cells);
        self.rows.len() - 1
    }

    pub fn finish(self) -> Grid {
        Grid { rows: self.rows }
    }
}
