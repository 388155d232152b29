//! Excel importer implementation - .xlsx → grid → records

use crate::access::FieldAccess;
use crate::error::{SheetError, SheetResult};
use crate::grid::{Cell, Grid};
use crate::report::{Imported, Issue};
use crate::types::ColumnMapping;
use calamine::{Data, Range, Reader, Xlsx};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Which grid row holds the column labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderRow {
    /// Row 0, or row 1 when it holds more mapped labels than row 0 (the
    /// layout written with an instruction row). No other row is considered.
    #[default]
    Auto,
    /// A fixed 0-based row.
    #[serde(untagged)]
    Index(usize),
}

/// A header position that resolved to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub label: String,
    pub field: String,
}

/// Excel importer for decoding one sheet into records
pub struct ExcelImporter {
    sheet_name: String,
    mapping: ColumnMapping,
    header_row: HeaderRow,
}

impl ExcelImporter {
    /// Create a new importer reading the named sheet
    pub fn new(sheet_name: impl Into<String>, mapping: ColumnMapping) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            mapping,
            header_row: HeaderRow::Auto,
        }
    }

    pub fn with_header_row(mut self, header_row: HeaderRow) -> Self {
        self.header_row = header_row;
        self
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// List the sheets of a workbook
    pub fn sheet_names<R: Read>(source: R) -> SheetResult<Vec<String>> {
        let workbook = open_workbook(source)?;
        Ok(workbook.sheet_names().to_vec())
    }

    /// Read the configured sheet into a grid anchored at cell A1.
    pub fn read_grid<R: Read>(&self, source: R) -> SheetResult<Grid> {
        let mut workbook = open_workbook(source)?;

        let available = workbook.sheet_names().to_vec();
        if !available.iter().any(|name| name == &self.sheet_name) {
            return Err(SheetError::MissingSheet {
                sheet: self.sheet_name.clone(),
                available,
            });
        }

        let range = workbook
            .worksheet_range(&self.sheet_name)
            .map_err(|e| SheetError::Workbook(format!("Failed to read sheet: {}", e)))?;

        let grid = range_to_grid(&range);
        debug!(sheet = %self.sheet_name, rows = grid.height(), "Read grid");
        Ok(grid)
    }

    /// Import records built with `Default`
    pub fn import<R, T>(&self, source: R) -> SheetResult<Imported<T>>
    where
        R: Read,
        T: FieldAccess + Default,
    {
        self.import_with(source, || Ok::<T, Infallible>(T::default()))
    }

    /// Import records built by `factory`, one call per data row
    pub fn import_with<R, T, F, E>(&self, source: R, factory: F) -> SheetResult<Imported<T>>
    where
        R: Read,
        T: FieldAccess,
        F: FnMut() -> Result<T, E>,
        E: fmt::Display,
    {
        let grid = self.read_grid(source)?;
        let imported = self.decode(&grid, factory);

        info!(
            sheet = %self.sheet_name,
            records = imported.records.len(),
            issues = imported.issues.len(),
            "Import complete"
        );

        Ok(imported)
    }

    /// Import an .xlsx file
    pub fn open<T: FieldAccess + Default>(&self, path: &Path) -> SheetResult<Imported<T>> {
        let file = File::open(path)?;
        self.import(BufReader::new(file))
    }

    /// Row holding the column labels, or `None` when the grid has no such row.
    pub fn locate_header(&self, grid: &Grid) -> Option<usize> {
        match self.header_row {
            HeaderRow::Index(row) => (row < grid.height()).then_some(row),
            HeaderRow::Auto => {
                if grid.is_empty() {
                    return None;
                }
                let plain = self.mapped_label_count(grid, 0);
                let after_instruction = self.mapped_label_count(grid, 1);
                Some(if after_instruction > plain { 1 } else { 0 })
            }
        }
    }

    /// Number of distinct mapped labels appearing in `row`.
    fn mapped_label_count(&self, grid: &Grid, row: usize) -> usize {
        let Some(cells) = grid.row(row) else {
            return 0;
        };
        self.mapping
            .labels()
            .filter(|label| cells.iter().flatten().any(|cell| cell.as_str() == *label))
            .count()
    }

    /// Map each position of the header row to a field, from the literal label text.
    ///
    /// Only positions inside the header row are considered. Labels the
    /// mapping does not know resolve to `None` and their cells are ignored.
    pub fn resolve_columns(&self, grid: &Grid, header: usize) -> Vec<Option<ColumnBinding>> {
        let columns: Vec<Option<ColumnBinding>> = (0..grid.row_width(header))
            .map(|column| {
                let label = grid.cell(header, column)?;
                let field = self.mapping.field_for(label)?;
                Some(ColumnBinding {
                    label: label.to_string(),
                    field: field.to_string(),
                })
            })
            .collect();

        for label in self.mapping.labels() {
            if !columns.iter().flatten().any(|c| c.label == label) {
                debug!(sheet = %self.sheet_name, label, "Mapped label not present in header");
            }
        }

        columns
    }

    /// Decode every row below the header into a new record.
    pub fn decode<T, F, E>(&self, grid: &Grid, mut factory: F) -> Imported<T>
    where
        T: FieldAccess,
        F: FnMut() -> Result<T, E>,
        E: fmt::Display,
    {
        let mut imported = Imported::default();

        let Some(header) = self.locate_header(grid) else {
            warn!(sheet = %self.sheet_name, "No header row; nothing to import");
            return imported;
        };
        let columns = self.resolve_columns(grid, header);
        debug!(
            sheet = %self.sheet_name,
            header_row = header,
            mapped = columns.iter().flatten().count(),
            "Resolved header"
        );

        for row in (header + 1)..grid.height() {
            let mut record = match factory() {
                Ok(record) => record,
                Err(e) => {
                    let issue = Issue::Construction {
                        row,
                        message: e.to_string(),
                    };
                    warn!("{}", issue);
                    imported.issues.push(issue);
                    continue;
                }
            };

            for (column, binding) in columns.iter().enumerate() {
                let Some(binding) = binding else { continue };
                let Some(value) = grid.cell(row, column) else {
                    continue;
                };

                if let Err(error) = record.set_field(&binding.field, value) {
                    let issue = Issue::Field {
                        row,
                        column,
                        label: binding.label.clone(),
                        error,
                    };
                    warn!("{}", issue);
                    imported.issues.push(issue);
                }
            }

            imported.records.push(record);
        }

        imported
    }
}

fn open_workbook<R: Read>(mut source: R) -> SheetResult<Xlsx<Cursor<Vec<u8>>>> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    Xlsx::new(Cursor::new(bytes))
        .map_err(|e| SheetError::Workbook(format!("Failed to open Excel data: {}", e)))
}

/// calamine ranges start at the first used cell; shift back to A1 and trim
/// each row's trailing empty cells.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((start_row, start_col)) = range.start() else {
        return Grid::new();
    };

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells: Vec<Cell> = vec![None; start_col as usize];
        cells.extend(row.iter().map(cell_text));
        while matches!(cells.last(), Some(None)) {
            cells.pop();
        }
        rows.push(cells);
    }

    Grid::from_rows(rows)
}

fn cell_text(cell: &Data) -> Cell {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
