//! Outcome of an export or import: what was produced, plus every isolated
//! field- or row-level problem met along the way.

use crate::error::AccessError;
use thiserror::Error;

/// A problem confined to one cell or one row. The rest of the batch is unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// A field could not be read (export) or written (import). The cell is left out.
    #[error("row {row}, column {column} ('{label}'): {error}")]
    Field {
        row: usize,
        column: usize,
        label: String,
        error: AccessError,
    },

    /// A target instance could not be built for a data row. The row is omitted.
    #[error("row {row}: could not construct record: {message}")]
    Construction { row: usize, message: String },
}

impl Issue {
    /// Grid row (0-based, header rows included) the issue belongs to.
    pub fn row(&self) -> usize {
        match self {
            Issue::Field { row, .. } | Issue::Construction { row, .. } => *row,
        }
    }

    /// True when the issue comes from a mapping that names a field the target type lacks.
    pub fn is_configuration(&self) -> bool {
        match self {
            Issue::Field { error, .. } => error.is_configuration(),
            Issue::Construction { .. } => false,
        }
    }
}

/// Result of writing records into a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Data rows written, one per input record.
    pub rows_written: usize,
    pub issues: Vec<Issue>,
}

impl ExportReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Records decoded from a grid, in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Imported<T> {
    pub records: Vec<T>,
    pub issues: Vec<Issue>,
}

impl<T> Imported<T> {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

impl<T> Default for Imported<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            issues: Vec::new(),
        }
    }
}
