//! Sheetmap - map records to spreadsheet rows and back
//!
//! This library converts a list of records into a single-sheet .xlsx
//! workbook and decodes such a sheet back into records. A caller-supplied
//! [`ColumnMapping`] ties each column label to a field name; fields are
//! read and written by name through [`access::FieldAccess`].
//!
//! # Features
//!
//! - Ordered label → field mapping; mapping order is column order
//! - Optional free-text instruction row above the labels
//! - Import locates columns by header text, not position
//! - Per-field and per-row problems are collected, never fatal
//! - Cell values stay text end to end
//!
//! # Example
//!
//! ```
//! use sheetmap::excel::{ExcelExporter, ExcelImporter};
//! use sheetmap::{ColumnMapping, Record};
//!
//! let mapping = ColumnMapping::new()
//!     .with_column("Name", "name")
//!     .with_column("Age", "age");
//!
//! let people = vec![
//!     Record::new().with("name", "Ann").with("age", "30"),
//!     Record::new().with("name", "Bo").with("age", "25"),
//! ];
//!
//! let exported = ExcelExporter::new("People", mapping.clone())
//!     .with_instruction(["Demo sheet"])
//!     .export_to_bytes(&people)?;
//!
//! let imported = ExcelImporter::new("People", mapping).import::<_, Record>(exported.into_reader())?;
//! assert_eq!(imported.records, people);
//! # Ok::<(), sheetmap::error::SheetError>(())
//! ```

pub mod access;
pub mod cli;
pub mod error;
pub mod excel;
pub mod grid;
pub mod parser;
pub mod report;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use access::{FieldAccess, FieldRegistry};
pub use error::{AccessError, SheetError, SheetResult};
pub use grid::Grid;
pub use report::{ExportReport, Imported, Issue};
pub use types::{ColumnMapping, ColumnSpec, Record};
