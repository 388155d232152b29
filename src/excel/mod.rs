//! Excel import/export for mapped records
//!
//! This module provides bidirectional records ↔ Excel conversion:
//! - Export: records → grid (instruction row, label row, data rows) → .xlsx
//! - Import: .xlsx → grid → records, columns located by header text

mod exporter;
mod importer;

pub use exporter::{encode_rows, write_header, ExcelExporter, ExportedWorkbook};
pub use importer::{ColumnBinding, ExcelImporter, HeaderRow};
