//! Excel exporter implementation - records → grid → .xlsx

use crate::access::FieldAccess;
use crate::error::{SheetError, SheetResult};
use crate::grid::{Cell, Grid, GridBuilder};
use crate::report::{ExportReport, Issue};
use crate::types::ColumnMapping;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Write the optional instruction row, then the column-label row.
///
/// The instruction row is written verbatim and may be wider than the label
/// row. Returns the index of the label row.
pub fn write_header<S: AsRef<str>>(
    builder: &mut GridBuilder,
    instruction: &[S],
    mapping: &ColumnMapping,
) -> usize {
    if !instruction.is_empty() {
        builder.push_row(
            instruction
                .iter()
                .map(|text| Some(text.as_ref().to_string()))
                .collect(),
        );
    }

    builder.push_row(mapping.labels().map(|label| Some(label.to_string())).collect())
}

/// Append one row per record, one cell per mapped column, in mapping order.
///
/// A field that cannot be read leaves its cell empty and is reported; the
/// row is still written.
pub fn encode_rows<T: FieldAccess>(
    builder: &mut GridBuilder,
    objects: &[T],
    mapping: &ColumnMapping,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    for object in objects {
        let row = builder.next_row();
        let mut cells: Vec<Cell> = Vec::with_capacity(mapping.len());

        for (column, spec) in mapping.iter().enumerate() {
            match object.get_field(&spec.field) {
                Ok(value) => cells.push(value),
                Err(error) => {
                    let issue = Issue::Field {
                        row,
                        column,
                        label: spec.label.clone(),
                        error,
                    };
                    warn!("{}", issue);
                    issues.push(issue);
                    cells.push(None);
                }
            }
        }

        builder.push_row(cells);
    }

    issues
}

/// An encoded workbook held in memory.
#[derive(Debug, Clone)]
pub struct ExportedWorkbook {
    pub bytes: Vec<u8>,
    pub report: ExportReport,
}

impl ExportedWorkbook {
    /// Readable byte source over the encoded workbook.
    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes)
    }
}

/// Excel exporter for lists of records
pub struct ExcelExporter {
    sheet_name: String,
    instruction: Vec<String>,
    mapping: ColumnMapping,
}

impl ExcelExporter {
    /// Create a new exporter writing a single sheet
    pub fn new(sheet_name: impl Into<String>, mapping: ColumnMapping) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            instruction: Vec::new(),
            mapping,
        }
    }

    /// Free-text row written above the column labels
    pub fn with_instruction<I, S>(mut self, instruction: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instruction = instruction.into_iter().map(Into::into).collect();
        self
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// Lay the records out as a grid: instruction row, label row, data rows.
    pub fn build_grid<T: FieldAccess>(&self, objects: &[T]) -> (Grid, ExportReport) {
        let mut builder = GridBuilder::new();

        let header = write_header(&mut builder, &self.instruction, &self.mapping);
        debug!(
            sheet = %self.sheet_name,
            header_row = header,
            columns = self.mapping.len(),
            "Wrote header"
        );

        let issues = encode_rows(&mut builder, objects, &self.mapping);
        let report = ExportReport {
            rows_written: objects.len(),
            issues,
        };

        (builder.finish(), report)
    }

    /// Encode the records and return the workbook bytes.
    pub fn export_to_bytes<T: FieldAccess>(&self, objects: &[T]) -> SheetResult<ExportedWorkbook> {
        let (grid, report) = self.build_grid(objects);
        let bytes = self.encode_workbook(&grid)?;

        info!(
            sheet = %self.sheet_name,
            rows = report.rows_written,
            issues = report.issues.len(),
            "Export complete"
        );

        Ok(ExportedWorkbook { bytes, report })
    }

    /// Encode the records and write the workbook to `sink`.
    ///
    /// The workbook is encoded completely before the first byte is written.
    /// `sink` is flushed on success and dropped on every path.
    pub fn export<W: Write, T: FieldAccess>(
        &self,
        mut sink: W,
        objects: &[T],
    ) -> SheetResult<ExportReport> {
        let exported = self.export_to_bytes(objects)?;
        sink.write_all(&exported.bytes)?;
        sink.flush()?;
        Ok(exported.report)
    }

    /// Export to an .xlsx file
    pub fn save<T: FieldAccess>(&self, output_path: &Path, objects: &[T]) -> SheetResult<ExportReport> {
        let exported = self.export_to_bytes(objects)?;
        fs::write(output_path, &exported.bytes)?;
        Ok(exported.report)
    }

    /// Write every non-empty cell as a string cell.
    fn encode_workbook(&self, grid: &Grid) -> SheetResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        for (row_idx, row) in grid.rows().enumerate() {
            let excel_row = u32::try_from(row_idx).map_err(|_| {
                SheetError::Validation(format!("Row {} is out of range for a worksheet", row_idx))
            })?;

            for (col_idx, cell) in row.iter().enumerate() {
                // Excel stores no empty strings; they read back as empty cells
                let Some(text) = cell.as_deref().filter(|text| !text.is_empty()) else {
                    continue;
                };
                let excel_col = u16::try_from(col_idx).map_err(|_| {
                    SheetError::Validation(format!(
                        "Column {} is out of range for a worksheet",
                        col_idx
                    ))
                })?;
                worksheet.write_string(excel_row, excel_col, text)?;
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessError;
    use crate::types::Record;

    fn people_mapping() -> ColumnMapping {
        ColumnMapping::new()
            .with_column("Name", "name")
            .with_column("Age", "age")
    }

    fn text(s: &str) -> Cell {
        Some(s.to_string())
    }

    /// Record wrapper whose `age` getter always fails
    struct Flaky(Record);

    impl FieldAccess for Flaky {
        fn type_name(&self) -> &str {
            "Flaky"
        }

        fn get_field(&self, field: &str) -> Result<Option<String>, AccessError> {
            if field == "age" {
                return Err(AccessError::Get {
                    field: field.to_string(),
                    message: "sensor offline".to_string(),
                });
            }
            self.0.get_field(field)
        }

        fn set_field(&mut self, field: &str, value: &str) -> Result<(), AccessError> {
            self.0.set_field(field, value)
        }
    }

    #[test]
    fn test_header_without_instruction() {
        let mut builder = GridBuilder::new();
        let header = write_header::<&str>(&mut builder, &[], &people_mapping());
        assert_eq!(header, 0);

        let grid = builder.finish();
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.row(0).unwrap(), &[text("Name"), text("Age")]);
    }

    #[test]
    fn test_header_with_wide_instruction() {
        let mut builder = GridBuilder::new();
        let header = write_header(
            &mut builder,
            &["Fill one row per person", "Ages in years", "Do not edit row 2"],
            &people_mapping(),
        );
        assert_eq!(header, 1);

        let grid = builder.finish();
        assert_eq!(grid.row_width(0), 3);
        assert_eq!(grid.row_width(1), 2);
        assert_eq!(grid.cell(0, 2), Some("Do not edit row 2"));
        assert_eq!(grid.cell(1, 0), Some("Name"));
    }

    #[test]
    fn test_encode_rows_in_mapping_order() {
        let mapping = ColumnMapping::new()
            .with_column("Age", "age")
            .with_column("Name", "name");
        let records = vec![
            Record::new().with("name", "Ann").with("age", "30"),
            Record::new().with("name", "Bo"),
        ];

        let mut builder = GridBuilder::new();
        let issues = encode_rows(&mut builder, &records, &mapping);
        assert!(issues.is_empty());

        let grid = builder.finish();
        assert_eq!(grid.row(0).unwrap(), &[text("30"), text("Ann")]);
        assert_eq!(grid.row(1).unwrap(), &[None, text("Bo")]);
    }

    #[test]
    fn test_failing_getter_leaves_cell_empty() {
        let records = vec![
            Flaky(Record::new().with("name", "Ann").with("age", "30")),
            Flaky(Record::new().with("name", "Bo").with("age", "25")),
        ];

        let exporter = ExcelExporter::new("People", people_mapping());
        let (grid, report) = exporter.build_grid(&records);

        assert_eq!(report.rows_written, 2);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].row(), 1);
        assert_eq!(report.issues[1].row(), 2);

        assert_eq!(grid.height(), 3);
        assert_eq!(grid.row(1).unwrap(), &[text("Ann"), None]);
        assert_eq!(grid.row(2).unwrap(), &[text("Bo"), None]);
    }

    #[test]
    fn test_build_grid_is_fresh_per_call() {
        let exporter =
            ExcelExporter::new("People", people_mapping()).with_instruction(["Demo sheet"]);
        let records = vec![Record::new().with("name", "Ann").with("age", "30")];

        let (first, _) = exporter.build_grid(&records);
        let (second, _) = exporter.build_grid(&records);
        assert_eq!(first, second);
        assert_eq!(second.height(), 3);
    }

    #[test]
    fn test_export_to_bytes_produces_xlsx() {
        let exporter = ExcelExporter::new("People", people_mapping());
        let records = vec![Record::new().with("name", "Ann").with("age", "30")];

        let exported = exporter.export_to_bytes(&records).unwrap();
        // .xlsx is a zip container
        assert!(exported.bytes.starts_with(b"PK"));
        assert!(exported.report.is_clean());
    }

    #[test]
    fn test_invalid_sheet_name_is_an_error() {
        let exporter = ExcelExporter::new("Bad[Name]", people_mapping());
        let result = exporter.export_to_bytes::<Record>(&[]);
        assert!(matches!(result, Err(SheetError::Xlsx(_))));
    }
}
