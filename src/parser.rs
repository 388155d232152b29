use crate::error::{SheetError, SheetResult};
use crate::excel::{ExcelExporter, ExcelImporter, HeaderRow};
use crate::types::{ColumnMapping, Record};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Mapping file: which sheet, which columns, and how the header is laid out.
///
/// ```yaml
/// sheet: Staff
/// instruction:
///   - "One person per row"
/// columns:
///   Name: name
///   Age: age
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    #[serde(default = "default_sheet")]
    pub sheet: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instruction: Vec<String>,

    pub columns: ColumnMapping,

    #[serde(default)]
    pub header_row: HeaderRow,
}

fn default_sheet() -> String {
    "Sheet1".to_string()
}

impl MappingConfig {
    pub fn new(columns: ColumnMapping) -> Self {
        Self {
            sheet: default_sheet(),
            instruction: Vec::new(),
            columns,
            header_row: HeaderRow::Auto,
        }
    }

    /// Reject mappings that cannot describe a sheet
    pub fn validate(&self) -> SheetResult<()> {
        if self.sheet.trim().is_empty() {
            return Err(SheetError::Config("sheet name is empty".to_string()));
        }
        if self.columns.is_empty() {
            return Err(SheetError::Config(
                "mapping needs at least one column".to_string(),
            ));
        }
        for column in &self.columns {
            if column.label.trim().is_empty() {
                return Err(SheetError::Config(format!(
                    "column mapped to field '{}' has an empty label",
                    column.field
                )));
            }
            if column.field.trim().is_empty() {
                return Err(SheetError::Config(format!(
                    "column '{}' has an empty field name",
                    column.label
                )));
            }
        }
        Ok(())
    }

    pub fn exporter(&self) -> ExcelExporter {
        ExcelExporter::new(self.sheet.clone(), self.columns.clone())
            .with_instruction(self.instruction.iter().cloned())
    }

    pub fn importer(&self) -> ExcelImporter {
        ExcelImporter::new(self.sheet.clone(), self.columns.clone()).with_header_row(self.header_row)
    }
}

/// True for `.json` paths; everything else is read as YAML.
pub(crate) fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Parse and validate a mapping file (YAML or JSON)
pub fn parse_config(path: &Path) -> SheetResult<MappingConfig> {
    let content = fs::read_to_string(path)?;
    let config: MappingConfig = if is_json(path) {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    config.validate()?;
    Ok(config)
}

/// Parse a list of records (a YAML or JSON sequence of flat maps)
pub fn parse_records(path: &Path) -> SheetResult<Vec<Record>> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records = if is_json(path) {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(records)
}
