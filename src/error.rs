use thiserror::Error;

pub type SheetResult<T> = Result<T, SheetError>;

/// Call-level failures. Any of these means the operation produced no usable result.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Sheet '{sheet}' not found (available: {})", .available.join(", "))]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Per-field failures raised by a [`crate::access::FieldAccess`] implementation.
///
/// These never abort a batch: the mapper records them as
/// [`crate::report::Issue`]s and moves on to the next cell.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("{type_name} has no field '{field}' (no accessor {accessor})")]
    UnknownField {
        type_name: String,
        field: String,
        accessor: String,
    },

    #[error("{type_name} field '{field}' is read-only (no mutator {accessor})")]
    ReadOnly {
        type_name: String,
        field: String,
        accessor: String,
    },

    #[error("Reading field '{field}' failed: {message}")]
    Get { field: String, message: String },

    #[error("Setting field '{field}' to '{value}' failed: {message}")]
    Set {
        field: String,
        value: String,
        message: String,
    },
}

impl AccessError {
    /// The field name this error is about.
    pub fn field(&self) -> &str {
        match self {
            AccessError::UnknownField { field, .. }
            | AccessError::ReadOnly { field, .. }
            | AccessError::Get { field, .. }
            | AccessError::Set { field, .. } => field,
        }
    }

    /// True when the error points at a mapping that names a field the type does not have.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AccessError::UnknownField { .. } | AccessError::ReadOnly { .. }
        )
    }
}
