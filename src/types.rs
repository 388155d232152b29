use crate::access::FieldAccess;
use crate::error::AccessError;
use serde::de;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;

//==============================================================================
// Column Mapping
//==============================================================================

/// One column: the label shown in the header row and the field it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub label: String,
    pub field: String,
}

impl ColumnSpec {
    pub fn new(label: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            field: field.into(),
        }
    }
}

/// Ordered association of column labels to field names.
///
/// Insertion order is column order, for both the header row and every data
/// row. Labels are unique; pushing an existing label replaces its field and
/// keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: Vec<ColumnSpec>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ColumnMapping::push`].
    pub fn with_column(mut self, label: impl Into<String>, field: impl Into<String>) -> Self {
        self.push(label, field);
        self
    }

    pub fn push(&mut self, label: impl Into<String>, field: impl Into<String>) {
        let spec = ColumnSpec::new(label, field);
        match self.columns.iter_mut().find(|c| c.label == spec.label) {
            Some(existing) => existing.field = spec.field,
            None => self.columns.push(spec),
        }
    }

    /// Field mapped to a header label, if the label is part of the mapping.
    pub fn field_for(&self, label: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.field.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.label.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.field.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnSpec> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<L: Into<String>, F: Into<String>> FromIterator<(L, F)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (L, F)>>(iter: I) -> Self {
        let mut mapping = ColumnMapping::new();
        for (label, field) in iter {
            mapping.push(label, field);
        }
        mapping
    }
}

impl<'a> IntoIterator for &'a ColumnMapping {
    type Item = &'a ColumnSpec;
    type IntoIter = std::slice::Iter<'a, ColumnSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

impl Serialize for ColumnMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in &self.columns {
            map.serialize_entry(&column.label, &column.field)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ColumnMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ColumnMapping::from_value(&value).map_err(de::Error::custom)
    }
}

impl ColumnMapping {
    /// Accepts `{label: field, ..}` (document order kept) or `[{label, field}, ..]`.
    fn from_value(value: &Value) -> Result<Self, String> {
        let specs: Vec<ColumnSpec> = match value {
            Value::Mapping(map) => map
                .iter()
                .map(|(label, field)| match (label.as_str(), field.as_str()) {
                    (Some(label), Some(field)) => Ok(ColumnSpec::new(label, field)),
                    _ => Err(format!(
                        "column entries must map a text label to a text field, got {:?}: {:?}",
                        label, field
                    )),
                })
                .collect::<Result<_, _>>()?,
            Value::Sequence(seq) => seq
                .iter()
                .map(|item| {
                    serde_yaml::from_value(item.clone())
                        .map_err(|e| format!("Invalid column entry: {}", e))
                })
                .collect::<Result<_, _>>()?,
            _ => {
                return Err(
                    "expected a map of column label to field name, or a list of {label, field} entries"
                        .to_string(),
                )
            }
        };

        let mut mapping = ColumnMapping::new();
        for spec in specs {
            if mapping.field_for(&spec.label).is_some() {
                return Err(format!("duplicate column label '{}'", spec.label));
            }
            mapping.columns.push(spec);
        }
        Ok(mapping)
    }
}

//==============================================================================
// Record
//==============================================================================

/// Schema-less record: an ordered set of text fields.
///
/// Any field can be written. Reading a field the record does not hold gives
/// an absent value rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldAccess for Record {
    fn type_name(&self) -> &str {
        "Record"
    }

    fn get_field(&self, field: &str) -> Result<Option<String>, AccessError> {
        Ok(self.get(field).map(str::to_string))
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), AccessError> {
        self.insert(field, value);
        Ok(())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let Value::Mapping(map) = value else {
            return Err(de::Error::custom("a record must be a map of field name to value"));
        };

        let mut record = Record::new();
        for (field, value) in map {
            let Some(field) = field.as_str().map(str::to_string) else {
                return Err(de::Error::custom(format!(
                    "record field names must be text, got {:?}",
                    field
                )));
            };
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(de::Error::custom(format!(
                        "field '{}' must be a scalar value",
                        field
                    )))
                }
            };
            record.insert(field, text);
        }
        Ok(record)
    }
}
