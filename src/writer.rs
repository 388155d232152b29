use crate::error::SheetResult;
use crate::parser::is_json;
use crate::types::Record;
use std::fs;
use std::path::Path;

/// Write records as a YAML sequence, or as JSON for `.json` paths
pub fn write_records(path: &Path, records: &[Record]) -> SheetResult<()> {
    let content = if is_json(path) {
        let mut json = serde_json::to_string_pretty(records)?;
        json.push('\n');
        json
    } else {
        serde_yaml::to_string(records)?
    };
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_records;
    use tempfile::TempDir;

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("name", "Ann").with("age", "30"),
            Record::new().with("name", "Bo"),
        ]
    }

    #[test]
    fn test_write_yaml_keeps_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.yaml");

        write_records(&path, &records()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("name: Ann"));
        // numeric-looking text stays quoted so it reads back as text
        assert!(content.contains("age: '30'"));
        assert_eq!(parse_records(&path).unwrap(), records());
    }

    #[test]
    fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.json");

        write_records(&path, &records()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"age\": \"30\""));
        assert_eq!(parse_records(&path).unwrap(), records());
    }
}
