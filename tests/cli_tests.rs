//! CLI command tests: library entry points and the compiled binary

use assert_cmd::Command;
use predicates::prelude::*;
use sheetmap::cli::{commands, MappingOverrides};
use sheetmap::excel::ExcelImporter;
use sheetmap::parser::parse_records;
use sheetmap::Record;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MAPPING: &str = r#"
sheet: Staff
instruction:
  - "One person per row"
columns:
  Name: name
  Age: age
"#;

const PEOPLE: &str = r#"
- name: Ann
  age: 30
- name: Bo
  age: "25"
"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn sheetmap() -> Command {
    Command::cargo_bin("sheetmap").unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// COMMAND FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_then_import() {
    let dir = TempDir::new().unwrap();
    let mapping = write(dir.path(), "staff.yaml", MAPPING);
    let people = write(dir.path(), "people.yaml", PEOPLE);
    let xlsx = dir.path().join("people.xlsx");
    let back = dir.path().join("back.json");

    commands::export(
        people,
        xlsx.clone(),
        mapping.clone(),
        MappingOverrides::default(),
        true,
    )
    .unwrap();
    assert!(xlsx.exists());

    commands::import(
        xlsx,
        back.clone(),
        mapping,
        MappingOverrides::default(),
        true,
    )
    .unwrap();

    let records = parse_records(&back).unwrap();
    assert_eq!(
        records,
        vec![
            Record::new().with("name", "Ann").with("age", "30"),
            Record::new().with("name", "Bo").with("age", "25"),
        ]
    );
}

#[test]
fn test_export_sheet_override() {
    let dir = TempDir::new().unwrap();
    let mapping = write(dir.path(), "staff.yaml", MAPPING);
    let people = write(dir.path(), "people.yaml", PEOPLE);
    let xlsx = dir.path().join("people.xlsx");

    let overrides = MappingOverrides {
        sheet: Some("Team".to_string()),
        ..Default::default()
    };
    commands::export(people, xlsx.clone(), mapping, overrides, false).unwrap();

    let names = ExcelImporter::sheet_names(fs::File::open(&xlsx).unwrap()).unwrap();
    assert_eq!(names, vec!["Team".to_string()]);
}

#[test]
fn test_import_missing_sheet() {
    let dir = TempDir::new().unwrap();
    let mapping = write(dir.path(), "staff.yaml", MAPPING);
    let people = write(dir.path(), "people.yaml", PEOPLE);
    let xlsx = dir.path().join("people.xlsx");
    let out = dir.path().join("out.yaml");

    commands::export(
        people,
        xlsx.clone(),
        mapping.clone(),
        MappingOverrides::default(),
        false,
    )
    .unwrap();

    let overrides = MappingOverrides {
        sheet: Some("Nope".to_string()),
        ..Default::default()
    };
    let result = commands::import(xlsx, out.clone(), mapping, overrides, false);
    assert!(result.is_err());
    assert!(!out.exists());
}

#[test]
fn test_export_missing_records_file() {
    let dir = TempDir::new().unwrap();
    let mapping = write(dir.path(), "staff.yaml", MAPPING);

    let result = commands::export(
        dir.path().join("missing.yaml"),
        dir.path().join("out.xlsx"),
        mapping,
        MappingOverrides::default(),
        false,
    );
    assert!(result.is_err());
}

#[test]
fn test_inspect() {
    let dir = TempDir::new().unwrap();
    let mapping = write(dir.path(), "staff.yaml", MAPPING);
    let people = write(dir.path(), "people.yaml", PEOPLE);
    let xlsx = dir.path().join("people.xlsx");

    commands::export(
        people,
        xlsx.clone(),
        mapping,
        MappingOverrides::default(),
        false,
    )
    .unwrap();

    assert!(commands::inspect(xlsx.clone(), None).is_ok());
    assert!(commands::inspect(xlsx.clone(), Some("Staff".to_string())).is_ok());
    assert!(commands::inspect(xlsx, Some("Other".to_string())).is_err());
}

// ═══════════════════════════════════════════════════════════════════════════
// BINARY
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    sheetmap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_cli_version() {
    sheetmap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheetmap"));
}

#[test]
fn test_cli_round_trip() {
    let dir = TempDir::new().unwrap();
    let mapping = write(dir.path(), "staff.yaml", MAPPING);
    let people = write(dir.path(), "people.yaml", PEOPLE);
    let xlsx = dir.path().join("people.xlsx");
    let back = dir.path().join("back.yaml");

    sheetmap()
        .arg("export")
        .arg(&people)
        .arg(&xlsx)
        .arg("--mapping")
        .arg(&mapping)
        .assert()
        .success()
        .stdout(predicate::str::contains("Export Complete"));

    sheetmap()
        .arg("inspect")
        .arg(&xlsx)
        .arg("--sheet")
        .arg("Staff")
        .assert()
        .success()
        .stdout(predicate::str::contains("One person per row"))
        .stdout(predicate::str::contains("Ann | 30"));

    sheetmap()
        .arg("import")
        .arg(&xlsx)
        .arg(&back)
        .arg("--mapping")
        .arg(&mapping)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 records"));

    assert_eq!(parse_records(&back).unwrap().len(), 2);
}

#[test]
fn test_cli_missing_sheet_fails() {
    let dir = TempDir::new().unwrap();
    let mapping = write(dir.path(), "staff.yaml", MAPPING);
    let people = write(dir.path(), "people.yaml", PEOPLE);
    let xlsx = dir.path().join("people.xlsx");

    sheetmap()
        .args(["export"])
        .arg(&people)
        .arg(&xlsx)
        .arg("-m")
        .arg(&mapping)
        .assert()
        .success();

    sheetmap()
        .arg("import")
        .arg(&xlsx)
        .arg(dir.path().join("out.yaml"))
        .arg("-m")
        .arg(&mapping)
        .arg("--sheet")
        .arg("Ghost")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Ghost"));
}

#[test]
fn test_cli_bad_mapping_fails() {
    let dir = TempDir::new().unwrap();
    let mapping = write(dir.path(), "bad.yaml", "sheet: Staff\ncolumns: {}\n");
    let people = write(dir.path(), "people.yaml", PEOPLE);

    sheetmap()
        .arg("export")
        .arg(&people)
        .arg(dir.path().join("out.xlsx"))
        .arg("--mapping")
        .arg(&mapping)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one column"));
}
