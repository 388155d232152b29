use crate::error::SheetResult;
use crate::excel::{ExcelImporter, HeaderRow};
use crate::parser::{self, MappingConfig};
use crate::report::Issue;
use crate::types::{ColumnMapping, Record};
use crate::writer;
use colored::Colorize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Command-line values that take precedence over the mapping file
#[derive(Debug, Clone, Default)]
pub struct MappingOverrides {
    pub sheet: Option<String>,
    pub instruction: Vec<String>,
    pub header_row: Option<usize>,
}

impl MappingOverrides {
    pub fn apply(&self, config: &mut MappingConfig) {
        if let Some(sheet) = &self.sheet {
            config.sheet = sheet.clone();
        }
        if !self.instruction.is_empty() {
            config.instruction = self.instruction.clone();
        }
        if let Some(row) = self.header_row {
            config.header_row = HeaderRow::Index(row);
        }
    }
}

fn load_config(mapping: &Path, overrides: &MappingOverrides) -> SheetResult<MappingConfig> {
    let mut config = parser::parse_config(mapping)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Mapped fields that none of the records carry, usually a typo in the mapping file.
fn fields_missing_from_records<'a>(columns: &'a ColumnMapping, records: &[Record]) -> Vec<&'a str> {
    if records.is_empty() {
        return Vec::new();
    }
    columns
        .fields()
        .filter(|field| records.iter().all(|record| record.get(field).is_none()))
        .collect()
}

fn print_issues(issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }
    println!(
        "{}",
        format!("⚠️  {} issue(s) reported:", issues.len()).yellow().bold()
    );
    for issue in issues {
        println!("   {}", issue.to_string().yellow());
    }
    println!();
}

/// Execute the export command
pub fn export(
    input: PathBuf,
    output: PathBuf,
    mapping: PathBuf,
    overrides: MappingOverrides,
    verbose: bool,
) -> SheetResult<()> {
    println!("{}", "📊 Sheetmap - Excel Export".bold().green());
    println!("   Input:   {}", input.display());
    println!("   Mapping: {}", mapping.display());
    println!("   Output:  {}\n", output.display());

    let config = load_config(&mapping, &overrides)?;
    let records = parser::parse_records(&input)?;

    if verbose {
        println!(
            "   Sheet '{}', {} columns, {} records\n",
            config.sheet.bright_blue(),
            config.columns.len(),
            records.len()
        );
    }

    for field in fields_missing_from_records(&config.columns, &records) {
        warn!(field, "No record has this mapped field; its column will be empty");
    }

    let exported = config.exporter().export_to_bytes(&records)?;
    print_issues(&exported.report.issues);

    fs::write(&output, &exported.bytes)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!(
        "   {} rows written to {}\n",
        exported.report.rows_written,
        output.display()
    );

    Ok(())
}

/// Execute the import command
pub fn import(
    input: PathBuf,
    output: PathBuf,
    mapping: PathBuf,
    overrides: MappingOverrides,
    verbose: bool,
) -> SheetResult<()> {
    println!("{}", "📊 Sheetmap - Excel Import".bold().green());
    println!("   Input:   {}", input.display());
    println!("   Mapping: {}", mapping.display());
    println!("   Output:  {}\n", output.display());

    let config = load_config(&mapping, &overrides)?;
    let importer = config.importer();

    let file = File::open(&input)?;
    let grid = importer.read_grid(BufReader::new(file))?;

    if verbose {
        match importer.locate_header(&grid) {
            Some(header) => {
                println!("   Header row: {}", header);
                for (column, binding) in importer.resolve_columns(&grid, header).iter().enumerate() {
                    match binding {
                        Some(b) => println!(
                            "      column {}: {} → {}",
                            column,
                            b.label.bright_blue(),
                            b.field
                        ),
                        None => println!("      column {}: {}", column, "(ignored)".dimmed()),
                    }
                }
            }
            None => println!("   {}", "No header row found".yellow()),
        }
        println!();
    }

    let imported = importer.decode(&grid, || Ok::<_, std::convert::Infallible>(Record::new()));
    print_issues(&imported.issues);

    writer::write_records(&output, &imported.records)?;

    println!("{}", "✅ Import Complete!".bold().green());
    println!(
        "   {} records written to {}\n",
        imported.records.len(),
        output.display()
    );

    Ok(())
}

/// Execute the inspect command
pub fn inspect(input: PathBuf, sheet: Option<String>) -> SheetResult<()> {
    let Some(sheet) = sheet else {
        let names = ExcelImporter::sheet_names(BufReader::new(File::open(&input)?))?;
        println!("{}", format!("📄 {}", input.display()).bold());
        for name in names {
            println!("   {}", name.bright_blue());
        }
        return Ok(());
    };

    let importer = ExcelImporter::new(sheet.clone(), ColumnMapping::new());
    let grid = importer.read_grid(BufReader::new(File::open(&input)?))?;

    println!(
        "{}",
        format!("📄 {} / {} ({} rows)", input.display(), sheet, grid.height()).bold()
    );
    for (row, cells) in grid.rows().enumerate() {
        let rendered: Vec<String> = cells
            .iter()
            .map(|cell| cell.clone().unwrap_or_default())
            .collect();
        println!("   {:>4}  {}", row.to_string().dimmed(), rendered.join(" | "));
    }

    Ok(())
}
