use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sheetmap::cli::{self, MappingOverrides};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetmap")]
#[command(about = "Map records to spreadsheet rows and back.")]
#[command(long_about = "Sheetmap - records ↔ Excel via a column mapping

A mapping file ties each column label to a record field. Export writes an
optional instruction row, a label row, then one row per record. Import finds
the label row, matches columns by their header text and rebuilds records.

COMMANDS:
  export   - Records (YAML/JSON) to Excel (.xlsx)
  import   - Excel (.xlsx) to records (YAML/JSON)
  inspect  - List sheets or dump a sheet's cells

MAPPING FILE:
  sheet: Staff
  instruction:
    - \"One person per row\"
  columns:
    Name: name
    Age: age

EXAMPLES:
  sheetmap export people.yaml people.xlsx --mapping staff.yaml
  sheetmap import people.xlsx people.json --mapping staff.yaml
  sheetmap inspect people.xlsx --sheet Staff")]
#[command(version)]
struct Cli {
    /// Log filter (overrides RUST_LOG), e.g. "sheetmap=debug"
    #[arg(long, global = true, env = "SHEETMAP_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct MappingArgs {
    /// Mapping file (YAML or JSON)
    #[arg(short, long)]
    mapping: PathBuf,

    /// Sheet name (overrides the mapping file)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export records to an Excel .xlsx sheet
    Export {
        /// Records file: a YAML or JSON list of flat maps
        input: PathBuf,

        /// Output Excel file path (.xlsx)
        output: PathBuf,

        #[command(flatten)]
        mapping: MappingArgs,

        /// Instruction row cell (repeat for several cells; overrides the mapping file)
        #[arg(short, long)]
        instruction: Vec<String>,
    },

    /// Import records from an Excel .xlsx sheet
    Import {
        /// Path to Excel file (.xlsx)
        input: PathBuf,

        /// Output records file (.yaml or .json)
        output: PathBuf,

        #[command(flatten)]
        mapping: MappingArgs,

        /// 0-based row holding the column labels (default: detect)
        #[arg(long)]
        header_row: Option<usize>,
    },

    /// List the sheets of a workbook, or print one sheet's cells
    Inspect {
        /// Path to Excel file (.xlsx)
        input: PathBuf,

        /// Sheet to print
        #[arg(short, long)]
        sheet: Option<String>,
    },
}

fn init_tracing(filter: Option<&str>, verbose: bool) {
    let default = if verbose { "sheetmap=info" } else { "sheetmap=warn" };
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Export { mapping, .. } | Commands::Import { mapping, .. } => mapping.verbose,
        Commands::Inspect { .. } => false,
    };
    init_tracing(cli.log.as_deref(), verbose);

    match cli.command {
        Commands::Export {
            input,
            output,
            mapping,
            instruction,
        } => {
            let overrides = MappingOverrides {
                sheet: mapping.sheet,
                instruction,
                header_row: None,
            };
            cli::export(
                input.clone(),
                output,
                mapping.mapping,
                overrides,
                mapping.verbose,
            )
            .with_context(|| format!("Export of {} failed", input.display()))
        }

        Commands::Import {
            input,
            output,
            mapping,
            header_row,
        } => {
            let overrides = MappingOverrides {
                sheet: mapping.sheet,
                instruction: Vec::new(),
                header_row,
            };
            cli::import(
                input.clone(),
                output,
                mapping.mapping,
                overrides,
                mapping.verbose,
            )
            .with_context(|| format!("Import of {} failed", input.display()))
        }

        Commands::Inspect { input, sheet } => cli::inspect(input.clone(), sheet)
            .with_context(|| format!("Could not inspect {}", input.display())),
    }
}
