//! CLI commands for data export

use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;

use crate::error::LedgerResult;
use crate::export::{export_expenses_csv, export_trip_json, export_trip_yaml};
use crate::storage::Storage;

use super::{open_output, resolve_trip};

/// Export subcommands. Output goes to stdout unless a file is given.
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Full trip as JSON
    Json {
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Full trip as YAML
    Yaml {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Expenses with one row per share, as CSV
    Csv {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn handle_export_command(
    storage: &Storage,
    trip: Option<&str>,
    cmd: ExportCommands,
) -> LedgerResult<()> {
    let trip = resolve_trip(storage, trip)?;

    let output = match cmd {
        ExportCommands::Json { output, pretty } => {
            let mut writer = open_output(output.as_deref())?;
            export_trip_json(storage, trip.id, &mut writer, pretty)?;
            writer.flush()?;
            output
        }
        ExportCommands::Yaml { output } => {
            let mut writer = open_output(output.as_deref())?;
            export_trip_yaml(storage, trip.id, &mut writer)?;
            writer.flush()?;
            output
        }
        ExportCommands::Csv { output } => {
            let mut writer = open_output(output.as_deref())?;
            export_expenses_csv(storage, trip.id, &mut writer)?;
            writer.flush()?;
            output
        }
    };

    if let Some(path) = output {
        println!("Exported {} to: {}", trip.name, path.display());
    }
    Ok(())
}
