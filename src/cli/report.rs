//! CLI commands for reports
//!
//! Each report prints to the terminal by default; `--csv` writes CSV to
//! stdout and `--output` writes it to a file.

use std::path::PathBuf;

use chrono::Local;
use clap::{Args, Subcommand};

use crate::config::settings::Settings;
use crate::error::LedgerResult;
use crate::reports::{BudgetReport, SettleUpReport, SpendingReport};
use crate::storage::Storage;

use super::{open_output, parse_optional_date, resolve_trip, FilterArgs};

/// Where a report goes
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Write CSV to stdout instead of the terminal layout
    #[arg(long)]
    pub csv: bool,
    /// Write CSV to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl OutputArgs {
    pub(crate) fn wants_csv(&self) -> bool {
        self.csv || self.output.is_some()
    }
}

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Spending by traveler, stop, category and day
    Spending {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Net balances and the transfers that settle them
    #[command(alias = "settle")]
    SettleUp {
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Spend against the group budget
    Budget {
        /// Date to measure the pace at (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,
        #[command(flatten)]
        out: OutputArgs,
    },
}

pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    trip: Option<&str>,
    cmd: ReportCommands,
) -> LedgerResult<()> {
    let trip = resolve_trip(storage, trip)?;
    let currency = settings.currency_symbol.as_str();

    match cmd {
        ReportCommands::Spending { filter, out } => {
            let filter = filter.to_filter(storage, trip.id)?;
            let report = SpendingReport::generate(storage, trip.id, &filter)?;
            if out.wants_csv() {
                report.export_csv(open_output(out.output.as_deref())?)?;
                report_written(&out);
            } else {
                print!("{}", report.format_terminal(currency));
            }
        }

        ReportCommands::SettleUp { out } => {
            let report = SettleUpReport::generate(storage, trip.id)?;
            if out.wants_csv() {
                report.export_csv(open_output(out.output.as_deref())?)?;
                report_written(&out);
            } else {
                print!("{}", report.format_terminal(currency));
            }
        }

        ReportCommands::Budget { as_of, out } => {
            let as_of =
                parse_optional_date(as_of.as_deref())?.unwrap_or_else(|| Local::now().date_naive());
            let report = BudgetReport::generate(storage, trip.id, settings.warning_bp(), as_of)?;
            if out.wants_csv() {
                report.export_csv(open_output(out.output.as_deref())?)?;
                report_written(&out);
            } else {
                print!("{}", report.format_terminal(currency));
            }
        }
    }

    Ok(())
}

pub(crate) fn report_written(out: &OutputArgs) {
    if let Some(path) = &out.output {
        println!("Report exported to: {}", path.display());
    }
}
