//! CLI command handlers
//!
//! Bridges the clap argument parsing with the service layer. Every command
//! that works on a trip receives it explicitly, from `--trip` or the
//! `TRIP_LEDGER_TRIP` environment variable.

pub mod audit;
pub mod expense;
pub mod export;
pub mod forecast;
pub mod report;
pub mod stop;
pub mod traveler;
pub mod trip;

pub use audit::handle_audit_command;
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use forecast::{handle_forecast_command, ForecastArgs};
pub use report::{handle_report_command, ReportCommands};
pub use stop::{handle_stop_command, StopCommands};
pub use traveler::{handle_traveler_command, TravelerCommands};
pub use trip::{handle_trip_command, TripCommands};

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use clap::Args;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{LedgerFilter, StopKey};
use crate::models::{ExpenseCategory, Money, Trip, TripId};
use crate::services::{StopService, TripService};
use crate::storage::Storage;

/// Expense filters shared by listing and reports
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Only expenses on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Only expenses on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
    /// Only expenses tagged with this stop
    #[arg(long, conflicts_with = "unassigned")]
    pub stop: Option<String>,
    /// Only expenses without a stop
    #[arg(long)]
    pub unassigned: bool,
    /// Only this category (food, transport, lodging, activities, shopping, other)
    #[arg(short, long)]
    pub category: Option<String>,
}

impl FilterArgs {
    pub(crate) fn to_filter(&self, storage: &Storage, trip_id: TripId) -> LedgerResult<LedgerFilter> {
        let start = parse_optional_date(self.from.as_deref())?;
        let end = parse_optional_date(self.to.as_deref())?;
        let mut filter = match (start, end) {
            (Some(start), Some(end)) if end < start => {
                return Err(LedgerError::invalid(format!(
                    "--to ({}) is before --from ({})",
                    end, start
                )))
            }
            (Some(start), Some(end)) => LedgerFilter::new().date_range(start, end),
            (Some(start), None) => LedgerFilter::new().from_date(start),
            (None, Some(end)) => LedgerFilter::new().until(end),
            (None, None) => LedgerFilter::new(),
        };
        if let Some(stop) = &self.stop {
            let stop = StopService::new(storage).resolve(trip_id, stop)?;
            filter = filter.stop(StopKey::Stop(stop.id));
        } else if self.unassigned {
            filter = filter.stop(StopKey::Unassigned);
        }
        if let Some(category) = &self.category {
            filter = filter.category(parse_category(category)?);
        }
        Ok(filter)
    }
}

pub(crate) fn parse_category(input: &str) -> LedgerResult<ExpenseCategory> {
    ExpenseCategory::parse(input).ok_or_else(|| {
        LedgerError::invalid(format!(
            "Unknown category '{}'. Valid categories: food, transport, lodging, activities, shopping, other",
            input
        ))
    })
}

/// Parse a user-entered amount such as "12.50" or "12"
pub(crate) fn parse_money(input: &str) -> LedgerResult<Money> {
    Money::parse(input).map_err(|e| {
        LedgerError::invalid(format!(
            "Invalid amount '{}': {}. Use a format like '12.50' or '12'",
            input, e
        ))
    })
}

/// Parse a YYYY-MM-DD date
pub(crate) fn parse_date(input: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::invalid(format!("Invalid date '{}'. Use YYYY-MM-DD", input))
    })
}

pub(crate) fn parse_optional_date(input: Option<&str>) -> LedgerResult<Option<NaiveDate>> {
    input.map(parse_date).transpose()
}

/// The trip a command works on.
///
/// With no `--trip`, a ledger holding exactly one trip uses that one.
pub(crate) fn resolve_trip(storage: &Storage, trip: Option<&str>) -> LedgerResult<Trip> {
    let service = TripService::new(storage);
    if let Some(identifier) = trip {
        return service.resolve(identifier);
    }

    let mut trips = service.list()?;
    match trips.len() {
        1 => Ok(trips.remove(0)),
        0 => Err(LedgerError::invalid(
            "No trips yet. Create one with 'trip trip create'",
        )),
        _ => Err(LedgerError::invalid(
            "Several trips exist; choose one with --trip NAME or TRIP_LEDGER_TRIP",
        )),
    }
}

/// Open the output target: a file when a path is given, stdout otherwise
pub(crate) fn open_output(path: Option<&Path>) -> LedgerResult<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                LedgerError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::services::CreateTripInput;
    use tempfile::TempDir;

    fn create(storage: &Storage, name: &str) {
        TripService::new(storage)
            .create(CreateTripInput {
                name: name.into(),
                start_date: parse_date("2025-04-01").unwrap(),
                end_date: parse_date("2025-04-10").unwrap(),
                budget_per_person: Money::zero(),
                travelers: vec!["Ana".into()],
            })
            .unwrap();
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_money("12.5").unwrap(), Money::from_cents(1_250));
        assert!(parse_money("twelve").unwrap_err().is_validation());
        assert_eq!(
            parse_date(" 2025-04-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
        assert!(parse_date("04/01/2025").is_err());
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(parse_category("Hotel").unwrap(), ExpenseCategory::Lodging);
        assert!(parse_category("rockets").is_err());
    }

    #[test]
    fn test_filter_args() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::open(LedgerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        create(&storage, "Italy");
        let trip = resolve_trip(&storage, None).unwrap();

        let args = FilterArgs {
            from: Some("2025-04-02".into()),
            unassigned: true,
            category: Some("food".into()),
            ..Default::default()
        };
        let filter = args.to_filter(&storage, trip.id).unwrap();
        assert_eq!(
            filter,
            LedgerFilter::new()
                .from_date(parse_date("2025-04-02").unwrap())
                .stop(StopKey::Unassigned)
                .category(ExpenseCategory::Food)
        );

        let both = FilterArgs {
            from: Some("2025-04-02".into()),
            to: Some("2025-04-05".into()),
            ..Default::default()
        };
        assert_eq!(
            both.to_filter(&storage, trip.id).unwrap(),
            LedgerFilter::new().date_range(
                parse_date("2025-04-02").unwrap(),
                parse_date("2025-04-05").unwrap()
            )
        );

        let inverted = FilterArgs {
            from: Some("2025-04-05".into()),
            to: Some("2025-04-02".into()),
            ..Default::default()
        };
        assert!(inverted.to_filter(&storage, trip.id).unwrap_err().is_validation());

        let missing_stop = FilterArgs {
            stop: Some("Nowhere".into()),
            ..Default::default()
        };
        assert!(missing_stop.to_filter(&storage, trip.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_resolve_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::open(LedgerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();

        assert!(resolve_trip(&storage, None).is_err());

        create(&storage, "Italy");
        assert_eq!(resolve_trip(&storage, None).unwrap().name, "Italy");

        create(&storage, "Japan");
        assert!(resolve_trip(&storage, None).is_err());
        assert_eq!(resolve_trip(&storage, Some("japan")).unwrap().name, "Japan");
        assert!(resolve_trip(&storage, Some("Peru")).unwrap_err().is_not_found());
    }
}
