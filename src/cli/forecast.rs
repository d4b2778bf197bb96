//! Forecast CLI command
//!
//! Line items come from a JSON or YAML file when `--items` is given and from
//! the built-in defaults otherwise. The daily rate is a per-run input.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::settings::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{default_line_items, BudgetLineItem};
use crate::reports::ForecastReport;
use crate::storage::Storage;

use super::report::{report_written, OutputArgs};
use super::{open_output, parse_money, resolve_trip};

#[derive(Args)]
pub struct ForecastArgs {
    /// Daily spending per person (defaults to the configured rate)
    #[arg(short = 'r', long)]
    pub daily_rate: Option<String>,
    /// Trip length in days (defaults to the trip's dates)
    #[arg(short, long)]
    pub days: Option<i64>,
    /// Line items file (.json, .yaml or .yml)
    #[arg(short, long)]
    pub items: Option<PathBuf>,
    #[command(flatten)]
    pub out: OutputArgs,
}

pub fn handle_forecast_command(
    storage: &Storage,
    settings: &Settings,
    trip: Option<&str>,
    args: ForecastArgs,
) -> LedgerResult<()> {
    let trip = resolve_trip(storage, trip)?;
    let daily_rate = match args.daily_rate.as_deref() {
        Some(rate) => parse_money(rate)?,
        None => settings.default_daily_rate,
    };
    let items = match &args.items {
        Some(path) => load_line_items(path)?,
        None => default_line_items(),
    };

    let report = ForecastReport::generate(storage, trip.id, &items, daily_rate, args.days)?;
    if args.out.wants_csv() {
        report.export_csv(open_output(args.out.output.as_deref())?)?;
        report_written(&args.out);
    } else {
        print!("{}", report.format_terminal(&settings.currency_symbol));
    }

    Ok(())
}

/// Read line items, picking the format from the file extension
pub(crate) fn load_line_items(path: &Path) -> LedgerResult<Vec<BudgetLineItem>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        LedgerError::Io(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let items: Vec<BudgetLineItem> = match extension.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&contents).map_err(|e| {
            LedgerError::invalid(format!("Invalid line items in {}: {}", path.display(), e))
        })?,
        _ => serde_json::from_str(&contents).map_err(|e| {
            LedgerError::invalid(format!("Invalid line items in {}: {}", path.display(), e))
        })?,
    };

    tracing::debug!(path = %path.display(), count = items.len(), "loaded line items");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostBasis, Money};
    use tempfile::TempDir;

    #[test]
    fn test_load_json_items() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("items.json");
        std::fs::write(
            &path,
            r#"[
                {"category": "Flights", "cost": {"basis": "per_person", "amount": 90000}},
                {"category": "Daily", "cost": {"basis": "per_person_per_day", "amount": null}}
            ]"#,
        )
        .unwrap();

        let items = load_line_items(&path).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].cost, CostBasis::PerPerson(Money::from_units(900)));
        assert!(items[1].uses_daily_rate());
    }

    #[test]
    fn test_load_yaml_items() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("items.yml");
        std::fs::write(
            &path,
            "- category: Villa\n  cost:\n    basis: shared_total\n    amount: 300000\n  notes: 5 nights\n",
        )
        .unwrap();

        let items = load_line_items(&path).unwrap();
        assert_eq!(items[0].cost, CostBasis::SharedTotal(Money::from_units(3_000)));
        assert_eq!(items[0].notes, "5 nights");
    }

    #[test]
    fn test_load_bad_items() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("items.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_line_items(&path).unwrap_err().is_validation());
        assert!(load_line_items(&temp_dir.path().join("missing.json")).is_err());
    }
}
