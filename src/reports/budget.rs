//! Budget Report
//!
//! Actual spend against the group budget, with the spending pace.

use std::io::Write;

use chrono::NaiveDate;

use crate::error::LedgerResult;
use crate::ledger::{BudgetHealth, BudgetStatus, BurnRate};
use crate::models::{Money, TripId};
use crate::services::LedgerService;
use crate::storage::Storage;

use super::csv_error;

#[derive(Debug, Clone)]
pub struct BudgetReport {
    pub trip_name: String,
    pub group_size: usize,
    pub budget_per_person: Money,
    pub health: BudgetHealth,
    pub burn: Option<BurnRate>,
    pub as_of: NaiveDate,
}

impl BudgetReport {
    pub fn generate(
        storage: &Storage,
        trip_id: TripId,
        warning_bp: i64,
        as_of: NaiveDate,
    ) -> LedgerResult<Self> {
        let service = LedgerService::new(storage);
        let trip = service.snapshot(trip_id)?.trip;

        Ok(Self {
            trip_name: trip.name.clone(),
            group_size: trip.group_size(),
            budget_per_person: trip.budget_per_person,
            health: service.health(trip_id, warning_bp)?,
            burn: service.burn(trip_id, as_of)?,
            as_of,
        })
    }

    pub fn format_terminal(&self, currency: &str) -> String {
        let fmt = |m: Money| m.format_with_symbol(currency);
        let mut output = String::new();

        output.push_str(&format!("Budget: {}\n", self.trip_name));
        output.push_str(&"=".repeat(50));
        output.push('\n');
        output.push_str(&format!(
            "{:<22} {:>14}\n",
            "Per person",
            fmt(self.budget_per_person)
        ));
        output.push_str(&format!(
            "{:<22} {:>14}\n",
            format!("Group ({} travelers)", self.group_size),
            fmt(self.health.budget)
        ));
        output.push_str(&format!("{:<22} {:>14}\n", "Spent", fmt(self.health.spent)));
        output.push_str(&format!(
            "{:<22} {:>14}\n",
            "Remaining",
            fmt(self.health.remaining)
        ));
        output.push_str(&format!(
            "{:<22} {:>14}\n",
            "Used",
            self.health.percent_label()
        ));

        let marker = match self.health.status {
            BudgetStatus::OnTrack => "✓",
            BudgetStatus::Warning => "!",
            BudgetStatus::Over => "✗",
        };
        output.push_str(&format!("\nStatus: {} {}\n", marker, self.health.status));

        match &self.burn {
            Some(burn) => {
                output.push_str(&format!(
                    "\nAs of {} (day {} of {}):\n",
                    self.as_of, burn.days_elapsed, burn.total_days
                ));
                output.push_str(&format!("  Average per day: {}\n", fmt(burn.average_daily)));
                output.push_str(&format!(
                    "  Projected total: {}\n",
                    fmt(burn.projected_total)
                ));
            }
            None => output.push_str("\nTrip has not started yet.\n"),
        }

        output
    }

    /// Export as a two-column `metric,value` CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> LedgerResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let mut rows = vec![
            ("budget_per_person", self.budget_per_person.to_decimal_string()),
            ("group_budget", self.health.budget.to_decimal_string()),
            ("spent", self.health.spent.to_decimal_string()),
            ("remaining", self.health.remaining.to_decimal_string()),
            ("used", self.health.percent_label()),
            ("status", self.health.status.to_string()),
        ];
        if let Some(burn) = &self.burn {
            rows.push(("average_daily", burn.average_daily.to_decimal_string()));
            rows.push(("projected_total", burn.projected_total.to_decimal_string()));
        }

        csv.write_record(["metric", "value"]).map_err(csv_error)?;
        for (metric, value) in rows {
            csv.write_record([metric, value.as_str()]).map_err(csv_error)?;
        }
        csv.flush().map_err(csv_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::ledger::{SplitMode, DEFAULT_WARNING_BP};
    use crate::models::{ExpenseCategory, ExpenseKind, Traveler, Trip};
    use crate::services::{CreateExpenseInput, ExpenseService};
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn setup(spent_units: i64) -> (TempDir, Storage, Trip) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(LedgerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let mut trip = Trip::new("Italy", date(1), date(10));
        trip.budget_per_person = Money::from_units(500);
        trip.add_traveler(Traveler::new("Ana", "#E91E63"));
        trip.add_traveler(Traveler::new("Ben", "#2196F3"));
        storage.trips.upsert(trip.clone()).unwrap();

        ExpenseService::new(&storage)
            .create(
                trip.id,
                CreateExpenseInput {
                    description: "Hotel".into(),
                    amount: Money::from_units(spent_units),
                    kind: ExpenseKind::Charge,
                    category: ExpenseCategory::Lodging,
                    paid_by: trip.travelers[0].id,
                    date: date(1),
                    stop_id: None,
                    notes: String::new(),
                    split: SplitMode::Equal,
                    participants: None,
                },
            )
            .unwrap();
        (temp_dir, storage, trip)
    }

    #[test]
    fn test_warning_with_pace() {
        let (_temp_dir, storage, trip) = setup(850);
        let report = BudgetReport::generate(&storage, trip.id, DEFAULT_WARNING_BP, date(5)).unwrap();

        assert_eq!(report.health.budget, Money::from_units(1_000));
        assert_eq!(report.health.status, BudgetStatus::Warning);
        let burn = report.burn.unwrap();
        assert_eq!(burn.average_daily, Money::from_units(170));
        assert_eq!(burn.projected_total, Money::from_units(1_700));

        let text = report.format_terminal("$");
        assert!(text.contains("85.00%"));
        assert!(text.contains("Status: ! Warning"));
    }

    #[test]
    fn test_before_trip_and_csv() {
        let (_temp_dir, storage, trip) = setup(100);
        let report = BudgetReport::generate(&storage, trip.id, DEFAULT_WARNING_BP, date(1).pred_opt().unwrap()).unwrap();
        assert!(report.burn.is_none());
        assert!(report.format_terminal("$").contains("Trip has not started yet."));

        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("metric,value\n"));
        assert!(text.contains("status,On track\n"));
        assert!(!text.contains("projected_total"));
    }
}
