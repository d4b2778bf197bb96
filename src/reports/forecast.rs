//! Forecast Report
//!
//! Projected trip cost by line item, compared with the trip budget.

use std::io::Write;

use serde::Serialize;

use crate::error::LedgerResult;
use crate::ledger::Forecast;
use crate::models::{BudgetLineItem, Money, TripId};
use crate::services::LedgerService;
use crate::storage::Storage;

use super::csv_error;

#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub trip_name: String,
    pub forecast: Forecast,
    pub budget_per_person: Money,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    category: &'a str,
    basis: &'a str,
    per_person: String,
    group: String,
}

impl ForecastReport {
    pub fn generate(
        storage: &Storage,
        trip_id: TripId,
        items: &[BudgetLineItem],
        daily_rate: Money,
        days: Option<i64>,
    ) -> LedgerResult<Self> {
        let service = LedgerService::new(storage);
        let trip = service.snapshot(trip_id)?.trip;
        let forecast = service.forecast(trip_id, items, daily_rate, days)?;

        Ok(Self {
            trip_name: trip.name,
            forecast,
            budget_per_person: trip.budget_per_person,
        })
    }

    /// Budget left per person after the projected cost (negative when short)
    pub fn headroom_per_person(&self) -> Money {
        self.budget_per_person - self.forecast.per_person_total
    }

    pub fn format_terminal(&self, currency: &str) -> String {
        let fmt = |m: Money| m.format_with_symbol(currency);
        let params = &self.forecast.params;
        let mut output = String::new();

        output.push_str(&format!("Forecast: {}\n", self.trip_name));
        output.push_str(&"=".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{} travelers, {} days, daily rate {}\n\n",
            params.group_size,
            params.days,
            fmt(params.daily_rate)
        ));
        output.push_str(&format!(
            "{:<24} {:<20} {:>12} {:>12}\n",
            "Item", "Basis", "Per person", "Group"
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');
        for line in &self.forecast.lines {
            output.push_str(&format!(
                "{:<24} {:<20} {:>12} {:>12}\n",
                line.category,
                line.basis,
                fmt(line.per_person),
                fmt(line.group)
            ));
        }
        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{:<45} {:>12} {:>12}\n",
            "TOTAL",
            fmt(self.forecast.per_person_total),
            fmt(self.forecast.group_total)
        ));

        if self.budget_per_person.is_positive() {
            let headroom = self.headroom_per_person();
            let verdict = if headroom.is_negative() {
                "over budget"
            } else {
                "within budget"
            };
            output.push_str(&format!(
                "\nBudget per person {}: {} {} ({})\n",
                fmt(self.budget_per_person),
                fmt(headroom.abs()),
                if headroom.is_negative() { "short" } else { "to spare" },
                verdict
            ));
        }

        output
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> LedgerResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for line in &self.forecast.lines {
            csv.serialize(CsvRow {
                category: &line.category,
                basis: line.basis,
                per_person: line.per_person.to_decimal_string(),
                group: line.group.to_decimal_string(),
            })
            .map_err(csv_error)?;
        }
        csv.serialize(CsvRow {
            category: "TOTAL",
            basis: "",
            per_person: self.forecast.per_person_total.to_decimal_string(),
            group: self.forecast.group_total.to_decimal_string(),
        })
        .map_err(csv_error)?;
        csv.flush().map_err(csv_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{default_line_items, CostBasis, Traveler, Trip};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup(budget_units: i64) -> (TempDir, Storage, Trip) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(LedgerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let mut trip = Trip::new(
            "Japan",
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
        );
        trip.budget_per_person = Money::from_units(budget_units);
        for name in ["A", "B", "C"] {
            trip.add_traveler(Traveler::new(name, "#9E9E9E"));
        }
        storage.trips.upsert(trip.clone()).unwrap();
        (temp_dir, storage, trip)
    }

    #[test]
    fn test_default_items_against_budget() {
        let (_temp_dir, storage, trip) = setup(5_000);
        let report = ForecastReport::generate(
            &storage,
            trip.id,
            &default_line_items(),
            Money::from_units(150),
            None,
        )
        .unwrap();

        assert_eq!(report.forecast.per_person_total, Money::from_units(5_490));
        assert_eq!(report.headroom_per_person(), Money::from_units(-490));

        let text = report.format_terminal("$");
        assert!(text.contains("3 travelers, 15 days, daily rate $150.00"));
        assert!(text.contains("$490.00 short (over budget)"));
    }

    #[test]
    fn test_export_csv() {
        let (_temp_dir, storage, trip) = setup(0);
        let items = vec![BudgetLineItem::new("Daily", CostBasis::PerPersonPerDay(None))];
        let report =
            ForecastReport::generate(&storage, trip.id, &items, Money::from_units(200), Some(2))
                .unwrap();

        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "category,basis,per_person,group");
        assert_eq!(lines[2], "TOTAL,,400.00,1200.00");
        assert!(!report.format_terminal("$").contains("Budget per person"));
    }
}
