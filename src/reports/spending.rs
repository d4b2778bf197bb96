//! Spending Report
//!
//! Where the money went: by payer, by stop, by category and by day.

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::LedgerResult;
use crate::ledger::{aggregate, Bucket, LedgerFilter, StopKey};
use crate::models::Money;
use crate::services::LedgerService;
use crate::storage::Storage;

use super::{csv_error, percent_label};

/// One labelled bucket of spend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendingRow {
    pub label: String,
    pub amount: Money,
    pub count: usize,
    /// Share of total spend in basis points
    pub share_bp: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct SpendingReport {
    pub trip_name: String,
    pub filter: LedgerFilter,
    pub total_spent: Money,
    pub expense_count: usize,
    pub average_per_day: Option<Money>,
    /// What each traveler paid out
    pub by_traveler: Vec<SpendingRow>,
    /// What each traveler consumed (sum of their shares)
    pub owed_by_traveler: Vec<SpendingRow>,
    pub by_stop: Vec<SpendingRow>,
    pub by_category: Vec<SpendingRow>,
    /// Chronological
    pub by_day: Vec<(NaiveDate, Money)>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    dimension: &'static str,
    label: &'a str,
    amount: String,
    count: usize,
    share: String,
}

impl SpendingReport {
    pub fn generate(
        storage: &Storage,
        trip_id: crate::models::TripId,
        filter: &LedgerFilter,
    ) -> LedgerResult<Self> {
        let snapshot = LedgerService::new(storage).snapshot(trip_id)?;
        let stops = storage.stops.get_by_trip(trip_id)?;
        let view = aggregate(&snapshot.expenses, filter);
        let trip = &snapshot.trip;

        let rows = |buckets: Vec<Bucket<String>>| -> Vec<SpendingRow> {
            buckets
                .into_iter()
                .map(|b| SpendingRow {
                    share_bp: view.share_bp(b.amount),
                    label: b.key,
                    amount: b.amount,
                    count: b.count,
                })
                .collect()
        };
        let named = |buckets: &[Bucket<crate::models::TravelerId>]| {
            buckets
                .iter()
                .map(|b| relabel(b, trip.traveler_name(b.key)))
                .collect::<Vec<_>>()
        };

        let by_traveler = rows(named(&view.spent_by_traveler));
        let owed_by_traveler = rows(named(&view.owed_by_traveler));
        let by_stop = rows(
            view.spent_by_stop
                .iter()
                .map(|b| {
                    let label = match b.key {
                        StopKey::Stop(id) => stops
                            .iter()
                            .find(|s| s.id == id)
                            .map(|s| s.name.clone())
                            .unwrap_or_else(|| id.to_string()),
                        StopKey::Unassigned => "Unassigned".to_string(),
                    };
                    relabel(b, label)
                })
                .collect(),
        );
        let by_category = rows(
            view.spent_by_category
                .iter()
                .map(|b| relabel(b, b.key.to_string()))
                .collect(),
        );
        let by_day = view.daily_trend.iter().map(|b| (b.key, b.amount)).collect();

        Ok(Self {
            trip_name: trip.name.clone(),
            filter: filter.clone(),
            total_spent: view.total_spent,
            expense_count: view.expense_count,
            average_per_day: view.average_per_day(),
            by_traveler,
            owed_by_traveler,
            by_stop,
            by_category,
            by_day,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Spending Report: {}\n", self.trip_name));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        if let Some(scope) = self.scope_label() {
            output.push_str(&format!("Filter: {}\n", scope));
        }
        output.push_str(&format!(
            "Total Spent: {}\n",
            self.total_spent.format_with_symbol(currency)
        ));
        output.push_str(&format!("Expenses: {}\n", self.expense_count));
        if let Some(avg) = self.average_per_day {
            output.push_str(&format!("Average per day: {}\n", avg.format_with_symbol(currency)));
        }

        if self.expense_count == 0 {
            output.push_str("\nNo expenses recorded.\n");
            return output;
        }

        let sections = [
            ("PAID BY", &self.by_traveler),
            ("CONSUMED BY", &self.owed_by_traveler),
            ("BY STOP", &self.by_stop),
            ("BY CATEGORY", &self.by_category),
        ];
        for (title, rows) in sections {
            output.push_str(&format!("\n{}\n", title));
            output.push_str(&"-".repeat(60));
            output.push('\n');
            for row in rows {
                output.push_str(&format!(
                    "  {:<28} {:>12} {:>6} {:>8}\n",
                    row.label,
                    row.amount.format_with_symbol(currency),
                    row.count,
                    percent_label(row.share_bp)
                ));
            }
        }

        output.push_str("\nDAILY TREND\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for (date, amount) in &self.by_day {
            output.push_str(&format!(
                "  {:<28} {:>12}\n",
                date.format("%a %Y-%m-%d").to_string(),
                amount.format_with_symbol(currency)
            ));
        }

        output
    }

    /// Export every dimension as `dimension,label,amount,count,share` rows
    pub fn export_csv<W: Write>(&self, writer: W) -> LedgerResult<()> {
        let mut csv = csv::Writer::from_writer(writer);

        let sections = [
            ("paid_by", &self.by_traveler),
            ("consumed_by", &self.owed_by_traveler),
            ("stop", &self.by_stop),
            ("category", &self.by_category),
        ];
        for (dimension, rows) in sections {
            for row in rows {
                csv.serialize(CsvRow {
                    dimension,
                    label: &row.label,
                    amount: row.amount.to_decimal_string(),
                    count: row.count,
                    share: percent_label(row.share_bp),
                })
                .map_err(csv_error)?;
            }
        }
        for (date, amount) in &self.by_day {
            let label = date.to_string();
            csv.serialize(CsvRow {
                dimension: "day",
                label: &label,
                amount: amount.to_decimal_string(),
                count: 0,
                share: String::new(),
            })
            .map_err(csv_error)?;
        }
        csv.serialize(CsvRow {
            dimension: "total",
            label: "",
            amount: self.total_spent.to_decimal_string(),
            count: self.expense_count,
            share: "100.0%".to_string(),
        })
        .map_err(csv_error)?;

        csv.flush().map_err(csv_error)?;
        Ok(())
    }

    fn scope_label(&self) -> Option<String> {
        if self.filter.is_empty() {
            return None;
        }
        let mut parts = Vec::new();
        match (self.filter.start, self.filter.end) {
            (Some(s), Some(e)) => parts.push(format!("{} to {}", s, e)),
            (Some(s), None) => parts.push(format!("from {}", s)),
            (None, Some(e)) => parts.push(format!("until {}", e)),
            (None, None) => {}
        }
        if let Some(category) = self.filter.category {
            parts.push(format!("category {}", category));
        }
        if self.filter.stop.is_some() {
            // A stop filter leaves at most one stop row to name it by
            let stop = self
                .by_stop
                .first()
                .map(|row| row.label.as_str())
                .unwrap_or("selected stop");
            parts.push(format!("stop {}", stop));
        }
        Some(parts.join(", "))
    }
}

fn relabel<K>(bucket: &Bucket<K>, label: String) -> Bucket<String> {
    Bucket {
        key: label,
        amount: bucket.amount,
        count: bucket.count,
    }
}
