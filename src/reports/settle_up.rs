//! Settle-up Report
//!
//! Who paid what, who consumed what, and the transfers that square the
//! group. The raw paid/owed columns are shown next to the transfers so the
//! totals can be checked by hand.

use std::io::Write;

use serde::Serialize;

use crate::error::LedgerResult;
use crate::ledger::resolve_balances;
use crate::models::{Money, TripId};
use crate::services::LedgerService;
use crate::storage::Storage;

use super::csv_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow {
    pub traveler: String,
    pub paid: Money,
    pub owed: Money,
    /// Positive: the group owes them
    pub net: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRow {
    pub from: String,
    pub to: String,
    #[serde(serialize_with = "decimal")]
    pub amount: Money,
}

#[derive(Debug, Clone)]
pub struct SettleUpReport {
    pub trip_name: String,
    /// Roster order
    pub balances: Vec<BalanceRow>,
    pub transfers: Vec<TransferRow>,
}

fn decimal<S: serde::Serializer>(amount: &Money, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&amount.to_decimal_string())
}

impl SettleUpReport {
    pub fn generate(storage: &Storage, trip_id: TripId) -> LedgerResult<Self> {
        let snapshot = LedgerService::new(storage).snapshot(trip_id)?;
        let trip = &snapshot.trip;
        let settlement = resolve_balances(&snapshot.expenses, &trip.roster())?;

        let balances = settlement
            .balances
            .iter()
            .map(|b| BalanceRow {
                traveler: trip.traveler_name(b.traveler_id),
                paid: b.paid,
                owed: b.owed,
                net: b.net,
            })
            .collect();
        let transfers = settlement
            .transfers
            .iter()
            .map(|t| TransferRow {
                from: trip.traveler_name(t.from),
                to: trip.traveler_name(t.to),
                amount: t.amount,
            })
            .collect();

        Ok(Self {
            trip_name: trip.name.clone(),
            balances,
            transfers,
        })
    }

    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();
        let fmt = |m: Money| m.format_with_symbol(currency);

        output.push_str(&format!("Settle Up: {}\n", self.trip_name));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>12} {:>12} {:>12}\n",
            "Traveler", "Paid", "Share", "Net"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for row in &self.balances {
            let net = if row.net.is_positive() {
                format!("+{}", fmt(row.net))
            } else {
                fmt(row.net)
            };
            output.push_str(&format!(
                "{:<20} {:>12} {:>12} {:>12}\n",
                row.traveler,
                fmt(row.paid),
                fmt(row.owed),
                net
            ));
        }

        output.push('\n');
        if self.is_settled() {
            output.push_str("Everyone is settled up.\n");
        } else {
            output.push_str("Transfers:\n");
            for t in &self.transfers {
                output.push_str(&format!("  {} pays {} {}\n", t.from, t.to, fmt(t.amount)));
            }
        }

        output
    }

    /// Export the transfers as `from,to,amount` rows
    pub fn export_csv<W: Write>(&self, writer: W) -> LedgerResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        if self.transfers.is_empty() {
            csv.write_record(["from", "to", "amount"]).map_err(csv_error)?;
        }
        for transfer in &self.transfers {
            csv.serialize(transfer).map_err(csv_error)?;
        }
        csv.flush().map_err(csv_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::ledger::SplitMode;
    use crate::models::{ExpenseCategory, ExpenseKind, Traveler, Trip};
    use crate::services::{CreateExpenseInput, ExpenseService};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup(with_dinner: bool) -> (TempDir, Storage, Trip) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(LedgerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let mut trip = Trip::new("Italy", day, day);
        for name in ["A", "B", "C"] {
            trip.add_traveler(Traveler::new(name, "#9E9E9E"));
        }
        storage.trips.upsert(trip.clone()).unwrap();

        if with_dinner {
            ExpenseService::new(&storage)
                .create(
                    trip.id,
                    CreateExpenseInput {
                        description: "Dinner".into(),
                        amount: Money::from_units(90),
                        kind: ExpenseKind::Charge,
                        category: ExpenseCategory::Food,
                        paid_by: trip.travelers[0].id,
                        date: day,
                        stop_id: None,
                        notes: String::new(),
                        split: SplitMode::Equal,
                        participants: None,
                    },
                )
                .unwrap();
        }
        (temp_dir, storage, trip)
    }

    #[test]
    fn test_three_way_dinner() {
        let (_temp_dir, storage, trip) = setup(true);
        let report = SettleUpReport::generate(&storage, trip.id).unwrap();

        let nets: Vec<_> = report.balances.iter().map(|b| b.net.cents()).collect();
        assert_eq!(nets, [6_000, -3_000, -3_000]);
        assert_eq!(
            report.transfers,
            vec![
                TransferRow {
                    from: "B".into(),
                    to: "A".into(),
                    amount: Money::from_units(30)
                },
                TransferRow {
                    from: "C".into(),
                    to: "A".into(),
                    amount: Money::from_units(30)
                },
            ]
        );

        let text = report.format_terminal("$");
        assert!(text.contains("B pays A $30.00"));
        assert!(text.contains("+$60.00"));
    }

    #[test]
    fn test_export_csv() {
        let (_temp_dir, storage, trip) = setup(true);
        let report = SettleUpReport::generate(&storage, trip.id).unwrap();

        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "from,to,amount\nB,A,30.00\nC,A,30.00\n"
        );
    }

    #[test]
    fn test_nothing_to_settle() {
        let (_temp_dir, storage, trip) = setup(false);
        let report = SettleUpReport::generate(&storage, trip.id).unwrap();

        assert!(report.is_settled());
        assert!(report.format_terminal("$").contains("Everyone is settled up."));

        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "from,to,amount\n");
    }
}
