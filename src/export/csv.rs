//! CSV export of a trip's expenses
//!
//! One row per split, so a spreadsheet can pivot on either the payer or the
//! traveler who owes the share. Amounts are signed: refunds come out negative.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{ExpenseKind, TripId};
use crate::services::LedgerService;
use crate::storage::Storage;

#[derive(Serialize)]
struct SplitRow<'a> {
    expense_id: String,
    date: String,
    description: &'a str,
    category: String,
    kind: &'static str,
    stop: &'a str,
    paid_by: String,
    amount: String,
    traveler: String,
    share: String,
}

fn csv_error(err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(err.to_string())
}

/// Write every expense of a trip with its split rows
pub fn export_expenses_csv<W: Write>(
    storage: &Storage,
    trip_id: TripId,
    writer: &mut W,
) -> LedgerResult<()> {
    let snapshot = LedgerService::new(storage).snapshot(trip_id)?;
    let trip = &snapshot.trip;
    let stop_names: HashMap<_, _> = storage
        .stops
        .get_by_trip(trip_id)?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    let mut csv = csv::Writer::from_writer(writer);
    let mut rows = 0usize;

    for expense in &snapshot.expenses {
        let stop = expense
            .stop_id
            .and_then(|id| stop_names.get(&id))
            .map(String::as_str)
            .unwrap_or("");
        let kind = match expense.kind {
            ExpenseKind::Charge => "charge",
            ExpenseKind::Refund => "refund",
        };

        for split in &expense.splits {
            csv.serialize(SplitRow {
                expense_id: expense.id.to_string(),
                date: expense.date.to_string(),
                description: &expense.description,
                category: expense.category.to_string(),
                kind,
                stop,
                paid_by: trip.traveler_name(expense.paid_by),
                amount: expense.signed_amount().to_decimal_string(),
                traveler: trip.traveler_name(split.traveler_id),
                share: expense.signed_share(split).to_decimal_string(),
            })
            .map_err(csv_error)?;
            rows += 1;
        }
    }

    if rows == 0 {
        csv.write_record([
            "expense_id",
            "date",
            "description",
            "category",
            "kind",
            "stop",
            "paid_by",
            "amount",
            "traveler",
            "share",
        ])
        .map_err(csv_error)?;
    }
    csv.flush().map_err(csv_error)?;

    tracing::debug!(trip = %trip.name, rows, "exported expenses to CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::json::tests::sample_trip;

    #[test]
    fn test_one_row_per_split() {
        let (_temp_dir, storage, trip) = sample_trip();
        let mut out = Vec::new();
        export_expenses_csv(&storage, trip.id, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "expense_id,date,description,category,kind,stop,paid_by,amount,traveler,share"
        );
        // Two expenses, two travelers each
        assert_eq!(lines.len(), 5);
        // Quotes in the description are escaped by the writer
        assert!(lines[1].contains("\"Tram, \"\"28\"\" line\""));
        assert!(lines[1].ends_with("Lisbon,Ana,12.50,Ana,6.25"));
        assert!(lines[3].contains("refund"));
        assert!(lines[3].ends_with("-4.00,Ana,-2.00"));
    }

    #[test]
    fn test_header_without_expenses() {
        let (_temp_dir, storage, trip) = sample_trip();
        for expense in storage.expenses.get_by_trip(trip.id).unwrap() {
            storage.expenses.delete(expense.id).unwrap();
        }

        let mut out = Vec::new();
        export_expenses_csv(&storage, trip.id, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
