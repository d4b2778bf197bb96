//! JSON export of a whole trip
//!
//! A self-contained document: the trip with its roster, the route, and every
//! expense with its split rows, plus a schema version and summary metadata.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Expense, Money, Stop, Trip, TripId};
use crate::services::LedgerService;
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    /// Version of the tool that wrote the export
    pub app_version: String,
    pub trip: Trip,
    pub stops: Vec<Stop>,
    pub expenses: Vec<Expense>,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub traveler_count: usize,
    pub stop_count: usize,
    pub expense_count: usize,
    /// Net of refunds
    pub total_spent: Money,
    pub earliest_expense: Option<String>,
    pub latest_expense: Option<String>,
}

impl TripExport {
    pub fn from_storage(storage: &Storage, trip_id: TripId) -> LedgerResult<Self> {
        let snapshot = LedgerService::new(storage).snapshot(trip_id)?;
        let stops = storage.stops.get_by_trip(trip_id)?;
        let expenses = snapshot.expenses;

        let metadata = ExportMetadata {
            traveler_count: snapshot.trip.group_size(),
            stop_count: stops.len(),
            expense_count: expenses.len(),
            total_spent: expenses.iter().map(Expense::signed_amount).sum(),
            earliest_expense: expenses.iter().map(|e| e.date).min().map(|d| d.to_string()),
            latest_expense: expenses.iter().map(|e| e.date).max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            trip: snapshot.trip,
            stops,
            expenses,
            metadata,
        })
    }

    /// Check that every reference inside the document resolves and every
    /// expense's splits add up
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let travelers: HashSet<_> = self.trip.travelers.iter().map(|t| t.id).collect();
        let stops: HashSet<_> = self.stops.iter().map(|s| s.id).collect();

        for expense in &self.expenses {
            if expense.trip_id != self.trip.id {
                return Err(format!("Expense {} belongs to another trip", expense.id));
            }
            if let Some(unknown) = expense.travelers().find(|t| !travelers.contains(t)) {
                return Err(format!(
                    "Expense {} references unknown traveler {}",
                    expense.id, unknown
                ));
            }
            if let Some(stop_id) = expense.stop_id {
                if !stops.contains(&stop_id) {
                    return Err(format!(
                        "Expense {} references unknown stop {}",
                        expense.id, stop_id
                    ));
                }
            }
            expense
                .validate()
                .map_err(|e| format!("Expense {}: {}", expense.id, e))?;
        }

        Ok(())
    }
}

/// Write a trip as JSON
pub fn export_trip_json<W: Write>(
    storage: &Storage,
    trip_id: TripId,
    writer: &mut W,
    pretty: bool,
) -> LedgerResult<()> {
    let export = TripExport::from_storage(storage, trip_id)?;
    export.validate().map_err(LedgerError::Export)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| LedgerError::Export(e.to_string()))?;

    Ok(())
}
