//! Expense repository for JSON storage
//!
//! Expenses are stored with their split rows embedded, so an expense and its
//! splits are always written in the same atomic file replace.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Expense, ExpenseId, Split, StopId, TravelerId, TripId};

use super::file_io::{lock_error, read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Repository for expense persistence with a per-trip index
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: trip_id -> expense_ids
    by_trip: RwLock<HashMap<TripId, Vec<ExpenseId>>>,
}

/// Oldest first: date, then entry time, then id for a total order
fn chronological(a: &Expense, b: &Expense) -> std::cmp::Ordering {
    a.date
        .cmp(&b.date)
        .then(a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}

impl ExpenseRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_trip: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenses from disk and rebuild the trip index.
    ///
    /// Every stored expense must pass `Expense::validate`, so the ledger
    /// never sums amounts that were edited past the limits by hand.
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: ExpenseData = read_json(&self.path)?;
        for expense in &file_data.expenses {
            expense.validate().map_err(|err| {
                tracing::error!(expense = %expense.id, error = %err, "invalid stored expense");
                LedgerError::Storage(format!("Stored expense {} is invalid: {}", expense.id, err))
            })?;
        }

        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_trip = self.by_trip.write().map_err(lock_error)?;
        data.clear();
        by_trip.clear();

        for expense in file_data.expenses {
            by_trip.entry(expense.trip_id).or_default().push(expense.id);
            data.insert(expense.id, expense);
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self.data.read().map_err(lock_error)?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        expenses.sort_by(chronological);

        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, LedgerError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// All expenses for a trip, oldest first
    pub fn get_by_trip(&self, trip_id: TripId) -> Result<Vec<Expense>, LedgerError> {
        let data = self.data.read().map_err(lock_error)?;
        let by_trip = self.by_trip.read().map_err(lock_error)?;

        let ids = by_trip.get(&trip_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut expenses: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        expenses.sort_by(chronological);
        Ok(expenses)
    }

    /// Find an expense on a trip by full or short ID
    pub fn find(&self, trip_id: TripId, identifier: &str) -> Result<Option<Expense>, LedgerError> {
        Ok(self
            .get_by_trip(trip_id)?
            .into_iter()
            .find(|e| e.id.matches(identifier)))
    }

    /// Number of expenses on a trip that involve a traveler as payer or sharer
    pub fn count_referencing_traveler(
        &self,
        trip_id: TripId,
        traveler_id: TravelerId,
    ) -> Result<usize, LedgerError> {
        Ok(self
            .get_by_trip(trip_id)?
            .iter()
            .filter(|e| e.references(traveler_id))
            .count())
    }

    pub fn count_at_stop(&self, trip_id: TripId, stop_id: StopId) -> Result<usize, LedgerError> {
        Ok(self
            .get_by_trip(trip_id)?
            .iter()
            .filter(|e| e.stop_id == Some(stop_id))
            .count())
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_trip = self.by_trip.write().map_err(lock_error)?;

        if let Some(old) = data.get(&expense.id) {
            if let Some(ids) = by_trip.get_mut(&old.trip_id) {
                ids.retain(|&id| id != expense.id);
            }
        }
        by_trip.entry(expense.trip_id).or_default().push(expense.id);
        data.insert(expense.id, expense);
        Ok(())
    }

    /// Swap the whole split set of an expense in one step
    pub fn replace_splits(&self, id: ExpenseId, splits: Vec<Split>) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_error)?;
        let expense = data
            .get_mut(&id)
            .ok_or_else(|| LedgerError::expense_not_found(id.to_string()))?;
        expense.replace_splits(splits);
        Ok(())
    }

    /// Delete an expense together with its splits
    pub fn delete(&self, id: ExpenseId) -> Result<Option<Expense>, LedgerError> {
        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_trip = self.by_trip.write().map_err(lock_error)?;

        let removed = data.remove(&id);
        if let Some(expense) = &removed {
            if let Some(ids) = by_trip.get_mut(&expense.trip_id) {
                ids.retain(|&eid| eid != id);
            }
        }
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn create_test_repo() -> (TempDir, ExpenseRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        (temp_dir, repo)
    }

    fn dinner(trip: TripId, payer: TravelerId, day: u32) -> Expense {
        let mut e = Expense::new(trip, "Dinner", Money::from_units(60), payer, date(day));
        e.replace_splits(vec![Split::new(payer, Money::from_units(60))]);
        e
    }

    #[test]
    fn test_get_by_trip_is_chronological() {
        let (_temp_dir, repo) = create_test_repo();
        let trip = TripId::new();
        let payer = TravelerId::new();
        repo.upsert(dinner(trip, payer, 9)).unwrap();
        repo.upsert(dinner(trip, payer, 2)).unwrap();
        repo.upsert(dinner(TripId::new(), payer, 1)).unwrap();

        let days: Vec<_> = repo
            .get_by_trip(trip)
            .unwrap()
            .into_iter()
            .map(|e| e.date)
            .collect();
        assert_eq!(days, [date(2), date(9)]);
    }

    #[test]
    fn test_splits_persist_with_expense() {
        let (temp_dir, repo) = create_test_repo();
        let trip = TripId::new();
        let (a, b) = (TravelerId::new(), TravelerId::new());
        let expense = dinner(trip, a, 3);
        let id = expense.id;
        repo.upsert(expense).unwrap();

        repo.replace_splits(
            id,
            vec![
                Split::new(a, Money::from_units(20)),
                Split::new(b, Money::from_units(40)),
            ],
        )
        .unwrap();
        repo.save().unwrap();

        let reloaded = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        reloaded.load().unwrap();
        let expense = reloaded.get(id).unwrap().unwrap();
        assert_eq!(expense.share_of(b), Money::from_units(40));
        assert!(expense.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_amount_over_limit() {
        let (temp_dir, repo) = create_test_repo();
        let payer = TravelerId::new();
        let huge = Money::from_cents(92_233_720_368_547_758);
        let mut expense = Expense::new(TripId::new(), "Yacht", huge, payer, date(4));
        expense.replace_splits(vec![Split::new(payer, huge)]);
        repo.upsert(expense).unwrap();
        repo.save().unwrap();

        let reloaded = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        let err = reloaded.load().unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert_eq!(reloaded.count().unwrap(), 0);
    }

    #[test]
    fn test_replace_splits_unknown_expense() {
        let (_temp_dir, repo) = create_test_repo();
        let err = repo.replace_splits(ExpenseId::new(), vec![]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_reference_counts_and_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let trip = TripId::new();
        let (a, b) = (TravelerId::new(), TravelerId::new());
        let stop = StopId::new();

        let mut first = dinner(trip, a, 1);
        first.stop_id = Some(stop);
        let first_id = first.id;
        repo.upsert(first).unwrap();
        repo.upsert(dinner(trip, a, 2)).unwrap();

        assert_eq!(repo.count_referencing_traveler(trip, a).unwrap(), 2);
        assert_eq!(repo.count_referencing_traveler(trip, b).unwrap(), 0);
        assert_eq!(repo.count_at_stop(trip, stop).unwrap(), 1);

        let removed = repo.delete(first_id).unwrap().unwrap();
        assert_eq!(removed.id, first_id);
        assert_eq!(repo.count_at_stop(trip, stop).unwrap(), 0);
        assert!(repo.delete(first_id).unwrap().is_none());
    }
}
