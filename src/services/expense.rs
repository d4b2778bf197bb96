//! Expense service
//!
//! The write path for expenses. Shares are computed and checked before
//! anything touches storage, and the expense is stored together with its
//! split rows, so a failed edit leaves the previous version intact.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{compute_splits, LedgerFilter, SplitMode};
use crate::models::{
    Expense, ExpenseCategory, ExpenseId, ExpenseKind, Money, Split, StopId, TravelerId, Trip,
    TripId,
};
use crate::storage::Storage;

pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

/// Input for recording a new expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub description: String,
    pub amount: Money,
    pub kind: ExpenseKind,
    pub category: ExpenseCategory,
    pub paid_by: TravelerId,
    pub date: NaiveDate,
    pub stop_id: Option<StopId>,
    pub notes: String,
    pub split: SplitMode,
    /// Equal-split participants; `None` means the whole roster
    pub participants: Option<Vec<TravelerId>>,
}

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub kind: Option<ExpenseKind>,
    pub category: Option<ExpenseCategory>,
    pub paid_by: Option<TravelerId>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the stop
    pub stop_id: Option<Option<StopId>>,
    pub notes: Option<String>,
    /// A new split replaces the whole split set
    pub split: Option<SplitMode>,
    pub participants: Option<Vec<TravelerId>>,
}

impl UpdateExpenseInput {
    fn resplits(&self) -> bool {
        self.amount.is_some() || self.split.is_some() || self.participants.is_some()
    }
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a new expense with its splits
    pub fn create(&self, trip_id: TripId, input: CreateExpenseInput) -> LedgerResult<Expense> {
        let trip = self.trip(trip_id)?;
        self.check_payer(&trip, input.paid_by)?;
        if let Some(stop_id) = input.stop_id {
            self.check_stop(trip_id, stop_id)?;
        }

        let participants = self.participants(&trip, input.participants.as_deref())?;
        let splits = compute_splits(input.amount, &participants, &input.split)?;

        let mut expense = Expense::new(
            trip_id,
            input.description.trim(),
            input.amount,
            input.paid_by,
            input.date,
        );
        expense.kind = input.kind;
        expense.category = input.category;
        expense.stop_id = input.stop_id;
        expense.notes = input.notes;
        expense.replace_splits(splits);
        expense
            .validate()
            .map_err(|e| LedgerError::invalid(e.to_string()))?;

        if !trip.contains(expense.date) {
            tracing::warn!(expense = %expense.id, date = %expense.date, "expense dated outside the trip");
        }

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;
        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.description.clone()),
            &expense,
        )?;
        tracing::info!(
            trip = %trip_id,
            expense = %expense.id,
            amount = expense.amount.cents(),
            custom = input.split.is_custom(),
            "recorded expense"
        );

        Ok(expense)
    }

    /// Edit an expense.
    ///
    /// Changing the amount, split mode or participants recomputes and replaces
    /// the whole split set. An amount change on a custom split needs new
    /// shares, since the old ones can no longer add up.
    pub fn update(
        &self,
        trip_id: TripId,
        id: ExpenseId,
        input: UpdateExpenseInput,
    ) -> LedgerResult<Expense> {
        let trip = self.trip(trip_id)?;
        let before = self.require(trip_id, id)?;
        let mut expense = before.clone();

        if let Some(description) = &input.description {
            expense.description = description.trim().to_string();
        }
        if let Some(kind) = input.kind {
            expense.kind = kind;
        }
        if let Some(category) = input.category {
            expense.category = category;
        }
        if let Some(paid_by) = input.paid_by {
            self.check_payer(&trip, paid_by)?;
            expense.paid_by = paid_by;
        }
        if let Some(date) = input.date {
            expense.date = date;
        }
        if let Some(stop_id) = input.stop_id {
            if let Some(stop_id) = stop_id {
                self.check_stop(trip_id, stop_id)?;
            }
            expense.stop_id = stop_id;
        }
        if let Some(notes) = &input.notes {
            expense.notes = notes.clone();
        }

        if input.resplits() {
            let amount = input.amount.unwrap_or(before.amount);
            let mode = match &input.split {
                Some(mode) => mode.clone(),
                None if was_equal_split(&before) => SplitMode::Equal,
                None => {
                    return Err(LedgerError::invalid(
                        "This expense has custom shares; give new shares when changing the amount",
                    ))
                }
            };
            let participants = match (&input.participants, &mode) {
                (Some(ids), _) => self.participants(&trip, Some(ids))?,
                (None, SplitMode::Equal) if input.split.is_none() => {
                    let previous: Vec<_> = before.splits.iter().map(|s| s.traveler_id).collect();
                    self.participants(&trip, Some(&previous))?
                }
                (None, _) => trip.roster(),
            };
            let splits = compute_splits(amount, &participants, &mode)?;
            expense.amount = amount;
            expense.replace_splits(splits);
        }

        expense.updated_at = Utc::now();
        expense
            .validate()
            .map_err(|e| LedgerError::invalid(e.to_string()))?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;
        self.storage.log_update(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.description.clone()),
            &before,
            &expense,
        )?;
        tracing::info!(trip = %trip_id, expense = %expense.id, "updated expense");

        Ok(expense)
    }

    /// Delete an expense together with its splits
    pub fn delete(&self, trip_id: TripId, id: ExpenseId) -> LedgerResult<Expense> {
        let expense = self.require(trip_id, id)?;

        self.storage.expenses.delete(id)?;
        self.storage.expenses.save()?;
        self.storage.log_delete(
            EntityType::Expense,
            id.to_string(),
            Some(expense.description.clone()),
            &expense,
        )?;
        tracing::info!(trip = %trip_id, expense = %id, "deleted expense");

        Ok(expense)
    }

    pub fn get(&self, trip_id: TripId, id: ExpenseId) -> LedgerResult<Option<Expense>> {
        Ok(self
            .storage
            .expenses
            .get(id)?
            .filter(|e| e.trip_id == trip_id))
    }

    /// Find an expense on a trip by full or short ID
    pub fn resolve(&self, trip_id: TripId, identifier: &str) -> LedgerResult<Expense> {
        self.storage
            .expenses
            .find(trip_id, identifier)?
            .ok_or_else(|| LedgerError::expense_not_found(identifier))
    }

    /// Expenses on a trip matching `filter`, oldest first
    pub fn list(&self, trip_id: TripId, filter: &LedgerFilter) -> LedgerResult<Vec<Expense>> {
        let mut expenses = self.storage.expenses.get_by_trip(trip_id)?;
        expenses.retain(|e| filter.matches(e));
        Ok(expenses)
    }

    fn trip(&self, trip_id: TripId) -> LedgerResult<Trip> {
        self.storage
            .trips
            .get(trip_id)?
            .ok_or_else(|| LedgerError::trip_not_found(trip_id.to_string()))
    }

    fn require(&self, trip_id: TripId, id: ExpenseId) -> LedgerResult<Expense> {
        self.get(trip_id, id)?
            .ok_or_else(|| LedgerError::expense_not_found(id.to_string()))
    }

    fn check_payer(&self, trip: &Trip, paid_by: TravelerId) -> LedgerResult<()> {
        if trip.traveler(paid_by).is_none() {
            return Err(LedgerError::traveler_not_found(paid_by.to_string()));
        }
        Ok(())
    }

    fn check_stop(&self, trip_id: TripId, stop_id: StopId) -> LedgerResult<()> {
        match self.storage.stops.get(stop_id)? {
            Some(stop) if stop.trip_id == trip_id => Ok(()),
            _ => Err(LedgerError::stop_not_found(stop_id.to_string())),
        }
    }

    /// Participants in roster order. Unknown IDs are rejected; duplicates are
    /// left for the split engine to report.
    fn participants(
        &self,
        trip: &Trip,
        selected: Option<&[TravelerId]>,
    ) -> LedgerResult<Vec<TravelerId>> {
        let Some(selected) = selected else {
            return Ok(trip.roster());
        };
        if let Some(unknown) = selected.iter().find(|id| trip.traveler(**id).is_none()) {
            return Err(LedgerError::traveler_not_found(unknown.to_string()));
        }
        let mut ordered: Vec<TravelerId> = trip
            .roster()
            .into_iter()
            .filter(|id| selected.contains(id))
            .collect();
        // Keep repeated IDs visible to the split engine's duplicate check
        if selected.len() > ordered.len() {
            ordered = selected.to_vec();
        }
        Ok(ordered)
    }
}

/// Whether the stored shares are exactly what an equal split would produce
fn was_equal_split(expense: &Expense) -> bool {
    let participants: Vec<_> = expense.splits.iter().map(|s| s.traveler_id).collect();
    compute_splits(expense.amount, &participants, &SplitMode::Equal)
        .map(|equal| equal == expense.splits)
        .unwrap_or(false)
}

/// Split rows for display: traveler name and share, in stored order
pub fn describe_splits(trip: &Trip, splits: &[Split]) -> Vec<(String, Money)> {
    splits
        .iter()
        .map(|s| (trip.traveler_name(s.traveler_id), s.share))
        .collect()
}
