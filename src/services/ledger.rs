//! Ledger service
//!
//! Loads a trip snapshot from storage and hands it to the pure ledger
//! functions. Nothing here writes.

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{
    aggregate, budget_health_with_threshold, burn_rate, forecast, resolve_balances, BudgetHealth,
    BurnRate, Forecast, ForecastParams, LedgerFilter, LedgerView, Settlement,
};
use crate::models::{BudgetLineItem, Expense, Money, Trip, TripId};
use crate::storage::Storage;

pub struct LedgerService<'a> {
    storage: &'a Storage,
}

/// A trip with all of its expenses, read at one point in time
#[derive(Debug, Clone)]
pub struct TripSnapshot {
    pub trip: Trip,
    pub expenses: Vec<Expense>,
}

impl<'a> LedgerService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn snapshot(&self, trip_id: TripId) -> LedgerResult<TripSnapshot> {
        let trip = self
            .storage
            .trips
            .get(trip_id)?
            .ok_or_else(|| LedgerError::trip_not_found(trip_id.to_string()))?;
        let expenses = self.storage.expenses.get_by_trip(trip_id)?;
        Ok(TripSnapshot { trip, expenses })
    }

    /// Spending broken down by payer, stop, day and category
    pub fn view(&self, trip_id: TripId, filter: &LedgerFilter) -> LedgerResult<LedgerView> {
        let snapshot = self.snapshot(trip_id)?;
        Ok(aggregate(&snapshot.expenses, filter))
    }

    /// Net balances and settle-up transfers
    pub fn settlement(&self, trip_id: TripId) -> LedgerResult<Settlement> {
        let snapshot = self.snapshot(trip_id)?;
        resolve_balances(&snapshot.expenses, &snapshot.trip.roster())
    }

    /// Total spend against the group budget
    pub fn health(&self, trip_id: TripId, warning_bp: i64) -> LedgerResult<BudgetHealth> {
        let snapshot = self.snapshot(trip_id)?;
        let spent: Money = snapshot.expenses.iter().map(Expense::signed_amount).sum();
        Ok(budget_health_with_threshold(
            spent,
            snapshot.trip.budget_per_person,
            snapshot.trip.group_size(),
            warning_bp,
        ))
    }

    /// Spend pace as of `as_of`; `None` before the trip starts
    pub fn burn(&self, trip_id: TripId, as_of: NaiveDate) -> LedgerResult<Option<BurnRate>> {
        let snapshot = self.snapshot(trip_id)?;
        let spent: Money = snapshot.expenses.iter().map(Expense::signed_amount).sum();
        Ok(burn_rate(
            spent,
            snapshot.trip.start_date,
            snapshot.trip.end_date,
            as_of,
        ))
    }

    /// Forecast for the trip's roster. `days` defaults to the trip length.
    pub fn forecast(
        &self,
        trip_id: TripId,
        items: &[BudgetLineItem],
        daily_rate: Money,
        days: Option<i64>,
    ) -> LedgerResult<Forecast> {
        let snapshot = self.snapshot(trip_id)?;
        let params = ForecastParams {
            group_size: snapshot.trip.group_size(),
            days: days.unwrap_or_else(|| snapshot.trip.days()),
            daily_rate,
        };
        Ok(forecast(items, &params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::ledger::{BudgetStatus, SplitMode, DEFAULT_WARNING_BP};
    use crate::models::{default_line_items, ExpenseCategory, ExpenseKind, Traveler};
    use crate::services::expense::{CreateExpenseInput, ExpenseService};
    use tempfile::TempDir;

    fn setup() -> (TempDir, Storage, Trip) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();

        let mut trip = Trip::new(
            "Italy",
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
        );
        trip.budget_per_person = Money::from_units(100);
        for name in ["A", "B", "C"] {
            trip.add_traveler(Traveler::new(name, "#9E9E9E"));
        }
        storage.trips.upsert(trip.clone()).unwrap();
        (temp_dir, storage, trip)
    }

    fn pay(storage: &Storage, trip: &Trip, payer: usize, cents: i64, kind: ExpenseKind) {
        ExpenseService::new(storage)
            .create(
                trip.id,
                CreateExpenseInput {
                    description: "Shared".into(),
                    amount: Money::from_cents(cents),
                    kind,
                    category: ExpenseCategory::Food,
                    paid_by: trip.travelers[payer].id,
                    date: trip.start_date,
                    stop_id: None,
                    notes: String::new(),
                    split: SplitMode::Equal,
                    participants: None,
                },
            )
            .unwrap();
    }

    #[test]
    fn test_settlement_from_storage() {
        let (_temp_dir, storage, trip) = setup();
        pay(&storage, &trip, 0, 9_000, ExpenseKind::Charge);

        let settlement = LedgerService::new(&storage).settlement(trip.id).unwrap();
        assert_eq!(settlement.net_of(trip.travelers[0].id), Some(Money::from_cents(6_000)));
        assert_eq!(settlement.transfers.len(), 2);
        assert_eq!(settlement.volume(), Money::from_cents(6_000));
    }

    #[test]
    fn test_refund_reduces_spend_and_health() {
        let (_temp_dir, storage, trip) = setup();
        pay(&storage, &trip, 0, 27_000, ExpenseKind::Charge);
        let service = LedgerService::new(&storage);
        assert_eq!(
            service.health(trip.id, DEFAULT_WARNING_BP).unwrap().status,
            BudgetStatus::Warning
        );

        pay(&storage, &trip, 0, 6_000, ExpenseKind::Refund);
        let health = service.health(trip.id, DEFAULT_WARNING_BP).unwrap();
        assert_eq!(health.spent, Money::from_cents(21_000));
        assert_eq!(health.status, BudgetStatus::OnTrack);

        let view = service.view(trip.id, &LedgerFilter::new()).unwrap();
        assert_eq!(view.total_spent, Money::from_cents(21_000));
    }

    #[test]
    fn test_forecast_uses_trip_shape() {
        let (_temp_dir, storage, trip) = setup();
        let service = LedgerService::new(&storage);

        let f = service
            .forecast(trip.id, &default_line_items(), Money::from_units(150), None)
            .unwrap();
        assert_eq!(f.params.group_size, 3);
        assert_eq!(f.params.days, 15);
        assert_eq!(f.line("Daily spending").unwrap().per_person, Money::from_units(2_250));

        // Recomputing at a new rate leaves stored expenses alone
        let before = storage.expenses.count().unwrap();
        service
            .forecast(trip.id, &default_line_items(), Money::from_units(200), None)
            .unwrap();
        assert_eq!(storage.expenses.count().unwrap(), before);
    }

    #[test]
    fn test_unknown_trip() {
        let (_temp_dir, storage, _trip) = setup();
        let err = LedgerService::new(&storage).settlement(TripId::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_burn_rate() {
        let (_temp_dir, storage, trip) = setup();
        pay(&storage, &trip, 1, 50_000, ExpenseKind::Charge);

        let burn = LedgerService::new(&storage)
            .burn(trip.id, NaiveDate::from_ymd_opt(2025, 4, 5).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(burn.average_daily, Money::from_units(100));
        assert_eq!(burn.projected_total, Money::from_units(1_500));
    }
}
