//! Ledger aggregation
//!
//! Groups a trip's expenses by payer, stop, day and category. The view is
//! derived on every read and never stored.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

use crate::models::{Expense, ExpenseCategory, Money, StopId, TravelerId};

/// Stop grouping key; expenses without a stop land in `Unassigned`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum StopKey {
    Stop(StopId),
    Unassigned,
}

impl From<Option<StopId>> for StopKey {
    fn from(stop_id: Option<StopId>) -> Self {
        stop_id.map(StopKey::Stop).unwrap_or(StopKey::Unassigned)
    }
}

/// One row of a breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket<K> {
    pub key: K,
    pub amount: Money,
    /// Number of expenses that contributed
    pub count: usize,
}

/// Pre-filter applied before aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerFilter {
    /// Inclusive start date
    pub start: Option<NaiveDate>,
    /// Inclusive end date
    pub end: Option<NaiveDate>,
    pub stop: Option<StopKey>,
    pub category: Option<ExpenseCategory>,
}

impl LedgerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by inclusive date range
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn from_date(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn stop(mut self, stop: StopKey) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn category(mut self, category: ExpenseCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        if self.start.is_some_and(|start| expense.date < start) {
            return false;
        }
        if self.end.is_some_and(|end| expense.date > end) {
            return false;
        }
        if self
            .stop
            .is_some_and(|stop| StopKey::from(expense.stop_id) != stop)
        {
            return false;
        }
        if self.category.is_some_and(|c| expense.category != c) {
            return false;
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Aggregated spend for a set of expenses
///
/// Every breakdown is ordered by amount descending, ties in first-seen
/// input order. `daily_trend` is the same per-day data in date order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerView {
    pub total_spent: Money,
    pub expense_count: usize,
    /// Amounts paid by each traveler (not their owed shares)
    pub spent_by_traveler: Vec<Bucket<TravelerId>>,
    /// Sum of each traveler's owed shares
    pub owed_by_traveler: Vec<Bucket<TravelerId>>,
    pub spent_by_stop: Vec<Bucket<StopKey>>,
    pub spent_by_day: Vec<Bucket<NaiveDate>>,
    pub daily_trend: Vec<Bucket<NaiveDate>>,
    pub spent_by_category: Vec<Bucket<ExpenseCategory>>,
}

impl LedgerView {
    pub fn is_empty(&self) -> bool {
        self.expense_count == 0
    }

    pub fn paid_by(&self, traveler_id: TravelerId) -> Money {
        amount_for(&self.spent_by_traveler, &traveler_id)
    }

    pub fn owed_by(&self, traveler_id: TravelerId) -> Money {
        amount_for(&self.owed_by_traveler, &traveler_id)
    }

    pub fn spent_at(&self, stop: StopKey) -> Money {
        amount_for(&self.spent_by_stop, &stop)
    }

    pub fn spent_on(&self, date: NaiveDate) -> Money {
        amount_for(&self.spent_by_day, &date)
    }

    /// Average spend over the days that have any expense, rounded half-up
    pub fn average_per_day(&self) -> Option<Money> {
        self.total_spent.div_round(self.daily_trend.len() as i64)
    }

    /// Share of `total_spent` in basis points for one amount
    pub fn share_bp(&self, amount: Money) -> Option<i64> {
        amount.basis_points_of(self.total_spent)
    }
}

fn amount_for<K: PartialEq>(buckets: &[Bucket<K>], key: &K) -> Money {
    buckets
        .iter()
        .find(|b| &b.key == key)
        .map(|b| b.amount)
        .unwrap_or_default()
}

/// Insertion-ordered accumulator
struct Tally<K> {
    buckets: Vec<Bucket<K>>,
    index: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash> Tally<K> {
    fn new() -> Self {
        Self {
            buckets: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn add(&mut self, key: K, amount: Money) {
        match self.index.get(&key) {
            Some(&i) => {
                let bucket = &mut self.buckets[i];
                bucket.amount += amount;
                bucket.count += 1;
            }
            None => {
                self.index.insert(key, self.buckets.len());
                self.buckets.push(Bucket {
                    key,
                    amount,
                    count: 1,
                });
            }
        }
    }

    /// Largest first; the sort is stable so ties keep first-seen order
    fn into_ranked(self) -> Vec<Bucket<K>> {
        let mut buckets = self.buckets;
        buckets.sort_by(|a, b| b.amount.cmp(&a.amount));
        buckets
    }
}

/// Aggregate expenses into a ledger view.
///
/// Refunds count negatively everywhere. Identical input always produces an
/// identical view.
pub fn aggregate(expenses: &[Expense], filter: &LedgerFilter) -> LedgerView {
    let mut total_spent = Money::zero();
    let mut expense_count = 0;
    let mut by_traveler = Tally::new();
    let mut owed = Tally::new();
    let mut by_stop = Tally::new();
    let mut by_day = Tally::new();
    let mut by_category = Tally::new();

    for expense in expenses.iter().filter(|e| filter.matches(e)) {
        let amount = expense.signed_amount();
        total_spent += amount;
        expense_count += 1;

        by_traveler.add(expense.paid_by, amount);
        by_stop.add(StopKey::from(expense.stop_id), amount);
        by_day.add(expense.date, amount);
        by_category.add(expense.category, amount);

        for split in &expense.splits {
            owed.add(split.traveler_id, expense.signed_share(split));
        }
    }

    let mut daily_trend = by_day.buckets.clone();
    daily_trend.sort_by_key(|b| b.key);

    LedgerView {
        total_spent,
        expense_count,
        spent_by_traveler: by_traveler.into_ranked(),
        owed_by_traveler: owed.into_ranked(),
        spent_by_stop: by_stop.into_ranked(),
        spent_by_day: by_day.into_ranked(),
        daily_trend,
        spent_by_category: by_category.into_ranked(),
    }
}
