//! Budget forecast and budget health
//!
//! The forecast projects trip cost from static line items plus an adjustable
//! daily rate. Everything here is a pure function of its inputs; changing the
//! daily rate just means calling `forecast` again.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::error::ValidationError;
use crate::models::{BudgetLineItem, CostBasis, Money};

/// Spend below this share of the budget (in basis points) is on track
pub const DEFAULT_WARNING_BP: i64 = 8_000;

const FULL_BUDGET_BP: i64 = 10_000;

/// Forecast inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForecastParams {
    pub group_size: usize,
    pub days: i64,
    /// Per-person daily rate for items that follow it
    pub daily_rate: Money,
}

/// Projected cost of one line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastLine {
    pub category: String,
    pub basis: &'static str,
    pub per_person: Money,
    pub group: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Forecast {
    pub params: ForecastParams,
    pub lines: Vec<ForecastLine>,
    pub per_person_total: Money,
    pub group_total: Money,
}

impl Forecast {
    pub fn line(&self, category: &str) -> Option<&ForecastLine> {
        self.lines
            .iter()
            .find(|l| l.category.eq_ignore_ascii_case(category))
    }
}

/// Project per-person and group cost.
///
/// Shared totals are divided per person with half-up rounding, fixed
/// per-person costs are taken as-is, and daily items multiply their own rate
/// (or `daily_rate`) by the number of days.
pub fn forecast(
    items: &[BudgetLineItem],
    params: &ForecastParams,
) -> Result<Forecast, ValidationError> {
    if params.group_size == 0 {
        return Err(ValidationError::NoTravelers);
    }
    if params.days < 0 {
        return Err(ValidationError::Invalid(format!(
            "Trip length cannot be negative: {} days",
            params.days
        )));
    }
    if params.daily_rate.is_negative() {
        return Err(ValidationError::NegativeAmount {
            amount: params.daily_rate,
        });
    }

    let group_size = i64::try_from(params.group_size).map_err(|_| too_large())?;
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let stated = match item.cost {
            CostBasis::SharedTotal(amount) | CostBasis::PerPerson(amount) => Some(amount),
            CostBasis::PerPersonPerDay(rate) => rate,
        };
        if let Some(amount) = stated.filter(Money::is_negative) {
            return Err(ValidationError::NegativeAmount { amount });
        }
        let per_person = match item.cost {
            CostBasis::SharedTotal(total) => total
                .div_round(group_size)
                .ok_or(ValidationError::NoTravelers)?,
            CostBasis::PerPerson(amount) => amount,
            CostBasis::PerPersonPerDay(rate) => rate
                .unwrap_or(params.daily_rate)
                .checked_times(params.days)
                .ok_or_else(too_large)?,
        };
        lines.push(ForecastLine {
            category: item.category.clone(),
            basis: item.cost.label(),
            per_person,
            group: per_person.checked_times(group_size).ok_or_else(too_large)?,
        });
    }

    let per_person_total = lines
        .iter()
        .try_fold(Money::zero(), |acc, l| acc.checked_add(l.per_person))
        .ok_or_else(too_large)?;

    Ok(Forecast {
        params: *params,
        lines,
        per_person_total,
        group_total: per_person_total
            .checked_times(group_size)
            .ok_or_else(too_large)?,
    })
}

fn too_large() -> ValidationError {
    ValidationError::Invalid("Forecast is too large to compute; check the days, rate and items".into())
}

/// Budget health classification; drives presentation only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    Warning,
    Over,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OnTrack => "On track",
            Self::Warning => "Warning",
            Self::Over => "Over budget",
        };
        f.pad(label)
    }
}

/// Actual spend compared with the group budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetHealth {
    pub spent: Money,
    /// `budget_per_person * group_size`
    pub budget: Money,
    pub remaining: Money,
    /// Spend as basis points of the budget; `None` when there is no budget
    pub used_bp: Option<i64>,
    pub status: BudgetStatus,
}

impl BudgetHealth {
    /// Percentage used, e.g. "82.50%"
    pub fn percent_label(&self) -> String {
        match self.used_bp {
            Some(bp) => format!("{}.{:02}%", bp / 100, (bp % 100).abs()),
            None => "n/a".to_string(),
        }
    }
}

/// Classify spend against the budget with the default 80% warning line
pub fn budget_health(total_spent: Money, budget_per_person: Money, group_size: usize) -> BudgetHealth {
    budget_health_with_threshold(total_spent, budget_per_person, group_size, DEFAULT_WARNING_BP)
}

/// Classify spend against the budget: below `warning_bp` is on track, up to
/// 100% is a warning, beyond that is over
pub fn budget_health_with_threshold(
    total_spent: Money,
    budget_per_person: Money,
    group_size: usize,
    warning_bp: i64,
) -> BudgetHealth {
    let group_size = i64::try_from(group_size).unwrap_or(i64::MAX);
    let budget = budget_per_person.saturating_times(group_size);
    let used_bp = total_spent.basis_points_of(budget);

    let status = match used_bp {
        Some(bp) if bp < warning_bp => BudgetStatus::OnTrack,
        Some(bp) if bp <= FULL_BUDGET_BP => BudgetStatus::Warning,
        Some(_) => BudgetStatus::Over,
        None if total_spent.is_positive() => BudgetStatus::Over,
        None => BudgetStatus::OnTrack,
    };

    BudgetHealth {
        spent: total_spent,
        budget,
        remaining: Money::from_cents(budget.cents().saturating_sub(total_spent.cents())),
        used_bp,
        status,
    }
}

/// Spend pace so far and where it lands by the end of the trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BurnRate {
    pub days_elapsed: i64,
    pub total_days: i64,
    pub average_daily: Money,
    /// Linear projection of the current pace over the whole trip
    pub projected_total: Money,
}

/// Burn rate as of a date. `None` before the trip starts, for an inverted
/// date range, or when the projection does not fit in an amount.
pub fn burn_rate(
    total_spent: Money,
    start: NaiveDate,
    end: NaiveDate,
    as_of: NaiveDate,
) -> Option<BurnRate> {
    if as_of < start || end < start {
        return None;
    }
    let total_days = (end - start).num_days() + 1;
    let days_elapsed = (as_of.min(end) - start).num_days() + 1;

    Some(BurnRate {
        days_elapsed,
        total_days,
        average_daily: total_spent.div_round(days_elapsed)?,
        projected_total: total_spent.checked_times(total_days)?.div_round(days_elapsed)?,
    })
}
