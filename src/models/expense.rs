//! Expense model
//!
//! An expense is one payment made by one traveler on behalf of the group,
//! together with its split rows. The split rows live inside the expense
//! record so they are written, replaced and deleted as one unit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, StopId, TravelerId, TripId};
use super::money::Money;

/// Spending category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Lodging,
    Activities,
    Shopping,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        Self::Food,
        Self::Transport,
        Self::Lodging,
        Self::Activities,
        Self::Shopping,
        Self::Other,
    ];

    /// Parse a category name, accepting a few common aliases
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" | "meals" | "dining" => Some(Self::Food),
            "transport" | "transportation" | "travel" => Some(Self::Transport),
            "lodging" | "accommodation" | "hotel" => Some(Self::Lodging),
            "activities" | "activity" | "tours" => Some(Self::Activities),
            "shopping" | "souvenirs" => Some(Self::Shopping),
            "other" | "misc" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Lodging => "Lodging",
            Self::Activities => "Activities",
            Self::Shopping => "Shopping",
            Self::Other => "Other",
        };
        f.pad(name)
    }
}

/// Whether money left or came back to the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseKind {
    #[default]
    Charge,
    /// Money returned to the payer (cancelled booking, deposit back).
    /// Counts against spend and against each sharer's owed total.
    Refund,
}

impl ExpenseKind {
    /// +1 for charges, -1 for refunds
    pub const fn sign(&self) -> i64 {
        match self {
            Self::Charge => 1,
            Self::Refund => -1,
        }
    }
}

/// One traveler's owed portion of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub traveler_id: TravelerId,

    /// Owed amount, same magnitude convention as the parent expense
    pub share: Money,
}

impl Split {
    pub fn new(traveler_id: TravelerId, share: Money) -> Self {
        Self { traveler_id, share }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,

    pub trip_id: TripId,

    pub description: String,

    /// Non-negative amount; direction comes from `kind`
    pub amount: Money,

    #[serde(default)]
    pub kind: ExpenseKind,

    #[serde(default)]
    pub category: ExpenseCategory,

    /// Traveler who paid
    pub paid_by: TravelerId,

    pub date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<StopId>,

    #[serde(default)]
    pub notes: String,

    /// Owed shares; always sums to `amount`
    #[serde(default)]
    pub splits: Vec<Split>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense with no splits yet
    pub fn new(
        trip_id: TripId,
        description: impl Into<String>,
        amount: Money,
        paid_by: TravelerId,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            trip_id,
            description: description.into(),
            amount,
            kind: ExpenseKind::Charge,
            category: ExpenseCategory::Other,
            paid_by,
            date,
            stop_id: None,
            notes: String::new(),
            splits: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount with the refund sign applied
    pub fn signed_amount(&self) -> Money {
        self.amount.times(self.kind.sign())
    }

    /// A split share with the refund sign applied
    pub fn signed_share(&self, split: &Split) -> Money {
        split.share.times(self.kind.sign())
    }

    pub fn is_refund(&self) -> bool {
        self.kind == ExpenseKind::Refund
    }

    /// Total of all split shares
    pub fn splits_total(&self) -> Money {
        self.splits.iter().map(|s| s.share).sum()
    }

    /// Share owed by one traveler (zero if not part of the split)
    pub fn share_of(&self, traveler_id: TravelerId) -> Money {
        self.splits
            .iter()
            .filter(|s| s.traveler_id == traveler_id)
            .map(|s| s.share)
            .sum()
    }

    /// Replace the whole split set
    pub fn replace_splits(&mut self, splits: Vec<Split>) {
        self.splits = splits;
        self.updated_at = Utc::now();
    }

    /// Every traveler this expense references (payer first, then sharers)
    pub fn travelers(&self) -> impl Iterator<Item = TravelerId> + '_ {
        std::iter::once(self.paid_by).chain(self.splits.iter().map(|s| s.traveler_id))
    }

    pub fn references(&self, traveler_id: TravelerId) -> bool {
        self.travelers().any(|t| t == traveler_id)
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.description.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyDescription);
        }
        if self.amount.is_negative() {
            return Err(ExpenseValidationError::NegativeAmount(self.amount));
        }
        if self.amount.exceeds_limit() {
            return Err(ExpenseValidationError::AmountTooLarge(self.amount));
        }
        if self.splits.is_empty() {
            return Err(ExpenseValidationError::NoSplits);
        }
        for (i, split) in self.splits.iter().enumerate() {
            if split.share.is_negative() {
                return Err(ExpenseValidationError::NegativeShare(split.traveler_id));
            }
            if split.share.exceeds_limit() {
                return Err(ExpenseValidationError::AmountTooLarge(split.share));
            }
            if self.splits[..i]
                .iter()
                .any(|s| s.traveler_id == split.traveler_id)
            {
                return Err(ExpenseValidationError::DuplicateSplit(split.traveler_id));
            }
        }
        let splits_total = self.splits_total();
        if splits_total != self.amount {
            return Err(ExpenseValidationError::SplitsMismatch {
                amount: self.amount,
                splits_total,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.signed_amount()
        )
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpenseValidationError {
    #[error("Expense description cannot be empty")]
    EmptyDescription,
    #[error("Expense amount cannot be negative: {0}")]
    NegativeAmount(Money),
    #[error("Expense amount is larger than {}: {0}", Money::MAX)]
    AmountTooLarge(Money),
    #[error("Expense has no split rows")]
    NoSplits,
    #[error("Split share for {0} is negative")]
    NegativeShare(TravelerId),
    #[error("Traveler {0} appears twice in the split")]
    DuplicateSplit(TravelerId),
    #[error("Split totals ({splits_total}) do not match expense amount ({amount})")]
    SplitsMismatch { amount: Money, splits_total: Money },
}
