//! Split engine
//!
//! Turns one expense amount into exact per-traveler shares. The output always
//! reconciles: the shares add up to the amount to the cent, for every amount
//! and group size.

use crate::error::ValidationError;
use crate::models::{Money, Split, TravelerId};

/// How an expense is divided among its participants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// Even division; leftover cents go to the first travelers in roster order
    Equal,
    /// Caller-supplied shares that must add up to the amount
    Custom(Vec<(TravelerId, Money)>),
}

impl SplitMode {
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

/// Compute split rows for an expense.
///
/// `travelers` is the participant list in roster order; the returned rows
/// follow the same order, one per participant.
///
/// # Examples
/// ```
/// use trip_ledger::ledger::{compute_splits, SplitMode};
/// use trip_ledger::models::{Money, TravelerId};
///
/// let roster = [TravelerId::new(), TravelerId::new(), TravelerId::new()];
/// let splits = compute_splits(Money::from_cents(10_000), &roster, &SplitMode::Equal).unwrap();
/// let shares: Vec<i64> = splits.iter().map(|s| s.share.cents()).collect();
/// assert_eq!(shares, vec![3334, 3333, 3333]);
/// ```
pub fn compute_splits(
    amount: Money,
    travelers: &[TravelerId],
    mode: &SplitMode,
) -> Result<Vec<Split>, ValidationError> {
    if amount.is_negative() {
        return Err(ValidationError::NegativeAmount { amount });
    }
    if amount.exceeds_limit() {
        return Err(ValidationError::AmountTooLarge { amount });
    }
    if travelers.is_empty() {
        return Err(ValidationError::NoTravelers);
    }
    if let Some(dup) = first_duplicate(travelers) {
        return Err(ValidationError::DuplicateTraveler(dup.to_string()));
    }

    match mode {
        SplitMode::Equal => Ok(equal_split(amount, travelers)),
        SplitMode::Custom(shares) => custom_split(amount, travelers, shares),
    }
}

fn equal_split(amount: Money, travelers: &[TravelerId]) -> Vec<Split> {
    let count = travelers.len() as i64;
    // count > 0 and amount >= 0 were checked by the caller
    let (base, remainder) = amount.split_floor(count).unwrap_or((Money::zero(), 0));
    let remainder = remainder as usize;

    travelers
        .iter()
        .enumerate()
        .map(|(i, &traveler_id)| {
            let share = if i < remainder {
                base + Money::from_cents(1)
            } else {
                base
            };
            Split::new(traveler_id, share)
        })
        .collect()
}

fn custom_split(
    amount: Money,
    travelers: &[TravelerId],
    shares: &[(TravelerId, Money)],
) -> Result<Vec<Split>, ValidationError> {
    for (i, (traveler_id, share)) in shares.iter().enumerate() {
        if !travelers.contains(traveler_id) {
            return Err(ValidationError::UnknownTraveler(traveler_id.to_string()));
        }
        if shares[..i].iter().any(|(other, _)| other == traveler_id) {
            return Err(ValidationError::DuplicateTraveler(traveler_id.to_string()));
        }
        if share.is_negative() {
            return Err(ValidationError::NegativeShare {
                traveler: traveler_id.to_string(),
                share: *share,
            });
        }
        if share.exceeds_limit() {
            return Err(ValidationError::AmountTooLarge { amount: *share });
        }
    }

    let actual: Money = shares.iter().map(|(_, share)| *share).sum();
    if actual != amount {
        return Err(ValidationError::AmountMismatch {
            expected: amount,
            actual,
            delta: amount - actual,
        });
    }

    Ok(travelers
        .iter()
        .map(|&traveler_id| {
            let share = shares
                .iter()
                .find(|(t, _)| *t == traveler_id)
                .map(|(_, share)| *share)
                .unwrap_or_default();
            Split::new(traveler_id, share)
        })
        .collect())
}

fn first_duplicate(travelers: &[TravelerId]) -> Option<TravelerId> {
    travelers
        .iter()
        .enumerate()
        .find(|(i, t)| travelers[..*i].contains(*t))
        .map(|(_, t)| *t)
}
