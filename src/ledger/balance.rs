//! Balance resolution and settle-up
//!
//! Net balance per traveler is what they paid minus what they owe. Positive
//! means the group owes them. Settling up greedily matches the largest
//! creditor with the largest debtor until everyone is at zero.

use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Expense, Money, TravelerId};

/// Paid, owed and net totals for one traveler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetBalance {
    pub traveler_id: TravelerId,
    pub paid: Money,
    pub owed: Money,
    /// `paid - owed`
    pub net: Money,
}

/// One settle-up payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub from: TravelerId,
    pub to: TravelerId,
    pub amount: Money,
}

/// Net balances in roster order plus the transfers that clear them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub balances: Vec<NetBalance>,
    pub transfers: Vec<Transfer>,
}

impl Settlement {
    pub fn net_of(&self, traveler_id: TravelerId) -> Option<Money> {
        self.balances
            .iter()
            .find(|b| b.traveler_id == traveler_id)
            .map(|b| b.net)
    }

    /// Whether nobody owes anybody
    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Total money changing hands
    pub fn volume(&self) -> Money {
        self.transfers.iter().map(|t| t.amount).sum()
    }
}

/// Compute net balances and a minimal-count transfer list.
///
/// `roster` fixes the output order and every tie-break. Fails with
/// `InternalInconsistency` when the stored data breaks a ledger invariant:
/// an expense whose splits do not add up, a traveler missing from the
/// roster, or nets that do not sum to zero.
pub fn resolve_balances(expenses: &[Expense], roster: &[TravelerId]) -> LedgerResult<Settlement> {
    let mut balances: Vec<NetBalance> = roster
        .iter()
        .map(|&traveler_id| NetBalance {
            traveler_id,
            paid: Money::zero(),
            owed: Money::zero(),
            net: Money::zero(),
        })
        .collect();

    for expense in expenses {
        let splits_total = expense.splits_total();
        if splits_total != expense.amount {
            return Err(inconsistent(format!(
                "expense {} splits total {} but amount is {}",
                expense.id, splits_total, expense.amount
            )));
        }

        let payer = slot(&mut balances, expense.paid_by).ok_or_else(|| {
            inconsistent(format!(
                "expense {} paid by {} who is not on the roster",
                expense.id, expense.paid_by
            ))
        })?;
        payer.paid += expense.signed_amount();

        for split in &expense.splits {
            let share = expense.signed_share(split);
            let sharer = slot(&mut balances, split.traveler_id).ok_or_else(|| {
                inconsistent(format!(
                    "expense {} splits to {} who is not on the roster",
                    expense.id, split.traveler_id
                ))
            })?;
            sharer.owed += share;
        }
    }

    for balance in &mut balances {
        balance.net = balance.paid - balance.owed;
    }

    let net_sum: Money = balances.iter().map(|b| b.net).sum();
    if !net_sum.is_zero() {
        return Err(inconsistent(format!("net balances sum to {}", net_sum)));
    }

    let nets: Vec<Money> = balances.iter().map(|b| b.net).collect();
    let transfers = settle_up(roster, nets)?;

    tracing::debug!(
        travelers = roster.len(),
        expenses = expenses.len(),
        transfers = transfers.len(),
        "resolved balances"
    );

    Ok(Settlement {
        balances,
        transfers,
    })
}

/// Greedy largest-creditor / largest-debtor matching.
///
/// Each round zeroes at least one traveler, so there are at most `N - 1`
/// transfers. Ties go to the earlier roster position.
pub fn settle_up(roster: &[TravelerId], mut nets: Vec<Money>) -> LedgerResult<Vec<Transfer>> {
    if nets.len() != roster.len() {
        return Err(inconsistent(format!(
            "{} balances for a roster of {}",
            nets.len(),
            roster.len()
        )));
    }
    let net_sum: Money = nets.iter().sum();
    if !net_sum.is_zero() {
        return Err(inconsistent(format!("net balances sum to {}", net_sum)));
    }

    let mut transfers = Vec::new();

    loop {
        let creditor = extreme(&nets, |candidate, best| candidate > best, Money::is_positive);
        let debtor = extreme(&nets, |candidate, best| candidate < best, Money::is_negative);

        let (creditor, debtor) = match (creditor, debtor) {
            (Some(c), Some(d)) => (c, d),
            (None, None) => break,
            // With a zero sum, one side cannot be empty while the other isn't
            _ => return Err(inconsistent("unmatched balance during settle-up".into())),
        };

        let amount = nets[creditor].min(nets[debtor].abs());
        nets[creditor] -= amount;
        nets[debtor] += amount;

        transfers.push(Transfer {
            from: roster[debtor],
            to: roster[creditor],
            amount,
        });

        if transfers.len() >= roster.len() {
            return Err(inconsistent("settle-up did not converge".into()));
        }
    }

    Ok(transfers)
}

/// Index of the most extreme qualifying balance, first one wins on ties
fn extreme(
    nets: &[Money],
    better: impl Fn(Money, Money) -> bool,
    qualifies: impl Fn(&Money) -> bool,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, net) in nets.iter().enumerate() {
        if !qualifies(net) {
            continue;
        }
        match best {
            Some(b) if !better(*net, nets[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

fn slot(balances: &mut [NetBalance], traveler_id: TravelerId) -> Option<&mut NetBalance> {
    balances.iter_mut().find(|b| b.traveler_id == traveler_id)
}

fn inconsistent(detail: String) -> LedgerError {
    tracing::error!(detail = %detail, "ledger invariant violated");
    LedgerError::InternalInconsistency(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::split::{compute_splits, SplitMode};
    use crate::models::{ExpenseKind, Split, TripId};
    use chrono::NaiveDate;

    fn roster(n: usize) -> Vec<TravelerId> {
        (0..n).map(|_| TravelerId::new()).collect()
    }

    fn equal_expense(cents: i64, payer: TravelerId, sharers: &[TravelerId]) -> Expense {
        let mut e = Expense::new(
            TripId::new(),
            "item",
            Money::from_cents(cents),
            payer,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        );
        e.splits = compute_splits(e.amount, sharers, &SplitMode::Equal).unwrap();
        e
    }

    #[test]
    fn test_one_payer_three_way() {
        let r = roster(3);
        let (a, b, c) = (r[0], r[1], r[2]);
        let expenses = vec![equal_expense(9_000, a, &r)];

        let settlement = resolve_balances(&expenses, &r).unwrap();

        assert_eq!(settlement.net_of(a), Some(Money::from_cents(6_000)));
        assert_eq!(settlement.net_of(b), Some(Money::from_cents(-3_000)));
        assert_eq!(settlement.net_of(c), Some(Money::from_cents(-3_000)));
        assert_eq!(
            settlement.transfers,
            vec![
                Transfer {
                    from: b,
                    to: a,
                    amount: Money::from_cents(3_000)
                },
                Transfer {
                    from: c,
                    to: a,
                    amount: Money::from_cents(3_000)
                },
            ]
        );
    }

    #[test]
    fn test_balances_in_roster_order_with_paid_and_owed() {
        let r = roster(2);
        let expenses = vec![
            equal_expense(1_000, r[1], &r),
            equal_expense(3_000, r[0], &r),
        ];
        let settlement = resolve_balances(&expenses, &r).unwrap();

        assert_eq!(settlement.balances[0].traveler_id, r[0]);
        assert_eq!(settlement.balances[0].paid, Money::from_cents(3_000));
        assert_eq!(settlement.balances[0].owed, Money::from_cents(2_000));
        assert_eq!(settlement.balances[0].net, Money::from_cents(1_000));
        assert_eq!(settlement.transfers.len(), 1);
        assert_eq!(settlement.transfers[0].from, r[1]);
    }

    #[test]
    fn test_empty_ledger_is_settled() {
        let r = roster(3);
        let settlement = resolve_balances(&[], &r).unwrap();
        assert!(settlement.is_settled());
        assert!(settlement.balances.iter().all(|b| b.net.is_zero()));
    }

    #[test]
    fn test_largest_pairs_first() {
        let r = roster(4);
        let nets = vec![
            Money::from_cents(-500),
            Money::from_cents(700),
            Money::from_cents(-1_000),
            Money::from_cents(800),
        ];
        let transfers = settle_up(&r, nets).unwrap();

        assert_eq!(transfers[0].from, r[2]);
        assert_eq!(transfers[0].to, r[3]);
        assert_eq!(transfers[0].amount, Money::from_cents(800));
        assert!(transfers.len() <= 3);
        let volume: Money = transfers.iter().map(|t| t.amount).sum();
        assert_eq!(volume, Money::from_cents(1_500));
    }

    #[test]
    fn test_ties_break_by_roster_order() {
        let r = roster(4);
        let nets = vec![
            Money::from_cents(100),
            Money::from_cents(100),
            Money::from_cents(-100),
            Money::from_cents(-100),
        ];
        let transfers = settle_up(&r, nets).unwrap();
        assert_eq!(
            transfers,
            vec![
                Transfer {
                    from: r[2],
                    to: r[0],
                    amount: Money::from_cents(100)
                },
                Transfer {
                    from: r[3],
                    to: r[1],
                    amount: Money::from_cents(100)
                },
            ]
        );
    }

    #[test]
    fn test_refund_reverses_balance() {
        let r = roster(2);
        let mut refund = equal_expense(1_000, r[0], &r);
        refund.kind = ExpenseKind::Refund;
        let expenses = vec![equal_expense(3_000, r[0], &r), refund];

        let settlement = resolve_balances(&expenses, &r).unwrap();
        assert_eq!(settlement.net_of(r[0]), Some(Money::from_cents(1_000)));
        assert_eq!(settlement.net_of(r[1]), Some(Money::from_cents(-1_000)));
    }

    #[test]
    fn test_corrupt_split_is_internal_error() {
        let r = roster(2);
        let mut e = equal_expense(1_000, r[0], &r);
        e.splits[0] = Split::new(r[0], Money::from_cents(1));
        let err = resolve_balances(&[e], &r).unwrap_err();
        assert!(err.is_internal());
        assert_eq!(err.user_message(), "Ledger error, please reload.");
    }

    #[test]
    fn test_unknown_traveler_is_internal_error() {
        let r = roster(2);
        let outsider = TravelerId::new();
        let e = equal_expense(1_000, outsider, &r);
        assert!(resolve_balances(&[e], &r).unwrap_err().is_internal());
    }

    #[test]
    fn test_unbalanced_nets_rejected() {
        let r = roster(2);
        let nets = vec![Money::from_cents(100), Money::from_cents(-99)];
        assert!(settle_up(&r, nets).unwrap_err().is_internal());
    }
}
