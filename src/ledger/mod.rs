//! The trip ledger core
//!
//! Pure, synchronous functions over a snapshot of a trip's expenses:
//!
//! - `split`: exact per-traveler shares for one expense
//! - `aggregate`: spend by payer, stop, day and category
//! - `balance`: net balances and settle-up transfers
//! - `forecast`: projected trip cost, budget health and burn rate
//!
//! Nothing here reads storage or keeps state, so every function can be
//! called concurrently from any number of readers.

pub mod aggregate;
pub mod balance;
pub mod forecast;
pub mod split;

pub use aggregate::{aggregate, Bucket, LedgerFilter, LedgerView, StopKey};
pub use balance::{resolve_balances, settle_up, NetBalance, Settlement, Transfer};
pub use forecast::{
    budget_health, budget_health_with_threshold, burn_rate, forecast, BudgetHealth, BudgetStatus,
    BurnRate, Forecast, ForecastLine, ForecastParams, DEFAULT_WARNING_BP,
};
pub use split::{compute_splits, SplitMode};
