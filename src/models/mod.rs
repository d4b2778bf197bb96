//! Core data models for Trip Ledger
//!
//! Trips with their traveler roster, route stops, expenses with their split
//! rows, and the static budget line items used by the forecast.

pub mod budget_item;
pub mod expense;
pub mod ids;
pub mod money;
pub mod stop;
pub mod traveler;
pub mod trip;

pub use budget_item::{default_line_items, BudgetLineItem, CostBasis};
pub use expense::{Expense, ExpenseCategory, ExpenseKind, Split};
pub use ids::{ExpenseId, StopId, TravelerId, TripId};
pub use money::{Money, MoneyParseError};
pub use stop::Stop;
pub use traveler::Traveler;
pub use trip::Trip;
