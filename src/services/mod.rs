//! Service layer for Trip Ledger
//!
//! Business rules on top of the storage layer: lookups, cross-record checks,
//! persistence and audit logging around the pure ledger core.

pub mod expense;
pub mod ledger;
pub mod stop;
pub mod trip;

pub use expense::{CreateExpenseInput, ExpenseService, UpdateExpenseInput};
pub use ledger::{LedgerService, TripSnapshot};
pub use stop::{AddStopInput, StopService};
pub use trip::{CreateTripInput, TripService};
