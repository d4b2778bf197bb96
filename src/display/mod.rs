//! Display formatting for terminal output
//!
//! Tables for trips, rosters, stops and expenses, plus detail views.

pub mod expense;
pub mod stop;
pub mod trip;

pub use expense::{format_expense_details, format_expense_list};
pub use stop::format_stop_list;
pub use trip::{format_traveler_list, format_trip_details, format_trip_list};
