//! Reports for Trip Ledger
//!
//! Each report resolves names up front so it can be printed to the terminal
//! or written as CSV without going back to storage.

pub mod budget;
pub mod forecast;
pub mod settle_up;
pub mod spending;

pub use budget::BudgetReport;
pub use forecast::ForecastReport;
pub use settle_up::{BalanceRow, SettleUpReport, TransferRow};
pub use spending::{SpendingReport, SpendingRow};

use crate::error::LedgerError;

/// Render basis points as a percentage with one decimal ("42.5%")
pub(crate) fn percent_label(bp: Option<i64>) -> String {
    match bp {
        Some(bp) => {
            // Round to tenths of a percent, half away from zero
            let tenths = (bp.abs() + 5) / 10;
            let sign = if bp < 0 { "-" } else { "" };
            format!("{}{}.{}%", sign, tenths / 10, tenths % 10)
        }
        None => "-".to_string(),
    }
}

pub(crate) fn csv_error(err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(format!("Failed to write CSV: {}", err))
}
