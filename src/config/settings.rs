//! User settings for Trip Ledger
//!
//! Display preferences and forecast defaults. Nothing in here affects how the
//! ledger itself computes splits or balances.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::ledger::DEFAULT_WARNING_BP;
use crate::models::Money;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol for display
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Daily rate used by the forecast when none is given
    #[serde(default = "default_daily_rate")]
    pub default_daily_rate: Money,

    /// Budget share (percent) at which health turns to a warning
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_pct: u8,

    /// `tracing` filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_daily_rate() -> Money {
    Money::from_units(150)
}

fn default_warning_threshold() -> u8 {
    (DEFAULT_WARNING_BP / 100) as u8
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_daily_rate: default_daily_rate(),
            warning_threshold_pct: default_warning_threshold(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Warning threshold in basis points
    pub fn warning_bp(&self) -> i64 {
        i64::from(self.warning_threshold_pct) * 100
    }

    /// Format an amount with the configured currency symbol
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| LedgerError::Config(format!("Failed to parse settings file: {}", e)))?;

        if settings.warning_threshold_pct == 0 || settings.warning_threshold_pct > 100 {
            return Err(LedgerError::Config(format!(
                "warning_threshold_pct must be between 1 and 100, got {}",
                settings.warning_threshold_pct
            )));
        }

        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
