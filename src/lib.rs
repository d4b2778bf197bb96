//! Trip Ledger - shared expense ledger for group trips
//!
//! Records what each traveler paid during a trip, splits every expense into
//! exact per-traveler shares, and answers the usual questions: who spent
//! what where, who owes whom, and whether the group is on budget.
//!
//! # Architecture
//!
//! - `ledger`: pure split, aggregation, settle-up and forecast functions
//! - `models`: trips, travelers, stops, expenses, money and IDs
//! - `storage`: JSON file repositories
//! - `services`: business rules around storage and the ledger core
//! - `reports`, `display`, `export`: output for the terminal and for files
//! - `audit`: append-only log of every change
//! - `config`: paths and user settings
//! - `cli`: command handlers for the `trip` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use trip_ledger::config::{paths::LedgerPaths, settings::Settings};
//! use trip_ledger::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
