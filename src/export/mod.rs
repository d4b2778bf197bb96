//! Export for Trip Ledger
//!
//! - CSV: expense and split rows (spreadsheet-compatible)
//! - JSON: machine-readable full trip export
//! - YAML: human-readable full trip export

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::export_expenses_csv;
pub use json::{export_trip_json, ExportMetadata, TripExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_trip_yaml;
