//! YAML export of a whole trip, for reading by humans

use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::export::json::TripExport;
use crate::models::TripId;
use crate::storage::Storage;

/// Write a trip as YAML with a short comment header
pub fn export_trip_yaml<W: Write>(
    storage: &Storage,
    trip_id: TripId,
    writer: &mut W,
) -> LedgerResult<()> {
    let export = TripExport::from_storage(storage, trip_id)?;
    export.validate().map_err(LedgerError::Export)?;

    let header = format!(
        "# Trip Ledger export: {}\n# Generated: {}\n# App Version: {}\n\n",
        export.trip.name, export.exported_at, export.app_version
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| LedgerError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::json::tests::sample_trip;

    #[test]
    fn test_yaml_export() {
        let (_temp_dir, storage, trip) = sample_trip();
        let mut out = Vec::new();
        export_trip_yaml(&storage, trip.id, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("# Trip Ledger export: Portugal"));
        assert!(text.contains("Lisbon"));

        // Comment lines are ignored by YAML parsers
        let parsed: TripExport = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed.expenses.len(), 2);
        assert!(parsed.validate().is_ok());
    }
}
