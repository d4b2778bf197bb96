//! First-run setup
//!
//! Creates the directory layout, the settings file and empty data files so
//! later commands can assume they exist.

use crate::config::paths::LedgerPaths;
use crate::config::settings::Settings;
use crate::error::LedgerError;

use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation.
///
/// Existing files are left alone, so running this twice is harmless.
/// Returns `true` if anything was created.
pub fn initialize_storage(paths: &LedgerPaths) -> Result<bool, LedgerError> {
    paths.ensure_directories()?;
    let mut created = false;

    if !paths.settings_file().exists() {
        Settings::default().save(paths)?;
        created = true;
    }

    let empty_files = [
        (paths.trips_file(), "trips"),
        (paths.stops_file(), "stops"),
        (paths.expenses_file(), "expenses"),
    ];
    for (path, key) in empty_files {
        if !path.exists() {
            let mut doc = serde_json::Map::new();
            doc.insert(key.to_string(), serde_json::Value::Array(Vec::new()));
            write_json_atomic(&path, &doc)?;
            created = true;
        }
    }

    if created {
        tracing::info!(base = %paths.base_dir().display(), "initialized trip ledger storage");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(initialize_storage(&paths).unwrap());
        assert!(paths.is_initialized());
        assert!(paths.trips_file().exists());
        assert!(paths.expenses_file().exists());

        let storage = Storage::open(paths).unwrap();
        assert_eq!(storage.expenses.count().unwrap(), 0);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();
        assert!(!initialize_storage(&paths).unwrap());
    }
}
