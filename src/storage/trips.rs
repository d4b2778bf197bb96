//! Trip repository for JSON storage
//!
//! Trips are stored together with their traveler roster in trips.json.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Trip, TripId};

use super::file_io::{lock_error, read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TripData {
    trips: Vec<Trip>,
}

/// Repository for trip persistence
pub struct TripRepository {
    path: PathBuf,
    data: RwLock<HashMap<TripId, Trip>>,
}

impl TripRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load trips from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: TripData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(lock_error)?;

        data.clear();
        for trip in file_data.trips {
            data.insert(trip.id, trip);
        }
        Ok(())
    }

    /// Save trips to disk, oldest first
    pub fn save(&self) -> Result<(), LedgerError> {
        let trips = self.get_all()?;
        write_json_atomic(&self.path, &TripData { trips })
    }

    pub fn get(&self, id: TripId) -> Result<Option<Trip>, LedgerError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// All trips ordered by start date
    pub fn get_all(&self) -> Result<Vec<Trip>, LedgerError> {
        let data = self.data.read().map_err(lock_error)?;
        let mut trips: Vec<_> = data.values().cloned().collect();
        trips.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(trips)
    }

    /// Find a trip by name (case-insensitive) or by ID
    pub fn find(&self, identifier: &str) -> Result<Option<Trip>, LedgerError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .values()
            .find(|t| t.name.eq_ignore_ascii_case(identifier) || t.id.matches(identifier))
            .cloned())
    }

    /// Insert or replace a trip
    pub fn upsert(&self, trip: Trip) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(trip.id, trip);
        Ok(())
    }

    pub fn delete(&self, id: TripId) -> Result<bool, LedgerError> {
        let mut data = self.data.write().map_err(lock_error)?;
        Ok(data.remove(&id).is_some())
    }

    /// Check whether another trip already uses `name`
    pub fn name_exists(&self, name: &str, exclude: Option<TripId>) -> Result<bool, LedgerError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .values()
            .any(|t| t.name.eq_ignore_ascii_case(name) && Some(t.id) != exclude))
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Traveler;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn create_test_repo() -> (TempDir, TripRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TripRepository::new(temp_dir.path().join("trips.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_roster_survives_reload() {
        let (temp_dir, repo) = create_test_repo();
        let mut trip = Trip::new("Italy", date(1), date(15));
        trip.add_traveler(Traveler::new("Ana", "#E91E63"));
        trip.add_traveler(Traveler::new("Ben", "#2196F3"));
        let id = trip.id;
        repo.upsert(trip).unwrap();
        repo.save().unwrap();

        let reloaded = TripRepository::new(temp_dir.path().join("trips.json"));
        reloaded.load().unwrap();
        let trip = reloaded.get(id).unwrap().unwrap();
        let names: Vec<_> = trip.travelers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Ana", "Ben"]);
    }

    #[test]
    fn test_find_and_name_exists() {
        let (_temp_dir, repo) = create_test_repo();
        let trip = Trip::new("Japan Spring", date(1), date(10));
        let id = trip.id;
        repo.upsert(trip).unwrap();

        assert_eq!(repo.find("japan spring").unwrap().unwrap().id, id);
        assert!(repo.find("Peru").unwrap().is_none());
        assert!(repo.name_exists("JAPAN SPRING", None).unwrap());
        assert!(!repo.name_exists("Japan Spring", Some(id)).unwrap());
    }

    #[test]
    fn test_get_all_ordered_by_start() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Trip::new("Later", date(20), date(25))).unwrap();
        repo.upsert(Trip::new("Sooner", date(2), date(5))).unwrap();

        let names: Vec<_> = repo.get_all().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["Sooner", "Later"]);
    }
}
