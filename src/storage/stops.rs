//! Stop repository for JSON storage
//!
//! Manages loading and saving route stops to stops.json, indexed by trip.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Stop, StopId, TripId};

use super::file_io::{lock_error, read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct StopData {
    stops: Vec<Stop>,
}

pub struct StopRepository {
    path: PathBuf,
    data: RwLock<HashMap<StopId, Stop>>,
    /// Index: trip_id -> stop_ids
    by_trip: RwLock<HashMap<TripId, Vec<StopId>>>,
}

impl StopRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_trip: RwLock::new(HashMap::new()),
        }
    }

    /// Load stops from disk and rebuild the trip index
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: StopData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_trip = self.by_trip.write().map_err(lock_error)?;
        data.clear();
        by_trip.clear();

        for stop in file_data.stops {
            by_trip.entry(stop.trip_id).or_default().push(stop.id);
            data.insert(stop.id, stop);
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self.data.read().map_err(lock_error)?;

        let mut stops: Vec<_> = data.values().cloned().collect();
        stops.sort_by(|a, b| {
            a.trip_id
                .cmp(&b.trip_id)
                .then(a.position.cmp(&b.position))
        });

        write_json_atomic(&self.path, &StopData { stops })
    }

    pub fn get(&self, id: StopId) -> Result<Option<Stop>, LedgerError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// Stops for a trip in route order
    pub fn get_by_trip(&self, trip_id: TripId) -> Result<Vec<Stop>, LedgerError> {
        let data = self.data.read().map_err(lock_error)?;
        let by_trip = self.by_trip.read().map_err(lock_error)?;

        let ids = by_trip.get(&trip_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut stops: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        stops.sort_by_key(|s| s.position);
        Ok(stops)
    }

    /// Find a stop on a trip by name (case-insensitive) or ID
    pub fn find(&self, trip_id: TripId, identifier: &str) -> Result<Option<Stop>, LedgerError> {
        Ok(self
            .get_by_trip(trip_id)?
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(identifier) || s.id.matches(identifier)))
    }

    /// Position for the next stop appended to a trip's route
    pub fn next_position(&self, trip_id: TripId) -> Result<u32, LedgerError> {
        Ok(self
            .get_by_trip(trip_id)?
            .last()
            .map(|s| s.position + 1)
            .unwrap_or(0))
    }

    pub fn upsert(&self, stop: Stop) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_trip = self.by_trip.write().map_err(lock_error)?;

        if let Some(old) = data.get(&stop.id) {
            if let Some(ids) = by_trip.get_mut(&old.trip_id) {
                ids.retain(|&id| id != stop.id);
            }
        }
        by_trip.entry(stop.trip_id).or_default().push(stop.id);
        data.insert(stop.id, stop);
        Ok(())
    }

    pub fn delete(&self, id: StopId) -> Result<bool, LedgerError> {
        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_trip = self.by_trip.write().map_err(lock_error)?;

        match data.remove(&id) {
            Some(stop) => {
                if let Some(ids) = by_trip.get_mut(&stop.trip_id) {
                    ids.retain(|&sid| sid != id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove every stop belonging to a trip
    pub fn delete_by_trip(&self, trip_id: TripId) -> Result<usize, LedgerError> {
        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_trip = self.by_trip.write().map_err(lock_error)?;

        let ids = by_trip.remove(&trip_id).unwrap_or_default();
        for id in &ids {
            data.remove(id);
        }
        Ok(ids.len())
    }
}
