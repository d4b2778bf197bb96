//! Stop service
//!
//! Route stops are optional tags on expenses. Removing a stop keeps its
//! expenses and moves them to the unassigned bucket.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Stop, TripId};
use crate::storage::Storage;

pub struct StopService<'a> {
    storage: &'a Storage,
}

#[derive(Debug, Clone, Default)]
pub struct AddStopInput {
    pub name: String,
    pub country: String,
    pub arrive: Option<NaiveDate>,
    pub depart: Option<NaiveDate>,
}

impl<'a> StopService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Append a stop to the end of the trip's route
    pub fn add(&self, trip_id: TripId, input: AddStopInput) -> LedgerResult<Stop> {
        let trip = self
            .storage
            .trips
            .get(trip_id)?
            .ok_or_else(|| LedgerError::trip_not_found(trip_id.to_string()))?;

        let name = input.name.trim();
        if self.storage.stops.find(trip_id, name)?.is_some() {
            return Err(LedgerError::Duplicate {
                entity_type: "Stop",
                identifier: name.to_string(),
            });
        }

        let position = self.storage.stops.next_position(trip_id)?;
        let mut stop = Stop::new(trip_id, name, position);
        stop.country = input.country.trim().to_string();
        stop.arrive = input.arrive;
        stop.depart = input.depart;
        stop.validate()
            .map_err(|e| LedgerError::invalid(e.to_string()))?;

        for date in [stop.arrive, stop.depart].into_iter().flatten() {
            if !trip.contains(date) {
                tracing::warn!(stop = %stop.name, %date, "stop date falls outside the trip");
            }
        }

        self.storage.stops.upsert(stop.clone())?;
        self.storage.stops.save()?;
        self.storage.log_create(
            EntityType::Stop,
            stop.id.to_string(),
            Some(stop.to_string()),
            &stop,
        )?;

        Ok(stop)
    }

    /// Stops in route order
    pub fn list(&self, trip_id: TripId) -> LedgerResult<Vec<Stop>> {
        self.storage.stops.get_by_trip(trip_id)
    }

    pub fn resolve(&self, trip_id: TripId, identifier: &str) -> LedgerResult<Stop> {
        self.storage
            .stops
            .find(trip_id, identifier)?
            .ok_or_else(|| LedgerError::stop_not_found(identifier))
    }

    /// Remove a stop. Returns the stop and how many expenses were untagged.
    pub fn remove(&self, trip_id: TripId, identifier: &str) -> LedgerResult<(Stop, usize)> {
        let stop = self.resolve(trip_id, identifier)?;

        let mut untagged = 0;
        for mut expense in self.storage.expenses.get_by_trip(trip_id)? {
            if expense.stop_id == Some(stop.id) {
                expense.stop_id = None;
                expense.updated_at = Utc::now();
                self.storage.expenses.upsert(expense)?;
                untagged += 1;
            }
        }
        self.storage.stops.delete(stop.id)?;

        // Expenses first so a crash in between never leaves a dangling tag
        if untagged > 0 {
            self.storage.expenses.save()?;
        }
        self.storage.stops.save()?;

        self.storage.log_delete(
            EntityType::Stop,
            stop.id.to_string(),
            Some(stop.to_string()),
            &stop,
        )?;
        tracing::info!(stop = %stop.id, untagged, "removed stop");

        Ok((stop, untagged))
    }
}
