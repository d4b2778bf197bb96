//! Trip service
//!
//! Trips and their traveler rosters. The roster order fixed here is the
//! order every split, balance and tie-break follows.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, Traveler, Trip, TripId};
use crate::storage::Storage;

pub struct TripService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new trip
#[derive(Debug, Clone)]
pub struct CreateTripInput {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget_per_person: Money,
    /// Initial roster, in order
    pub travelers: Vec<String>,
}

impl<'a> TripService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a trip with an optional starting roster
    pub fn create(&self, input: CreateTripInput) -> LedgerResult<Trip> {
        let name = input.name.trim();
        if self.storage.trips.name_exists(name, None)? {
            return Err(LedgerError::Duplicate {
                entity_type: "Trip",
                identifier: name.to_string(),
            });
        }

        let mut trip = Trip::new(name, input.start_date, input.end_date);
        trip.budget_per_person = input.budget_per_person;
        for traveler_name in &input.travelers {
            let color = Traveler::default_color(trip.travelers.len());
            let traveler = Traveler::new(traveler_name.trim(), color);
            traveler
                .validate()
                .map_err(|e| LedgerError::invalid(e.to_string()))?;
            trip.add_traveler(traveler);
        }
        trip.validate()
            .map_err(|e| LedgerError::invalid(e.to_string()))?;

        self.storage.trips.upsert(trip.clone())?;
        self.storage.trips.save()?;

        self.storage.log_create(
            EntityType::Trip,
            trip.id.to_string(),
            Some(trip.name.clone()),
            &trip,
        )?;
        tracing::info!(trip = %trip.id, travelers = trip.group_size(), "created trip");

        Ok(trip)
    }

    pub fn get(&self, id: TripId) -> LedgerResult<Option<Trip>> {
        self.storage.trips.get(id)
    }

    /// Find a trip by name or ID
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Trip>> {
        self.storage.trips.find(identifier)
    }

    /// Like `find`, but a missing trip is an error
    pub fn resolve(&self, identifier: &str) -> LedgerResult<Trip> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::trip_not_found(identifier))
    }

    pub fn list(&self) -> LedgerResult<Vec<Trip>> {
        self.storage.trips.get_all()
    }

    /// Change the per-person budget
    pub fn set_budget(&self, trip_id: TripId, budget_per_person: Money) -> LedgerResult<Trip> {
        let mut trip = self.require(trip_id)?;
        let before = trip.clone();

        trip.budget_per_person = budget_per_person;
        trip.updated_at = Utc::now();
        trip.validate()
            .map_err(|e| LedgerError::invalid(e.to_string()))?;

        self.storage.trips.upsert(trip.clone())?;
        self.storage.trips.save()?;
        self.storage.log_update(
            EntityType::Trip,
            trip.id.to_string(),
            Some(trip.name.clone()),
            &before,
            &trip,
        )?;

        Ok(trip)
    }

    /// Append a traveler to the end of the roster
    pub fn add_traveler(
        &self,
        trip_id: TripId,
        name: &str,
        color: Option<String>,
    ) -> LedgerResult<Traveler> {
        let mut trip = self.require(trip_id)?;
        let name = name.trim();

        if trip
            .travelers
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(name))
        {
            return Err(LedgerError::Duplicate {
                entity_type: "Traveler",
                identifier: name.to_string(),
            });
        }

        let color =
            color.unwrap_or_else(|| Traveler::default_color(trip.travelers.len()).to_string());
        let traveler = Traveler::new(name, color);
        traveler
            .validate()
            .map_err(|e| LedgerError::invalid(e.to_string()))?;

        trip.add_traveler(traveler.clone());
        self.storage.trips.upsert(trip.clone())?;
        self.storage.trips.save()?;

        self.storage.log_create(
            EntityType::Traveler,
            traveler.id.to_string(),
            Some(format!("{} on {}", traveler.name, trip.name)),
            &traveler,
        )?;
        tracing::info!(trip = %trip.id, traveler = %traveler.id, "added traveler");

        Ok(traveler)
    }

    /// Remove a traveler from the roster.
    ///
    /// Refused while any expense on the trip names them as payer or sharer.
    pub fn remove_traveler(&self, trip_id: TripId, identifier: &str) -> LedgerResult<Traveler> {
        let mut trip = self.require(trip_id)?;
        let traveler_id = trip
            .find_traveler(identifier)
            .map(|t| t.id)
            .ok_or_else(|| LedgerError::traveler_not_found(identifier))?;

        let references = self
            .storage
            .expenses
            .count_referencing_traveler(trip_id, traveler_id)?;
        if references > 0 {
            return Err(LedgerError::InUse {
                entity_type: "Traveler",
                identifier: trip.traveler_name(traveler_id),
                references,
            });
        }

        let removed = trip
            .remove_traveler(traveler_id)
            .ok_or_else(|| LedgerError::traveler_not_found(identifier))?;
        self.storage.trips.upsert(trip.clone())?;
        self.storage.trips.save()?;

        self.storage.log_delete(
            EntityType::Traveler,
            removed.id.to_string(),
            Some(format!("{} on {}", removed.name, trip.name)),
            &removed,
        )?;
        tracing::info!(trip = %trip.id, traveler = %removed.id, "removed traveler");

        Ok(removed)
    }

    fn require(&self, trip_id: TripId) -> LedgerResult<Trip> {
        self.storage
            .trips
            .get(trip_id)?
            .ok_or_else(|| LedgerError::trip_not_found(trip_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Expense, Split};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn italy(travelers: &[&str]) -> CreateTripInput {
        CreateTripInput {
            name: "Italy".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
            budget_per_person: Money::from_units(3_000),
            travelers: travelers.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_keeps_roster_order() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TripService::new(&storage);

        let trip = service.create(italy(&["Ana", "Ben", "Cai"])).unwrap();
        let names: Vec<_> = trip.travelers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Ana", "Ben", "Cai"]);
        assert_ne!(trip.travelers[0].color, trip.travelers[1].color);

        let found = service.resolve("italy").unwrap();
        assert_eq!(found.id, trip.id);
        assert_eq!(storage.audit().read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_trip_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TripService::new(&storage);
        service.create(italy(&["Ana"])).unwrap();

        let err = service.create(italy(&[])).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));
    }

    #[test]
    fn test_invalid_dates_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TripService::new(&storage);
        let mut input = italy(&["Ana"]);
        input.end_date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        assert!(service.create(input).unwrap_err().is_validation());
    }

    #[test]
    fn test_add_and_remove_traveler() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TripService::new(&storage);
        let trip = service.create(italy(&["Ana"])).unwrap();

        let ben = service.add_traveler(trip.id, "Ben", None).unwrap();
        assert!(matches!(
            service.add_traveler(trip.id, "ben", None),
            Err(LedgerError::Duplicate { .. })
        ));

        let removed = service.remove_traveler(trip.id, "Ben").unwrap();
        assert_eq!(removed.id, ben.id);
        assert_eq!(service.get(trip.id).unwrap().unwrap().group_size(), 1);
    }

    #[test]
    fn test_remove_referenced_traveler_refused() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TripService::new(&storage);
        let trip = service.create(italy(&["Ana", "Ben"])).unwrap();
        let (ana, ben) = (trip.travelers[0].id, trip.travelers[1].id);

        let mut expense = Expense::new(trip.id, "Taxi", Money::from_units(20), ana, trip.start_date);
        expense.replace_splits(vec![
            Split::new(ana, Money::from_units(10)),
            Split::new(ben, Money::from_units(10)),
        ]);
        storage.expenses.upsert(expense).unwrap();

        let err = service.remove_traveler(trip.id, "Ben").unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InUse { references: 1, .. }
        ));
        assert_eq!(service.get(trip.id).unwrap().unwrap().group_size(), 2);
    }

    #[test]
    fn test_set_budget() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TripService::new(&storage);
        let trip = service.create(italy(&["Ana"])).unwrap();

        let updated = service.set_budget(trip.id, Money::from_units(2_500)).unwrap();
        assert_eq!(updated.budget_per_person, Money::from_units(2_500));
        assert!(service.set_budget(trip.id, Money::from_units(-1)).is_err());
    }
}
