//! Trip model
//!
//! A trip is the explicit context every ledger read and write is scoped to.
//! It owns the traveler roster, whose order drives every deterministic
//! tie-break in the ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{TravelerId, TripId};
use super::money::Money;
use super::traveler::Traveler;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,

    pub name: String,

    /// First day of the trip (inclusive)
    pub start_date: NaiveDate,

    /// Last day of the trip (inclusive)
    pub end_date: NaiveDate,

    /// Planned spend per traveler, used for budget health
    #[serde(default)]
    pub budget_per_person: Money,

    /// Roster in display order
    #[serde(default)]
    pub travelers: Vec<Traveler>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Create a new trip with an empty roster
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: TripId::new(),
            name: name.into(),
            start_date,
            end_date,
            budget_per_person: Money::zero(),
            travelers: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of calendar days covered, counting both ends
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn group_size(&self) -> usize {
        self.travelers.len()
    }

    /// Traveler IDs in roster order
    pub fn roster(&self) -> Vec<TravelerId> {
        self.travelers.iter().map(|t| t.id).collect()
    }

    pub fn traveler(&self, id: TravelerId) -> Option<&Traveler> {
        self.travelers.iter().find(|t| t.id == id)
    }

    /// Look a traveler up by name (case-insensitive) or ID
    pub fn find_traveler(&self, identifier: &str) -> Option<&Traveler> {
        let identifier = identifier.trim();
        self.travelers
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(identifier))
            .or_else(|| self.travelers.iter().find(|t| t.id.matches(identifier)))
    }

    /// Display name for a traveler, falling back to the short ID
    pub fn traveler_name(&self, id: TravelerId) -> String {
        self.traveler(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Whether `date` falls within the trip
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn add_traveler(&mut self, traveler: Traveler) {
        self.travelers.push(traveler);
        self.updated_at = Utc::now();
    }

    /// Remove a traveler from the roster, returning it if present
    pub fn remove_traveler(&mut self, id: TravelerId) -> Option<Traveler> {
        let position = self.travelers.iter().position(|t| t.id == id)?;
        self.updated_at = Utc::now();
        Some(self.travelers.remove(position))
    }

    /// Validate the trip
    pub fn validate(&self) -> Result<(), TripValidationError> {
        if self.name.trim().is_empty() {
            return Err(TripValidationError::EmptyName);
        }
        if self.end_date < self.start_date {
            return Err(TripValidationError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.budget_per_person.is_negative() {
            return Err(TripValidationError::NegativeBudget(self.budget_per_person));
        }
        if self.budget_per_person.exceeds_limit() {
            return Err(TripValidationError::BudgetTooLarge(self.budget_per_person));
        }
        for (i, a) in self.travelers.iter().enumerate() {
            if self.travelers[..i]
                .iter()
                .any(|b| b.name.eq_ignore_ascii_case(&a.name))
            {
                return Err(TripValidationError::DuplicateTraveler(a.name.clone()));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} to {})",
            self.name,
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d")
        )
    }
}

/// Validation errors for trips
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TripValidationError {
    #[error("Trip name cannot be empty")]
    EmptyName,
    #[error("Trip ends ({end}) before it starts ({start})")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("Budget per person cannot be negative: {0}")]
    NegativeBudget(Money),
    #[error("Budget per person is larger than {}: {0}", Money::MAX)]
    BudgetTooLarge(Money),
    #[error("Traveler listed more than once: {0}")]
    DuplicateTraveler(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_trip() -> Trip {
        let mut trip = Trip::new("Japan", date(2025, 4, 1), date(2025, 4, 15));
        trip.add_traveler(Traveler::new("Ana", ""));
        trip.add_traveler(Traveler::new("Ben", ""));
        trip
    }

    #[test]
    fn test_days_inclusive() {
        assert_eq!(sample_trip().days(), 15);
    }

    #[test]
    fn test_roster_order() {
        let trip = sample_trip();
        let roster = trip.roster();
        assert_eq!(roster.len(), 2);
        assert_eq!(trip.traveler_name(roster[0]), "Ana");
        assert_eq!(trip.traveler_name(roster[1]), "Ben");
    }

    #[test]
    fn test_find_traveler_case_insensitive() {
        let trip = sample_trip();
        assert_eq!(trip.find_traveler("ben").unwrap().name, "Ben");
        assert!(trip.find_traveler("Cleo").is_none());
    }

    #[test]
    fn test_validate_date_order() {
        let trip = Trip::new("Back to front", date(2025, 4, 10), date(2025, 4, 1));
        assert!(matches!(
            trip.validate(),
            Err(TripValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn test_validate_budget_limit() {
        let mut trip = sample_trip();
        trip.budget_per_person = Money::MAX;
        assert!(trip.validate().is_ok());
        trip.budget_per_person = Money::from_cents(i64::MAX);
        assert!(matches!(
            trip.validate(),
            Err(TripValidationError::BudgetTooLarge(_))
        ));
    }

    #[test]
    fn test_validate_duplicate_names() {
        let mut trip = sample_trip();
        trip.add_traveler(Traveler::new("ANA", ""));
        assert_eq!(
            trip.validate(),
            Err(TripValidationError::DuplicateTraveler("ANA".into()))
        );
    }

    #[test]
    fn test_remove_traveler() {
        let mut trip = sample_trip();
        let ana = trip.roster()[0];
        assert_eq!(trip.remove_traveler(ana).unwrap().name, "Ana");
        assert!(trip.remove_traveler(ana).is_none());
        assert_eq!(trip.group_size(), 1);
    }
}
