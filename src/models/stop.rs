//! Stop model
//!
//! A stop is one city or segment of the route. The ledger only uses it as a
//! grouping dimension.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{StopId, TripId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,

    pub trip_id: TripId,

    /// City or segment name
    pub name: String,

    #[serde(default)]
    pub country: String,

    /// Position in the route (0-based)
    pub position: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrive: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depart: Option<NaiveDate>,
}

impl Stop {
    pub fn new(trip_id: TripId, name: impl Into<String>, position: u32) -> Self {
        Self {
            id: StopId::new(),
            trip_id,
            name: name.into(),
            country: String::new(),
            position,
            arrive: None,
            depart: None,
        }
    }

    /// Nights spent at this stop, when both dates are known
    pub fn nights(&self) -> Option<i64> {
        match (self.arrive, self.depart) {
            (Some(a), Some(d)) => Some((d - a).num_days()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), StopValidationError> {
        if self.name.trim().is_empty() {
            return Err(StopValidationError::EmptyName);
        }
        if let (Some(arrive), Some(depart)) = (self.arrive, self.depart) {
            if depart < arrive {
                return Err(StopValidationError::DepartBeforeArrive { arrive, depart });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}, {}", self.name, self.country)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StopValidationError {
    #[error("Stop name cannot be empty")]
    EmptyName,
    #[error("Departure ({depart}) is before arrival ({arrive})")]
    DepartBeforeArrive { arrive: NaiveDate, depart: NaiveDate },
}
