//! Traveler model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TravelerId;

/// Palette handed out to travelers in roster order when no color is given
pub const DEFAULT_COLORS: [&str; 8] = [
    "#e76f51", "#2a9d8f", "#e9c46a", "#264653", "#f4a261", "#8ab17d", "#6d597a", "#457b9d",
];

/// A member of the trip roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traveler {
    pub id: TravelerId,

    /// Display name, unique within a trip (case-insensitive)
    pub name: String,

    /// Hex color used to tag this traveler in charts
    #[serde(default)]
    pub color: String,
}

impl Traveler {
    /// Create a new traveler
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: TravelerId::new(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// Default color for the traveler at `position` in the roster
    pub fn default_color(position: usize) -> &'static str {
        DEFAULT_COLORS[position % DEFAULT_COLORS.len()]
    }

    /// Validate the traveler
    pub fn validate(&self) -> Result<(), TravelerValidationError> {
        if self.name.trim().is_empty() {
            return Err(TravelerValidationError::EmptyName);
        }
        if self.name.len() > 50 {
            return Err(TravelerValidationError::NameTooLong(self.name.len()));
        }
        if !self.color.is_empty() && !is_hex_color(&self.color) {
            return Err(TravelerValidationError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#')
        .map(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

impl fmt::Display for Traveler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for travelers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TravelerValidationError {
    #[error("Traveler name cannot be empty")]
    EmptyName,
    #[error("Traveler name too long ({0} chars, max 50)")]
    NameTooLong(usize),
    #[error("Color must look like #RRGGBB, got '{0}'")]
    InvalidColor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_traveler() {
        let t = Traveler::new("Ana", "#2a9d8f");
        assert_eq!(t.name, "Ana");
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            Traveler::new("  ", "").validate(),
            Err(TravelerValidationError::EmptyName)
        );
        assert!(matches!(
            Traveler::new("Ana", "teal").validate(),
            Err(TravelerValidationError::InvalidColor(_))
        ));
        assert!(Traveler::new("Ana", "").validate().is_ok());
    }

    #[test]
    fn test_default_color_wraps() {
        assert_eq!(Traveler::default_color(0), Traveler::default_color(8));
    }
}
