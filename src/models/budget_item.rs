//! Budget line items
//!
//! Static cost reference data for the trip forecast. Line items are not
//! stored per trip; the defaults below ship with the binary and a JSON file
//! of the same shape can be passed in instead.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// How a line item's cost scales with the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", content = "amount", rename_all = "snake_case")]
pub enum CostBasis {
    /// One cost for the whole group, divided evenly per person
    SharedTotal(Money),
    /// Fixed cost for each traveler
    PerPerson(Money),
    /// Daily rate for each traveler. `None` follows the adjustable daily
    /// rate passed to the forecast.
    PerPersonPerDay(Option<Money>),
}

impl CostBasis {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SharedTotal(_) => "shared",
            Self::PerPerson(_) => "per person",
            Self::PerPersonPerDay(_) => "per person / day",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLineItem {
    pub category: String,

    pub cost: CostBasis,

    #[serde(default)]
    pub notes: String,
}

impl BudgetLineItem {
    pub fn new(category: impl Into<String>, cost: CostBasis) -> Self {
        Self {
            category: category.into(),
            cost,
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Whether this item follows the adjustable daily rate
    pub fn uses_daily_rate(&self) -> bool {
        matches!(self.cost, CostBasis::PerPersonPerDay(None))
    }
}

impl fmt::Display for BudgetLineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.category, self.cost.label())
    }
}

/// Built-in cost model for a multi-city group trip
pub fn default_line_items() -> Vec<BudgetLineItem> {
    vec![
        BudgetLineItem::new("Flights", CostBasis::PerPerson(Money::from_units(1_200)))
            .with_notes("Round trip, economy"),
        BudgetLineItem::new("Accommodation", CostBasis::SharedTotal(Money::from_units(4_500)))
            .with_notes("Apartments and ryokan for the whole group"),
        BudgetLineItem::new("Rail pass", CostBasis::PerPerson(Money::from_units(450)))
            .with_notes("14-day pass"),
        BudgetLineItem::new("Travel insurance", CostBasis::PerPerson(Money::from_units(90))),
        BudgetLineItem::new("Daily spending", CostBasis::PerPersonPerDay(None))
            .with_notes("Food, local transport, entry fees"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_one_daily_item() {
        let items = default_line_items();
        assert_eq!(items.iter().filter(|i| i.uses_daily_rate()).count(), 1);
    }

    #[test]
    fn test_serde_shape() {
        let item = BudgetLineItem::new("Flights", CostBasis::PerPerson(Money::from_cents(120_000)));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["cost"]["basis"], "per_person");
        assert_eq!(json["cost"]["amount"], 120_000);

        let daily: BudgetLineItem = serde_json::from_str(
            r#"{"category":"Daily","cost":{"basis":"per_person_per_day","amount":null}}"#,
        )
        .unwrap();
        assert!(daily.uses_daily_rate());
    }
}
