//! Trip and roster display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Stop, Trip};

#[derive(Tabled)]
struct TripRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Dates")]
    dates: String,
    #[tabled(rename = "Days")]
    days: i64,
    #[tabled(rename = "Travelers")]
    travelers: usize,
    #[tabled(rename = "Budget/person")]
    budget: String,
}

#[derive(Tabled)]
struct TravelerRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn date_range(trip: &Trip) -> String {
    format!(
        "{} to {}",
        trip.start_date.format("%Y-%m-%d"),
        trip.end_date.format("%Y-%m-%d")
    )
}

/// Format a list of trips as a table
pub fn format_trip_list(trips: &[Trip], currency: &str) -> String {
    if trips.is_empty() {
        return "No trips found.".to_string();
    }

    let rows = trips.iter().map(|trip| TripRow {
        id: trip.id.to_string(),
        name: trip.name.clone(),
        dates: date_range(trip),
        days: trip.days(),
        travelers: trip.group_size(),
        budget: if trip.budget_per_person.is_zero() {
            "-".to_string()
        } else {
            trip.budget_per_person.format_with_symbol(currency)
        },
    });

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format the roster in order
pub fn format_traveler_list(trip: &Trip) -> String {
    if trip.travelers.is_empty() {
        return format!("No travelers on {} yet.", trip.name);
    }

    let rows = trip
        .travelers
        .iter()
        .enumerate()
        .map(|(i, t)| TravelerRow {
            position: i + 1,
            name: t.name.clone(),
            color: t.color.clone(),
            id: t.id.to_string(),
        });

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format a single trip with its roster and route
pub fn format_trip_details(trip: &Trip, stops: &[Stop], currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Trip: {}\n", trip.name));
    output.push_str(&format!("  ID:        {}\n", trip.id));
    output.push_str(&format!("  Dates:     {} ({} days)\n", date_range(trip), trip.days()));
    if trip.budget_per_person.is_positive() {
        output.push_str(&format!(
            "  Budget:    {} per person\n",
            trip.budget_per_person.format_with_symbol(currency)
        ));
    }

    output.push('\n');
    let names: Vec<_> = trip.travelers.iter().map(|t| t.name.as_str()).collect();
    if names.is_empty() {
        output.push_str("  Travelers: (none)\n");
    } else {
        output.push_str(&format!("  Travelers: {}\n", names.join(", ")));
    }

    if !stops.is_empty() {
        let route: Vec<_> = stops.iter().map(|s| s.name.as_str()).collect();
        output.push_str(&format!("  Route:     {}\n", route.join(" → ")));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        trip.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}
