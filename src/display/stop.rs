//! Route display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Stop;

#[derive(Tabled)]
struct StopRow {
    #[tabled(rename = "#")]
    position: u32,
    #[tabled(rename = "Stop")]
    name: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Arrive")]
    arrive: String,
    #[tabled(rename = "Depart")]
    depart: String,
    #[tabled(rename = "Nights")]
    nights: String,
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Format the route in order
pub fn format_stop_list(stops: &[Stop]) -> String {
    if stops.is_empty() {
        return "No stops on this trip yet.".to_string();
    }

    let rows = stops.iter().enumerate().map(|(i, stop)| StopRow {
        position: i as u32 + 1,
        name: stop.name.clone(),
        country: stop.country.clone(),
        arrive: optional(stop.arrive),
        depart: optional(stop.depart),
        nights: optional(stop.nights()),
    });

    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TripId;
    use chrono::NaiveDate;

    #[test]
    fn test_format_stop_list() {
        let trip_id = TripId::new();
        let mut lisbon = Stop::new(trip_id, "Lisbon", 0);
        lisbon.arrive = NaiveDate::from_ymd_opt(2025, 9, 1);
        lisbon.depart = NaiveDate::from_ymd_opt(2025, 9, 4);
        let porto = Stop::new(trip_id, "Porto", 1);

        let output = format_stop_list(&[lisbon, porto]);
        assert!(output.contains("Lisbon"));
        assert!(output.contains("2025-09-04"));
        assert!(output.contains("Nights"));
        assert!(output.contains('3'));
    }

    #[test]
    fn test_format_empty() {
        assert!(format_stop_list(&[]).contains("No stops"));
    }
}
