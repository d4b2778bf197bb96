//! Traveler CLI commands

use clap::Subcommand;

use crate::display::format_traveler_list;
use crate::error::LedgerResult;
use crate::services::TripService;
use crate::storage::Storage;

use super::resolve_trip;

/// Traveler subcommands
#[derive(Subcommand)]
pub enum TravelerCommands {
    /// Add a traveler to the end of the roster
    Add {
        /// Traveler name
        name: String,
        /// Display color (e.g., "#4CAF50")
        #[arg(short, long)]
        color: Option<String>,
    },
    /// List the roster
    List,
    /// Remove a traveler who has no expenses
    Remove {
        /// Traveler name or ID
        traveler: String,
    },
}

pub fn handle_traveler_command(
    storage: &Storage,
    trip: Option<&str>,
    cmd: TravelerCommands,
) -> LedgerResult<()> {
    let trip = resolve_trip(storage, trip)?;
    let service = TripService::new(storage);

    match cmd {
        TravelerCommands::Add { name, color } => {
            let traveler = service.add_traveler(trip.id, &name, color)?;
            println!("Added {} to {} ({})", traveler.name, trip.name, traveler.id);
        }
        TravelerCommands::List => {
            println!("{}", format_traveler_list(&trip));
        }
        TravelerCommands::Remove { traveler } => {
            let removed = service.remove_traveler(trip.id, &traveler)?;
            println!("Removed {} from {}", removed.name, trip.name);
        }
    }

    Ok(())
}
