//! Route stop CLI commands

use clap::Subcommand;

use crate::display::format_stop_list;
use crate::error::LedgerResult;
use crate::services::{AddStopInput, StopService};
use crate::storage::Storage;

use super::{parse_optional_date, resolve_trip};

/// Stop subcommands
#[derive(Subcommand)]
pub enum StopCommands {
    /// Add a stop to the end of the route
    Add {
        /// Stop name (usually a city)
        name: String,
        #[arg(long, default_value = "")]
        country: String,
        /// Arrival date (YYYY-MM-DD)
        #[arg(long)]
        arrive: Option<String>,
        /// Departure date (YYYY-MM-DD)
        #[arg(long)]
        depart: Option<String>,
    },
    /// List the route in order
    List,
    /// Remove a stop; its expenses become unassigned
    Remove {
        /// Stop name or ID
        stop: String,
    },
}

pub fn handle_stop_command(
    storage: &Storage,
    trip: Option<&str>,
    cmd: StopCommands,
) -> LedgerResult<()> {
    let trip = resolve_trip(storage, trip)?;
    let service = StopService::new(storage);

    match cmd {
        StopCommands::Add {
            name,
            country,
            arrive,
            depart,
        } => {
            let stop = service.add(
                trip.id,
                AddStopInput {
                    name,
                    country,
                    arrive: parse_optional_date(arrive.as_deref())?,
                    depart: parse_optional_date(depart.as_deref())?,
                },
            )?;
            println!("Added stop {} to {}", stop, trip.name);
        }
        StopCommands::List => {
            println!("{}", format_stop_list(&service.list(trip.id)?));
        }
        StopCommands::Remove { stop } => {
            let (removed, untagged) = service.remove(trip.id, &stop)?;
            println!("Removed stop {}", removed.name);
            if untagged > 0 {
                println!("  {} expense(s) moved to unassigned", untagged);
            }
        }
    }

    Ok(())
}
