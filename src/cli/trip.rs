//! Trip CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_trip_details, format_trip_list};
use crate::error::LedgerResult;
use crate::models::Money;
use crate::services::{CreateTripInput, StopService, TripService};
use crate::storage::Storage;

use super::{parse_date, parse_money, resolve_trip};

/// Trip subcommands
#[derive(Subcommand)]
pub enum TripCommands {
    /// Create a new trip
    Create {
        /// Trip name
        name: String,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        /// Budget per person (e.g., "1500" or "1500.00")
        #[arg(short, long, default_value = "0")]
        budget: String,
        /// Travelers in roster order (repeat or comma-separate)
        #[arg(short = 'T', long = "traveler", value_delimiter = ',')]
        travelers: Vec<String>,
    },
    /// List all trips
    List,
    /// Show trip details
    Show {
        /// Trip name or ID (defaults to --trip)
        name: Option<String>,
    },
    /// Set the per-person budget
    Budget {
        /// Budget per person
        amount: String,
    },
}

/// Handle a trip command
pub fn handle_trip_command(
    storage: &Storage,
    settings: &Settings,
    trip: Option<&str>,
    cmd: TripCommands,
) -> LedgerResult<()> {
    let service = TripService::new(storage);
    let currency = settings.currency_symbol.as_str();

    match cmd {
        TripCommands::Create {
            name,
            start,
            end,
            budget,
            travelers,
        } => {
            let created = service.create(CreateTripInput {
                name,
                start_date: parse_date(&start)?,
                end_date: parse_date(&end)?,
                budget_per_person: parse_money(&budget)?,
                travelers,
            })?;

            println!("Created trip: {}", created);
            if !created.travelers.is_empty() {
                let names: Vec<_> = created.travelers.iter().map(|t| t.name.as_str()).collect();
                println!("  Travelers: {}", names.join(", "));
            }
            if created.budget_per_person.is_positive() {
                println!(
                    "  Budget: {} per person",
                    created.budget_per_person.format_with_symbol(currency)
                );
            }
            println!("  ID: {}", created.id);
        }

        TripCommands::List => {
            println!("{}", format_trip_list(&service.list()?, currency));
        }

        TripCommands::Show { name } => {
            let found = resolve_trip(storage, name.as_deref().or(trip))?;
            let stops = StopService::new(storage).list(found.id)?;
            print!("{}", format_trip_details(&found, &stops, currency));
        }

        TripCommands::Budget { amount } => {
            let found = resolve_trip(storage, trip)?;
            let budget: Money = parse_money(&amount)?;
            let updated = service.set_budget(found.id, budget)?;
            println!(
                "Budget for {} set to {} per person",
                updated.name,
                updated.budget_per_person.format_with_symbol(currency)
            );
        }
    }

    Ok(())
}
