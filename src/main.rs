use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trip_ledger::cli::{
    handle_audit_command, handle_expense_command, handle_export_command, handle_forecast_command,
    handle_report_command, handle_stop_command, handle_traveler_command, handle_trip_command,
};
use trip_ledger::config::{paths::LedgerPaths, settings::Settings};
use trip_ledger::storage::{init::initialize_storage, Storage};
use trip_ledger::LedgerError;

#[derive(Parser)]
#[command(
    name = "trip",
    version,
    about = "Shared expense ledger for group trips",
    long_about = "Trip Ledger records who paid what on a group trip, splits every \
                  expense into exact shares, and works out who owes whom."
)]
struct Cli {
    /// Trip to work on (name or ID)
    #[arg(long, global = true, env = "TRIP_LEDGER_TRIP")]
    trip: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the data directory
    Init,

    /// Show current configuration and paths
    Config,

    /// Trip management
    #[command(subcommand)]
    Trip(trip_ledger::cli::TripCommands),

    /// Roster management
    #[command(subcommand)]
    Traveler(trip_ledger::cli::TravelerCommands),

    /// Route stops
    #[command(subcommand)]
    Stop(trip_ledger::cli::StopCommands),

    /// Record and edit expenses
    #[command(subcommand, alias = "exp")]
    Expense(trip_ledger::cli::ExpenseCommands),

    /// Spending, settle-up and budget reports
    #[command(subcommand)]
    Report(trip_ledger::cli::ReportCommands),

    /// Projected trip cost from budget line items
    Forecast(trip_ledger::cli::ForecastArgs),

    /// Export a trip to JSON, YAML or CSV
    #[command(subcommand)]
    Export(trip_ledger::cli::ExportCommands),

    /// Show recent changes
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<LedgerError>() {
                Some(ledger_err) => eprintln!("Error: {}", ledger_err.user_message()),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool, settings: &Settings) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        // RUST_LOG wins over the configured filter
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(cli.verbose, &settings);

    let storage = Storage::open(paths.clone())?;
    let trip = cli.trip.as_deref();

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing Trip Ledger at: {}", paths.base_dir().display());
            if initialize_storage(&paths)? {
                println!("Initialization complete!");
            } else {
                println!("Already initialized.");
            }
            println!();
            println!("Next: trip trip create NAME --start YYYY-MM-DD --end YYYY-MM-DD -T Ana,Ben");
        }
        Some(Commands::Config) => {
            println!("Trip Ledger Configuration");
            println!("=========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:    {}", settings.currency_symbol);
            println!("  Date format:        {}", settings.date_format);
            println!(
                "  Default daily rate: {}",
                settings.format_money(settings.default_daily_rate)
            );
            println!("  Warning threshold:  {}%", settings.warning_threshold_pct);
            println!("  Log filter:         {}", settings.log_filter);
        }
        Some(Commands::Trip(cmd)) => handle_trip_command(&storage, &settings, trip, cmd)?,
        Some(Commands::Traveler(cmd)) => handle_traveler_command(&storage, trip, cmd)?,
        Some(Commands::Stop(cmd)) => handle_stop_command(&storage, trip, cmd)?,
        Some(Commands::Expense(cmd)) => handle_expense_command(&storage, &settings, trip, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, trip, cmd)?,
        Some(Commands::Forecast(args)) => handle_forecast_command(&storage, &settings, trip, args)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, trip, cmd)?,
        Some(Commands::Audit { limit }) => handle_audit_command(&storage, limit)?,
        None => {
            println!("Trip Ledger - shared expenses for group trips");
            println!();
            println!("Run 'trip --help' for usage information.");
        }
    }

    Ok(())
}
