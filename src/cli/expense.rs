//! Expense CLI commands
//!
//! Shares are given as `--share NAME=AMOUNT`; naming shares implies a
//! custom split. `--among` narrows an equal split to part of the roster.

use chrono::Local;
use clap::{Subcommand, ValueEnum};

use crate::config::settings::Settings;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::SplitMode;
use crate::models::{ExpenseKind, Money, StopId, TravelerId, Trip};
use crate::services::{CreateExpenseInput, ExpenseService, StopService, UpdateExpenseInput};
use crate::storage::Storage;

use super::{parse_category, parse_date, parse_money, resolve_trip, FilterArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitArg {
    /// Divide evenly, leftover cents to the first travelers
    Equal,
    /// Use the amounts given with --share
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Charge,
    Refund,
}

impl From<KindArg> for ExpenseKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Charge => ExpenseKind::Charge,
            KindArg::Refund => ExpenseKind::Refund,
        }
    }
}

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// What it was for
        description: String,
        /// Amount paid (e.g., "42.50")
        amount: String,
        /// Who paid
        #[arg(short, long)]
        paid_by: String,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Category (food, transport, lodging, activities, shopping, other)
        #[arg(short, long, default_value = "other")]
        category: String,
        /// Route stop this expense belongs to
        #[arg(short, long)]
        stop: Option<String>,
        #[arg(short, long, value_enum, default_value = "charge")]
        kind: KindArg,
        #[arg(short, long, default_value = "")]
        notes: String,
        /// Split mode (custom is implied by --share)
        #[arg(long, value_enum)]
        split: Option<SplitArg>,
        /// Custom share, as NAME=AMOUNT (repeatable)
        #[arg(long = "share")]
        shares: Vec<String>,
        /// Split only among these travelers (repeat or comma-separate)
        #[arg(long, value_delimiter = ',')]
        among: Vec<String>,
    },
    /// Edit an expense; changing amount or split replaces all shares
    Edit {
        /// Expense ID
        expense: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long)]
        paid_by: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, conflicts_with = "no_stop")]
        stop: Option<String>,
        /// Clear the stop
        #[arg(long)]
        no_stop: bool,
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
        #[arg(short, long)]
        notes: Option<String>,
        #[arg(long, value_enum)]
        split: Option<SplitArg>,
        #[arg(long = "share")]
        shares: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        among: Vec<String>,
    },
    /// List expenses
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show an expense with its shares
    Show {
        /// Expense ID
        expense: String,
    },
    /// Delete an expense
    Delete {
        /// Expense ID
        expense: String,
    },
}

pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    trip: Option<&str>,
    cmd: ExpenseCommands,
) -> LedgerResult<()> {
    let trip = resolve_trip(storage, trip)?;
    let service = ExpenseService::new(storage);
    let currency = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            description,
            amount,
            paid_by,
            date,
            category,
            stop,
            kind,
            notes,
            split,
            shares,
            among,
        } => {
            let date = match date {
                Some(date) => parse_date(&date)?,
                None => Local::now().date_naive(),
            };
            let expense = service.create(
                trip.id,
                CreateExpenseInput {
                    description,
                    amount: parse_money(&amount)?,
                    kind: kind.into(),
                    category: parse_category(&category)?,
                    paid_by: traveler_id(&trip, &paid_by)?,
                    date,
                    stop_id: stop_id(storage, &trip, stop.as_deref())?,
                    notes,
                    split: split_mode(&trip, split, &shares)?.unwrap_or(SplitMode::Equal),
                    participants: participants(&trip, &among)?,
                },
            )?;

            println!(
                "Recorded {}: {} paid {}",
                expense.description,
                trip.traveler_name(expense.paid_by),
                expense.amount.format_with_symbol(currency)
            );
            println!("  Date: {}", expense.date.format(&settings.date_format));
            println!("  ID: {}", expense.id);
        }

        ExpenseCommands::Edit {
            expense,
            description,
            amount,
            paid_by,
            date,
            category,
            stop,
            no_stop,
            kind,
            notes,
            split,
            shares,
            among,
        } => {
            let found = service.resolve(trip.id, &expense)?;
            let stop_id = if no_stop {
                Some(None)
            } else if stop.is_some() {
                Some(stop_id(storage, &trip, stop.as_deref())?)
            } else {
                None
            };

            let input = UpdateExpenseInput {
                description,
                amount: amount.as_deref().map(parse_money).transpose()?,
                kind: kind.map(Into::into),
                category: category.as_deref().map(parse_category).transpose()?,
                paid_by: paid_by
                    .as_deref()
                    .map(|name| traveler_id(&trip, name))
                    .transpose()?,
                date: date.as_deref().map(parse_date).transpose()?,
                stop_id,
                notes,
                split: split_mode(&trip, split, &shares)?,
                participants: participants(&trip, &among)?,
            };
            let updated = service.update(trip.id, found.id, input)?;
            println!("Updated expense {}", updated.id);
        }

        ExpenseCommands::List { filter } => {
            let filter = filter.to_filter(storage, trip.id)?;
            let expenses = service.list(trip.id, &filter)?;
            let stops = StopService::new(storage).list(trip.id)?;
            println!("{}", format_expense_list(&trip, &expenses, &stops, currency));
        }

        ExpenseCommands::Show { expense } => {
            let found = service.resolve(trip.id, &expense)?;
            let stop = match found.stop_id {
                Some(id) => storage.stops.get(id)?,
                None => None,
            };
            print!(
                "{}",
                format_expense_details(&trip, &found, stop.as_ref(), currency)
            );
        }

        ExpenseCommands::Delete { expense } => {
            let found = service.resolve(trip.id, &expense)?;
            let deleted = service.delete(trip.id, found.id)?;
            println!("Deleted expense: {}", deleted);
        }
    }

    Ok(())
}

fn traveler_id(trip: &Trip, name: &str) -> LedgerResult<TravelerId> {
    trip.find_traveler(name)
        .map(|t| t.id)
        .ok_or_else(|| LedgerError::traveler_not_found(name))
}

fn stop_id(storage: &Storage, trip: &Trip, stop: Option<&str>) -> LedgerResult<Option<StopId>> {
    stop.map(|name| StopService::new(storage).resolve(trip.id, name).map(|s| s.id))
        .transpose()
}

fn participants(trip: &Trip, among: &[String]) -> LedgerResult<Option<Vec<TravelerId>>> {
    if among.is_empty() {
        return Ok(None);
    }
    among
        .iter()
        .map(|name| traveler_id(trip, name))
        .collect::<LedgerResult<Vec<_>>>()
        .map(Some)
}

/// Parse one `NAME=AMOUNT` share
fn parse_share(trip: &Trip, input: &str) -> LedgerResult<(TravelerId, Money)> {
    let (name, amount) = input.split_once('=').ok_or_else(|| {
        LedgerError::invalid(format!("Invalid share '{}'. Use NAME=AMOUNT", input))
    })?;
    Ok((traveler_id(trip, name)?, parse_money(amount)?))
}

/// The split mode asked for, if any
fn split_mode(
    trip: &Trip,
    split: Option<SplitArg>,
    shares: &[String],
) -> LedgerResult<Option<SplitMode>> {
    match (split, shares.is_empty()) {
        (None, true) => Ok(None),
        (Some(SplitArg::Equal), true) => Ok(Some(SplitMode::Equal)),
        (Some(SplitArg::Equal), false) => Err(LedgerError::invalid(
            "--share cannot be combined with --split equal",
        )),
        (Some(SplitArg::Custom), true) => Err(LedgerError::invalid(
            "--split custom needs at least one --share NAME=AMOUNT",
        )),
        (_, false) => {
            let shares = shares
                .iter()
                .map(|s| parse_share(trip, s))
                .collect::<LedgerResult<Vec<_>>>()?;
            Ok(Some(SplitMode::Custom(shares)))
        }
    }
}
