//! Expense display formatting
//!
//! A register view for listing and a detail view that spells out every
//! traveler's share.

use std::collections::HashMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Expense, Money, Stop, StopId, Trip};
use crate::services::expense::describe_splits;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Stop")]
    stop: String,
    #[tabled(rename = "Paid by")]
    paid_by: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Split")]
    split: String,
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

/// Format a trip's expenses as a register
pub fn format_expense_list(
    trip: &Trip,
    expenses: &[Expense],
    stops: &[Stop],
    currency: &str,
) -> String {
    if expenses.is_empty() {
        return "No expenses found.".to_string();
    }

    let stop_names: HashMap<StopId, &str> = stops.iter().map(|s| (s.id, s.name.as_str())).collect();
    let rows = expenses.iter().map(|e| ExpenseRow {
        id: e.id.to_string(),
        date: e.date.format("%Y-%m-%d").to_string(),
        description: truncate(&e.description, 30),
        category: e.category.to_string(),
        stop: e
            .stop_id
            .and_then(|id| stop_names.get(&id).copied())
            .unwrap_or("-")
            .to_string(),
        paid_by: trip.traveler_name(e.paid_by),
        amount: e.signed_amount().format_with_symbol(currency),
        split: if e.splits.len() == trip.group_size() {
            "all".to_string()
        } else {
            format!("{} of {}", e.splits.len(), trip.group_size())
        },
    });

    let total: Money = expenses.iter().map(Expense::signed_amount).sum();
    let mut output = Table::new(rows).with(Style::rounded()).to_string();
    output.push_str(&format!(
        "\n{} expenses, total {}\n",
        expenses.len(),
        total.format_with_symbol(currency)
    ));
    output
}

/// Format one expense with its split rows
pub fn format_expense_details(
    trip: &Trip,
    expense: &Expense,
    stop: Option<&Stop>,
    currency: &str,
) -> String {
    let fmt = |m: Money| m.format_with_symbol(currency);
    let mut output = String::new();

    output.push_str(&format!("Expense: {}\n", expense.id));
    output.push_str(&format!("Date:        {}\n", expense.date.format("%Y-%m-%d")));
    output.push_str(&format!("Description: {}\n", expense.description));
    if expense.is_refund() {
        output.push_str(&format!("Amount:      {} (refund)\n", fmt(expense.amount)));
    } else {
        output.push_str(&format!("Amount:      {}\n", fmt(expense.amount)));
    }
    output.push_str(&format!("Category:    {}\n", expense.category));
    output.push_str(&format!("Paid by:     {}\n", trip.traveler_name(expense.paid_by)));
    match stop {
        Some(stop) => output.push_str(&format!("Stop:        {}\n", stop)),
        None => output.push_str("Stop:        (unassigned)\n"),
    }
    if !expense.notes.is_empty() {
        output.push_str(&format!("Notes:       {}\n", expense.notes));
    }

    output.push_str("\nShares:\n");
    for (name, share) in describe_splits(trip, &expense.splits) {
        output.push_str(&format!("  {:<20} {:>12}\n", name, fmt(share)));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseKind, Split, Traveler};
    use chrono::NaiveDate;

    fn fixture() -> (Trip, Expense, Stop) {
        let day = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        let mut trip = Trip::new("Italy", day, day);
        for name in ["Ana", "Ben", "Cai"] {
            trip.add_traveler(Traveler::new(name, "#9E9E9E"));
        }
        let stop = Stop::new(trip.id, "Rome", 0);
        let mut expense = Expense::new(
            trip.id,
            "Dinner at a very long named trattoria near the Pantheon",
            Money::from_cents(10_000),
            trip.travelers[0].id,
            day,
        );
        expense.stop_id = Some(stop.id);
        expense.replace_splits(vec![
            Split::new(trip.travelers[0].id, Money::from_cents(5_000)),
            Split::new(trip.travelers[1].id, Money::from_cents(5_000)),
        ]);
        (trip, expense, stop)
    }

    #[test]
    fn test_format_expense_list() {
        let (trip, expense, stop) = fixture();
        let output = format_expense_list(&trip, &[expense], &[stop], "$");

        assert!(output.contains("Rome"));
        assert!(output.contains("Ana"));
        assert!(output.contains("2 of 3"));
        assert!(output.contains('…'));
        assert!(output.contains("1 expenses, total $100.00"));
    }

    #[test]
    fn test_format_expense_details() {
        let (trip, mut expense, stop) = fixture();
        expense.kind = ExpenseKind::Refund;
        let output = format_expense_details(&trip, &expense, Some(&stop), "$");

        assert!(output.contains("$100.00 (refund)"));
        assert!(output.contains("Stop:        Rome"));
        assert!(output.contains("Ben"));
        assert!(output.contains("$50.00"));
        assert!(!output.contains("Cai"));
    }

    #[test]
    fn test_format_empty() {
        let (trip, _, _) = fixture();
        assert!(format_expense_list(&trip, &[], &[], "$").contains("No expenses found"));
    }
}
