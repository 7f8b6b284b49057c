use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db;
use crate::error::Result;
use crate::fmt::money;
use crate::reports;
use crate::settings::load_settings;
use crate::store::TransactionFilter;

fn signed(val: f64, symbol: &str) -> String {
    if val >= 0.0 {
        money(val, symbol).green().to_string()
    } else {
        money(val, symbol).red().to_string()
    }
}

pub fn monthly(filter: TransactionFilter) -> Result<()> {
    let settings = load_settings()?;
    let conn = db::open(&settings)?;
    let symbol = settings.currency_symbol.as_str();
    let months = reports::monthly_summary(&conn, &filter)?;

    if months.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Month", "Income", "Spending", "Net", "Count"]);
    for m in &months {
        table.add_row(vec![
            Cell::new(&m.month),
            Cell::new(money(m.income, symbol)),
            Cell::new(money(m.spending, symbol)),
            Cell::new(signed(m.net, symbol)),
            Cell::new(m.count),
        ]);
    }
    println!("Monthly Summary\n{table}");
    Ok(())
}

pub fn categories(filter: TransactionFilter) -> Result<()> {
    let settings = load_settings()?;
    let conn = db::open(&settings)?;
    let symbol = settings.currency_symbol.as_str();
    let data = reports::category_breakdown(&conn, &filter)?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Spent", "%", "Count"]);
    for item in &data.categories {
        table.add_row(vec![
            Cell::new(&item.name),
            Cell::new(money(item.total, symbol)),
            Cell::new(format!("{:.1}%", item.pct)),
            Cell::new(item.count),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(data.total, symbol)),
        Cell::new(""),
        Cell::new(""),
    ]);
    println!("Spending by Category\n{table}");
    Ok(())
}

pub fn summary(filter: TransactionFilter) -> Result<()> {
    let settings = load_settings()?;
    let conn = db::open(&settings)?;
    let symbol = settings.currency_symbol.as_str();
    let t = reports::totals(&conn, &filter)?;

    if t.count == 0 {
        println!("No transactions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(vec![Cell::new("Income"), Cell::new(money(t.income, symbol))]);
    table.add_row(vec![Cell::new("Spending"), Cell::new(money(t.spending, symbol))]);
    table.add_row(vec![Cell::new("Net".bold()), Cell::new(signed(t.net, symbol))]);
    table.add_row(vec![Cell::new("Transactions"), Cell::new(t.count)]);
    if let (Some(first), Some(last)) = (&t.first_date, &t.last_date) {
        table.add_row(vec![Cell::new("Period"), Cell::new(format!("{first} to {last}"))]);
    }
    println!("Summary\n{table}");
    Ok(())
}
