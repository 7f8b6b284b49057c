use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db;
use crate::error::Result;
use crate::fmt::{money, truncate};
use crate::models::TxnType;
use crate::settings::load_settings;
use crate::store::{
    get_transaction, list_transactions, set_category, set_notes, TransactionFilter, TransactionRow,
};

const DESCRIPTION_WIDTH: usize = 40;

fn category_label(row: &TransactionRow) -> String {
    match (&row.category, &row.subcategory) {
        (Some(c), Some(s)) => format!("{c} / {s}"),
        (Some(c), None) => c.clone(),
        _ => "\u{2014}".to_string(),
    }
}

fn short_id(id: &str) -> &str {
    &id[..8.min(id.len())]
}

fn headline(row: &TransactionRow) -> String {
    format!("{} {} {}", short_id(&row.txn.id), row.txn.date, row.txn.description)
}

pub fn list(filter: TransactionFilter, limit: Option<usize>) -> Result<()> {
    let settings = load_settings()?;
    let conn = db::open(&settings)?;
    let mut rows = list_transactions(&conn, &filter)?;

    if rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }
    if let Some(n) = limit {
        let skip = rows.len().saturating_sub(n);
        rows.drain(..skip);
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Category", "Notes"]);
    for r in &rows {
        let amount = money(r.txn.amount.abs(), &settings.currency_symbol);
        let amount = match r.txn.txn_type {
            TxnType::Credit => amount.green().to_string(),
            TxnType::Debit => amount.red().to_string(),
        };
        table.add_row(vec![
            Cell::new(short_id(&r.txn.id)),
            Cell::new(&r.txn.date),
            Cell::new(truncate(&r.txn.description, DESCRIPTION_WIDTH)),
            Cell::new(amount),
            Cell::new(category_label(r)),
            Cell::new(&r.txn.notes),
        ]);
    }
    println!("{table}");
    println!("{} transactions", rows.len());
    Ok(())
}

pub fn categorize(
    id: &str,
    category: Option<&str>,
    subcategory: Option<&str>,
    clear: bool,
) -> Result<()> {
    let conn = db::open(&load_settings()?)?;
    let assignment = match (clear, category) {
        (false, Some(cat)) => Some((cat, subcategory)),
        _ => None,
    };
    let full_id = set_category(&conn, id, assignment)?;
    if let Some(row) = get_transaction(&conn, &full_id)? {
        println!("{}  \u{2192}  {}", headline(&row), category_label(&row));
    }
    Ok(())
}

pub fn note(id: &str, text: &str) -> Result<()> {
    let conn = db::open(&load_settings()?)?;
    let full_id = set_notes(&conn, id, text)?;
    if let Some(row) = get_transaction(&conn, &full_id)? {
        println!("{}  notes: {}", headline(&row), row.txn.notes);
    }
    Ok(())
}
