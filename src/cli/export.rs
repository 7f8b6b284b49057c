use std::io::Write;

use serde::Serialize;

use crate::db;
use crate::error::Result;
use crate::models::TxnType;
use crate::settings::load_settings;
use crate::store::{list_transactions, TransactionFilter};

#[derive(Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    date: &'a str,
    value_date: &'a str,
    description: &'a str,
    reference: &'a str,
    debit: f64,
    credit: f64,
    balance: f64,
    amount: f64,
    #[serde(rename = "type")]
    txn_type: TxnType,
    category: &'a str,
    subcategory: &'a str,
    notes: &'a str,
}

pub fn run(filter: TransactionFilter, output: Option<String>) -> Result<()> {
    let conn = db::open(&load_settings()?)?;
    let rows = list_transactions(&conn, &filter)?;

    let sink: Box<dyn Write> = match &output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(sink);
    for r in &rows {
        writer.serialize(ExportRow {
            id: &r.txn.id,
            date: &r.txn.date,
            value_date: r.txn.value_date.as_deref().unwrap_or(""),
            description: &r.txn.description,
            reference: &r.txn.reference,
            debit: r.txn.debit,
            credit: r.txn.credit,
            balance: r.txn.balance,
            amount: r.txn.amount,
            txn_type: r.txn.txn_type,
            category: r.category.as_deref().unwrap_or(""),
            subcategory: r.subcategory.as_deref().unwrap_or(""),
            notes: &r.txn.notes,
        })?;
    }
    writer.flush()?;

    if let Some(path) = output {
        tracing::info!(rows = rows.len(), path = %path, "exported transactions");
        eprintln!("Wrote {} transactions to {path}", rows.len());
    }
    Ok(())
}
