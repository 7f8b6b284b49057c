//! Tab-separated bank statement parser.
//!
//! The pipeline is: collapse quoted newlines, find the header row by column
//! semantics, then tokenize, map and normalize every following line. Rows
//! without a usable date or description are dropped and counted, never
//! reported as errors. Everything here is pure; no I/O, no shared state.

pub mod fields;
pub mod header;
pub mod lines;

use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::Transaction;

pub use fields::{clean_description, parse_amount, parse_date};
pub use header::ColumnRoles;

use fields::{map_row, normalize_record, ColumnMap};
use header::locate_header;
use lines::{normalize_lines, tokenize_line};

/// A parsed statement.
#[derive(Debug)]
pub struct Statement {
    /// Index of the header among the non-blank lines.
    pub header_index: usize,
    pub header: Vec<String>,
    /// Transactions in file order.
    pub transactions: Vec<Transaction>,
    /// Non-blank data rows that were rejected.
    pub dropped: usize,
}

/// Parse a whole statement export.
///
/// Fails when there are fewer than two non-blank lines, or when no data row
/// yields a transaction (typically because no real header was found and
/// the first line was used in its place).
pub fn parse_statement(text: &str, roles: &ColumnRoles) -> Result<Statement> {
    let normalized = normalize_lines(text);
    let lines: Vec<&str> = normalized.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(AppError::TooFewLines(lines.len()));
    }

    let (header_index, header) = locate_header(&lines);
    let columns = ColumnMap::resolve(&header, roles);
    debug!(?columns, "resolved column roles");

    let mut transactions = Vec::new();
    let mut data_lines = 0usize;
    for line in &lines[header_index + 1..] {
        let Some(record) = map_row(&header, tokenize_line(line)) else {
            continue;
        };
        data_lines += 1;
        if let Some(txn) = normalize_record(&record, &columns) {
            transactions.push(txn);
        }
    }

    let dropped = data_lines - transactions.len();
    if transactions.is_empty() {
        return Err(AppError::NoTransactions { data_lines });
    }
    debug!(parsed = transactions.len(), dropped, "parsed statement");

    Ok(Statement {
        header_index,
        header,
        transactions,
        dropped,
    })
}
