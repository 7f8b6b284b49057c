use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::Transaction;
use crate::statement::{parse_statement, ColumnRoles};

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Same date, description and amount as a record stored by an earlier
/// import. Repeated rows within the current import are kept.
fn is_duplicate_row(conn: &Connection, txn: &Transaction, import_id: i64) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM transactions WHERE date = ?1 AND description = ?2 AND amount = ?3 \
         AND (import_id IS NULL OR import_id <> ?4)",
    )?;
    Ok(stmt.exists(rusqlite::params![txn.date, txn.description, txn.amount, import_id])?)
}

pub fn insert_transaction(conn: &Connection, txn: &Transaction, import_id: Option<i64>) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, date, value_date, description, reference, debit, credit, \
         balance, amount, txn_type, category_id, subcategory_id, notes, import_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        rusqlite::params![
            txn.id,
            txn.date,
            txn.value_date,
            txn.description,
            txn.reference,
            txn.debit,
            txn.credit,
            txn.balance,
            txn.amount,
            txn.txn_type,
            txn.category_id,
            txn.subcategory_id,
            txn.notes,
            import_id,
        ],
    )?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub dropped: usize,
    pub duplicate_file: bool,
}

/// Parse a statement file and store its transactions.
///
/// A file whose checksum was seen before is not parsed again. Rows already
/// present (same date, description and amount) are skipped.
pub fn import_file(conn: &mut Connection, file_path: &Path, roles: &ColumnRoles) -> Result<ImportResult> {
    let data = std::fs::read(file_path)?;
    let checksum = compute_checksum(&data);
    {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        if stmt.exists([&checksum])? {
            info!(file = %file_path.display(), "file already imported");
            return Ok(ImportResult {
                duplicate_file: true,
                ..ImportResult::default()
            });
        }
    }

    let text = String::from_utf8_lossy(&data);
    let statement = parse_statement(&text, roles)?;
    debug!(
        header_line = statement.header_index,
        columns = ?statement.header,
        "statement header"
    );

    let tx = conn.transaction()?;
    let dates: Vec<&str> = statement.transactions.iter().map(|t| t.date.as_str()).collect();
    tx.execute(
        "INSERT INTO imports (filename, checksum, record_count, dropped_count, date_range_start, date_range_end) \
         VALUES (?1, ?2, 0, ?3, ?4, ?5)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            checksum,
            statement.dropped as i64,
            dates.iter().min().copied(),
            dates.iter().max().copied(),
        ],
    )?;
    let import_id = tx.last_insert_rowid();

    let mut imported = 0usize;
    let mut skipped = 0usize;
    for txn in &statement.transactions {
        if is_duplicate_row(&tx, txn, import_id)? {
            skipped += 1;
            continue;
        }
        insert_transaction(&tx, txn, Some(import_id))?;
        imported += 1;
    }
    tx.execute(
        "UPDATE imports SET record_count = ?1 WHERE id = ?2",
        rusqlite::params![imported as i64, import_id],
    )?;
    tx.commit()?;

    info!(
        file = %file_path.display(),
        imported,
        skipped,
        dropped = statement.dropped,
        "import finished"
    );
    Ok(ImportResult {
        imported,
        skipped,
        dropped: statement.dropped,
        duplicate_file: false,
    })
}
