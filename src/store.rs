//! Queries over stored transactions: filtering, manual edits and cleanup.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use tracing::info;

use crate::db::resolve_category;
use crate::error::{AppError, Result};
use crate::models::{Transaction, TxnType};
use crate::statement::clean_description;

/// Selection applied to the transaction list, reports and export.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    /// `YYYY-MM`
    pub month: Option<String>,
    /// Matches either the category or the subcategory name.
    pub category: Option<String>,
    pub txn_type: Option<TxnType>,
    pub search: Option<String>,
    pub uncategorized: bool,
    /// Bounds on the absolute amount.
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

fn check_iso(label: &str, date: &str) -> Result<()> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::InvalidFilter(format!("{label} must be YYYY-MM-DD, got '{date}'")))
}

/// Tables the filter clause refers to: `t` transactions, `c` category, `sc` subcategory.
pub(crate) const FROM_JOINED: &str = "transactions t \
    LEFT JOIN categories c ON t.category_id = c.id \
    LEFT JOIN categories sc ON t.subcategory_id = sc.id";

impl TransactionFilter {
    /// SQL `WHERE` body and its positional parameters.
    pub(crate) fn clause(&self) -> Result<(String, Vec<Value>)> {
        let mut parts: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        match (&self.from, &self.to) {
            (Some(from), Some(to)) => {
                check_iso("--from", from)?;
                check_iso("--to", to)?;
                parts.push("t.date BETWEEN ? AND ?".to_string());
                params.push(Value::Text(from.clone()));
                params.push(Value::Text(to.clone()));
            }
            (Some(_), None) => {
                return Err(AppError::InvalidFilter(
                    "--from requires --to (both date boundaries must be specified)".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(AppError::InvalidFilter(
                    "--to requires --from (both date boundaries must be specified)".to_string(),
                ))
            }
            (None, None) => {}
        }
        if let Some(month) = &self.month {
            check_iso("--month", &format!("{month}-01"))
                .map_err(|_| AppError::InvalidFilter(format!("--month must be YYYY-MM, got '{month}'")))?;
            parts.push("t.date LIKE ?".to_string());
            params.push(Value::Text(format!("{month}-%")));
        }
        if let Some(category) = &self.category {
            parts.push("(c.name = ? COLLATE NOCASE OR sc.name = ? COLLATE NOCASE)".to_string());
            params.push(Value::Text(category.clone()));
            params.push(Value::Text(category.clone()));
        }
        if self.uncategorized {
            parts.push("t.category_id IS NULL".to_string());
        }
        if let Some(kind) = self.txn_type {
            parts.push("t.txn_type = ?".to_string());
            params.push(Value::Text(kind.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            parts.push("(t.description LIKE ? OR t.reference LIKE ? OR t.notes LIKE ?)".to_string());
            let needle = format!("%{search}%");
            for _ in 0..3 {
                params.push(Value::Text(needle.clone()));
            }
        }
        if let Some(min) = self.min_amount {
            parts.push("ABS(t.amount) >= ?".to_string());
            params.push(Value::Real(min));
        }
        if let Some(max) = self.max_amount {
            parts.push("ABS(t.amount) <= ?".to_string());
            params.push(Value::Real(max));
        }

        if parts.is_empty() {
            return Ok(("1 = 1".to_string(), params));
        }
        Ok((parts.join(" AND "), params))
    }
}

/// A stored transaction with its category names resolved.
#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub txn: Transaction,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<TransactionRow> {
    Ok(TransactionRow {
        txn: Transaction {
            id: row.get(0)?,
            date: row.get(1)?,
            value_date: row.get(2)?,
            description: row.get(3)?,
            reference: row.get(4)?,
            debit: row.get(5)?,
            credit: row.get(6)?,
            balance: row.get(7)?,
            amount: row.get(8)?,
            txn_type: row.get(9)?,
            category_id: row.get(10)?,
            subcategory_id: row.get(11)?,
            notes: row.get(12)?,
        },
        category: row.get(13)?,
        subcategory: row.get(14)?,
    })
}

/// Transactions matching `filter`, oldest first, file order within a day.
pub fn list_transactions(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<TransactionRow>> {
    let (clause, params) = filter.clause()?;
    let sql = format!(
        "SELECT t.id, t.date, t.value_date, t.description, t.reference, t.debit, t.credit, \
         t.balance, t.amount, t.txn_type, t.category_id, t.subcategory_id, t.notes, c.name, sc.name \
         FROM {FROM_JOINED} WHERE {clause} ORDER BY t.date ASC, t.rowid ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), map_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Resolve a full ID or a unique prefix of one.
pub fn find_transaction_id(conn: &Connection, id_or_prefix: &str) -> Result<String> {
    if id_or_prefix.is_empty() {
        return Err(AppError::UnknownTransaction(String::new()));
    }
    let mut stmt = conn.prepare("SELECT id FROM transactions WHERE id LIKE ?1 LIMIT 2")?;
    let ids: Vec<String> = stmt
        .query_map([format!("{id_or_prefix}%")], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match ids.as_slice() {
        [id] => Ok(id.clone()),
        [] => Err(AppError::UnknownTransaction(id_or_prefix.to_string())),
        _ => Err(AppError::Other(format!(
            "ID prefix '{id_or_prefix}' matches more than one transaction"
        ))),
    }
}

/// Assign (or with `None`, clear) the category of one transaction.
pub fn set_category(
    conn: &Connection,
    id_or_prefix: &str,
    category: Option<(&str, Option<&str>)>,
) -> Result<String> {
    let id = find_transaction_id(conn, id_or_prefix)?;
    let (cat_id, sub_id) = match category {
        Some((cat, sub)) => {
            let (c, s) = resolve_category(conn, cat, sub)?;
            (Some(c), s)
        }
        None => (None, None),
    };
    conn.execute(
        "UPDATE transactions SET category_id = ?1, subcategory_id = ?2 WHERE id = ?3",
        rusqlite::params![cat_id, sub_id, id],
    )?;
    Ok(id)
}

pub fn set_notes(conn: &Connection, id_or_prefix: &str, notes: &str) -> Result<String> {
    let id = find_transaction_id(conn, id_or_prefix)?;
    conn.execute(
        "UPDATE transactions SET notes = ?1 WHERE id = ?2",
        rusqlite::params![notes, id],
    )?;
    Ok(id)
}

pub fn get_transaction(conn: &Connection, id: &str) -> Result<Option<TransactionRow>> {
    let sql = format!(
        "SELECT t.id, t.date, t.value_date, t.description, t.reference, t.debit, t.credit, \
         t.balance, t.amount, t.txn_type, t.category_id, t.subcategory_id, t.notes, c.name, sc.name \
         FROM {FROM_JOINED} WHERE t.id = ?1"
    );
    Ok(conn.query_row(&sql, [id], map_row).optional()?)
}

/// Re-run description cleanup over every stored record. Returns how many
/// descriptions changed; a second run always returns 0.
pub fn clean_descriptions(conn: &mut Connection) -> Result<usize> {
    let tx = conn.transaction()?;
    let stored: Vec<(String, String)> = {
        let mut stmt = tx.prepare("SELECT id, description FROM transactions")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()?
    };

    let mut changed = 0usize;
    for (id, description) in &stored {
        let cleaned = clean_description(description);
        if cleaned.is_empty() || cleaned == *description {
            continue;
        }
        tx.execute(
            "UPDATE transactions SET description = ?1 WHERE id = ?2",
            rusqlite::params![cleaned, id],
        )?;
        changed += 1;
    }
    tx.commit()?;
    info!(changed, total = stored.len(), "cleaned stored descriptions");
    Ok(changed)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::importer::insert_transaction;

    pub(crate) fn txn(date: &str, description: &str, debit: f64, credit: f64) -> Transaction {
        let (amount, txn_type) = if credit > 0.0 {
            (credit, TxnType::Credit)
        } else {
            (-debit, TxnType::Debit)
        };
        Transaction {
            id: Transaction::new_id(),
            date: date.to_string(),
            value_date: None,
            description: description.to_string(),
            reference: String::new(),
            debit,
            credit,
            balance: 0.0,
            amount,
            txn_type,
            category_id: None,
            subcategory_id: None,
            notes: String::new(),
        }
    }

    pub(crate) fn seed(conn: &Connection) {
        let rows = [
            txn("2024-03-28", "RENT MARCH", 20000.0, 0.0),
            txn("2024-04-01", "SALARY ACME", 0.0, 90000.0),
            txn("2024-04-03", "SWIGGY ORDER", 450.0, 0.0),
            txn("2024-04-10", "BIG BASKET", 2300.0, 0.0),
            txn("2024-05-02", "SWIGGY ORDER", 600.0, 0.0),
        ];
        for t in &rows {
            insert_transaction(conn, t, None).unwrap();
        }
        let (food, delivery) = resolve_category(conn, "Food & Dining", Some("Food Delivery")).unwrap();
        conn.execute(
            "UPDATE transactions SET category_id = ?1, subcategory_id = ?2 WHERE description LIKE 'SWIGGY%'",
            rusqlite::params![food, delivery],
        )
        .unwrap();
        let (groceries_parent, groceries) = resolve_category(conn, "Food & Dining", Some("Groceries")).unwrap();
        conn.execute(
            "UPDATE transactions SET category_id = ?1, subcategory_id = ?2 WHERE description = 'BIG BASKET'",
            rusqlite::params![groceries_parent, groceries],
        )
        .unwrap();
        let (housing, _) = resolve_category(conn, "Housing", None).unwrap();
        conn.execute(
            "UPDATE transactions SET category_id = ?1 WHERE description = 'RENT MARCH'",
            [housing],
        )
        .unwrap();
    }

    fn descriptions(rows: &[TransactionRow]) -> Vec<&str> {
        rows.iter().map(|r| r.txn.description.as_str()).collect()
    }

    #[test]
    fn test_list_all_in_date_order() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let rows = list_transactions(&conn, &TransactionFilter::default()).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].txn.description, "RENT MARCH");
        assert_eq!(rows[0].category.as_deref(), Some("Housing"));
        assert_eq!(rows[1].txn.txn_type, TxnType::Credit);
    }

    #[test]
    fn test_filter_by_month_and_type() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let filter = TransactionFilter {
            month: Some("2024-04".to_string()),
            txn_type: Some(TxnType::Debit),
            ..Default::default()
        };
        let rows = list_transactions(&conn, &filter).unwrap();
        assert_eq!(descriptions(&rows), vec!["SWIGGY ORDER", "BIG BASKET"]);
    }

    #[test]
    fn test_filter_by_subcategory_name_and_search() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let by_sub = TransactionFilter {
            category: Some("groceries".to_string()),
            ..Default::default()
        };
        assert_eq!(descriptions(&list_transactions(&conn, &by_sub).unwrap()), vec!["BIG BASKET"]);

        let by_search = TransactionFilter {
            search: Some("swiggy".to_string()),
            min_amount: Some(500.0),
            ..Default::default()
        };
        let rows = list_transactions(&conn, &by_search).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].txn.date, "2024-05-02");
    }

    #[test]
    fn test_filter_uncategorized_and_range() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let filter = TransactionFilter {
            uncategorized: true,
            ..Default::default()
        };
        assert_eq!(descriptions(&list_transactions(&conn, &filter).unwrap()), vec!["SALARY ACME"]);

        let range = TransactionFilter {
            from: Some("2024-04-01".to_string()),
            to: Some("2024-04-30".to_string()),
            ..Default::default()
        };
        assert_eq!(list_transactions(&conn, &range).unwrap().len(), 3);
    }

    #[test]
    fn test_invalid_filters_rejected() {
        let half = TransactionFilter {
            from: Some("2024-04-01".to_string()),
            ..Default::default()
        };
        assert!(matches!(half.clause(), Err(AppError::InvalidFilter(_))));
        let bad_month = TransactionFilter {
            month: Some("April".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad_month.clause(), Err(AppError::InvalidFilter(_))));
    }

    #[test]
    fn test_set_category_and_notes_by_prefix() {
        let (_dir, conn) = test_db();
        let t = txn("2024-04-01", "SALARY ACME", 0.0, 90000.0);
        insert_transaction(&conn, &t, None).unwrap();

        let id = set_category(&conn, &t.id[..8], Some(("Income", Some("Salary")))).unwrap();
        assert_eq!(id, t.id);
        set_notes(&conn, &t.id, "April payroll").unwrap();

        let row = get_transaction(&conn, &t.id).unwrap().unwrap();
        assert_eq!(row.category.as_deref(), Some("Income"));
        assert_eq!(row.subcategory.as_deref(), Some("Salary"));
        assert_eq!(row.txn.notes, "April payroll");

        set_category(&conn, &t.id, None).unwrap();
        let row = get_transaction(&conn, &t.id).unwrap().unwrap();
        assert!(row.category.is_none());
    }

    #[test]
    fn test_unknown_transaction_id() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            set_notes(&conn, "deadbeef", "x"),
            Err(AppError::UnknownTransaction(_))
        ));
    }

    #[test]
    fn test_clean_descriptions_is_idempotent() {
        let (_dir, mut conn) = test_db();
        insert_transaction(&conn, &txn("2024-04-01", "UPI/DR/4455/CHAI  POINT", 20.0, 0.0), None).unwrap();
        insert_transaction(&conn, &txn("2024-04-02", "ALREADY CLEAN", 20.0, 0.0), None).unwrap();
        assert_eq!(clean_descriptions(&mut conn).unwrap(), 1);
        assert_eq!(clean_descriptions(&mut conn).unwrap(), 0);
        let rows = list_transactions(&conn, &TransactionFilter::default()).unwrap();
        assert_eq!(rows[0].txn.description, "CHAI POINT");
    }
}
