use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::error::{AppError, Result};
use crate::settings::Settings;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    parent_id INTEGER,
    is_active INTEGER DEFAULT 1,
    FOREIGN KEY (parent_id) REFERENCES categories(id)
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    checksum TEXT NOT NULL,
    record_count INTEGER,
    dropped_count INTEGER,
    date_range_start TEXT,
    date_range_end TEXT,
    import_date TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    value_date TEXT,
    description TEXT NOT NULL,
    reference TEXT NOT NULL DEFAULT '',
    debit REAL NOT NULL DEFAULT 0,
    credit REAL NOT NULL DEFAULT 0,
    balance REAL NOT NULL DEFAULT 0,
    amount REAL NOT NULL,
    txn_type TEXT NOT NULL,
    category_id INTEGER,
    subcategory_id INTEGER,
    notes TEXT NOT NULL DEFAULT '',
    import_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (subcategory_id) REFERENCES categories(id),
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_signature
    ON transactions (date, description, amount);

CREATE TABLE IF NOT EXISTS rules (
    id INTEGER PRIMARY KEY,
    pattern TEXT NOT NULL,
    match_type TEXT DEFAULT 'contains',
    category_id INTEGER NOT NULL,
    subcategory_id INTEGER,
    priority INTEGER DEFAULT 0,
    hit_count INTEGER DEFAULT 0,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (subcategory_id) REFERENCES categories(id)
);
";

// (category, subcategories)
const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Income", &["Salary", "Interest", "Refunds"]),
    ("Food & Dining", &["Groceries", "Restaurants", "Food Delivery"]),
    ("Transport", &["Fuel", "Cabs", "Public Transport"]),
    ("Shopping", &["Online", "Clothing", "Electronics"]),
    ("Bills & Utilities", &["Electricity", "Mobile & Internet", "Water", "Gas"]),
    ("Housing", &["Rent", "Maintenance"]),
    ("Health", &["Medical", "Pharmacy", "Insurance"]),
    ("Entertainment", &["Subscriptions", "Movies & Events"]),
    ("Travel", &["Flights", "Hotels"]),
    ("Education", &[]),
    ("Investments", &["Mutual Funds", "Stocks", "Deposits"]),
    ("Transfers", &["Self Transfer", "Family"]),
    ("Cash Withdrawal", &[]),
    ("Fees & Charges", &[]),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Open the database configured in `settings`, failing with a hint when
/// `spendbook init` has not been run.
pub fn open(settings: &Settings) -> Result<Connection> {
    let path = settings.db_path();
    if !path.exists() {
        return Err(AppError::Other(format!(
            "Database not found at {}. Run `spendbook init` first.",
            path.display()
        )));
    }
    get_connection(&path)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (name, subs) in DEFAULT_CATEGORIES {
            conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
            let parent = conn.last_insert_rowid();
            for sub in *subs {
                conn.execute(
                    "INSERT INTO categories (name, parent_id) VALUES (?1, ?2)",
                    rusqlite::params![sub, parent],
                )?;
            }
        }
    }
    Ok(())
}

/// Look up an active top-level category by name (case-insensitive).
pub fn category_id(conn: &Connection, name: &str) -> Result<i64> {
    conn.query_row(
        "SELECT id FROM categories WHERE name = ?1 COLLATE NOCASE AND parent_id IS NULL AND is_active = 1",
        [name],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| AppError::UnknownCategory(name.to_string()))
}

/// Look up an active subcategory of `parent_id` by name (case-insensitive).
pub fn subcategory_id(conn: &Connection, parent_id: i64, name: &str) -> Result<i64> {
    conn.query_row(
        "SELECT id FROM categories WHERE name = ?1 COLLATE NOCASE AND parent_id = ?2 AND is_active = 1",
        rusqlite::params![name, parent_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| AppError::UnknownCategory(name.to_string()))
}

/// Resolve a category name and optional subcategory name to IDs.
pub fn resolve_category(
    conn: &Connection,
    category: &str,
    subcategory: Option<&str>,
) -> Result<(i64, Option<i64>)> {
    let cat_id = category_id(conn, category)?;
    let sub_id = subcategory
        .map(|s| subcategory_id(conn, cat_id, s))
        .transpose()?;
    Ok((cat_id, sub_id))
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    init_db(&conn).unwrap();
    (dir, conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["categories", "transactions", "rules", "imports"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        let before: i64 = conn.query_row("SELECT count(*) FROM categories", [], |r| r.get(0)).unwrap();
        init_db(&conn).unwrap();
        let after: i64 = conn.query_row("SELECT count(*) FROM categories", [], |r| r.get(0)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_seeded_subcategories_have_parents() {
        let (_dir, conn) = test_db();
        let (cat, sub) = resolve_category(&conn, "food & dining", Some("Groceries")).unwrap();
        let parent: Option<i64> = conn
            .query_row("SELECT parent_id FROM categories WHERE id = ?1", [sub.unwrap()], |r| r.get(0))
            .unwrap();
        assert_eq!(parent, Some(cat));
    }

    #[test]
    fn test_unknown_category() {
        let (_dir, conn) = test_db();
        assert!(matches!(category_id(&conn, "Yachts"), Err(AppError::UnknownCategory(_))));
        assert!(matches!(
            resolve_category(&conn, "Transport", Some("Groceries")),
            Err(AppError::UnknownCategory(_))
        ));
    }
}
