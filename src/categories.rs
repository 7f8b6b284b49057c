use rusqlite::{Connection, OptionalExtension};

use crate::db::{category_id, resolve_category};
use crate::error::{AppError, Result};
use crate::models::Category;

/// Active categories, each top-level category followed by its subcategories.
pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.parent_id FROM categories c \
         LEFT JOIN categories p ON c.parent_id = p.id \
         WHERE c.is_active = 1 \
         ORDER BY COALESCE(p.name, c.name) COLLATE NOCASE, c.parent_id IS NOT NULL, c.name COLLATE NOCASE",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn lookup(conn: &Connection, name: &str, parent: Option<&str>) -> Result<i64> {
    match parent {
        Some(p) => Ok(resolve_category(conn, p, Some(name))?
            .1
            .ok_or_else(|| AppError::UnknownCategory(name.to_string()))?),
        None => category_id(conn, name),
    }
}

fn exists(conn: &Connection, name: &str, parent_id: Option<i64>) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE name = ?1 COLLATE NOCASE AND parent_id IS ?2 AND is_active = 1",
            rusqlite::params![name, parent_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Add a category, or a subcategory when `parent` is given.
pub fn add_category(conn: &Connection, name: &str, parent: Option<&str>) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Other("Category name cannot be empty".to_string()));
    }
    let parent_id = parent.map(|p| category_id(conn, p)).transpose()?;
    if exists(conn, name, parent_id)? {
        return Err(AppError::Other(format!("Category '{name}' already exists")));
    }
    conn.execute(
        "INSERT INTO categories (name, parent_id) VALUES (?1, ?2)",
        rusqlite::params![name, parent_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn rename_category(conn: &Connection, name: &str, parent: Option<&str>, new_name: &str) -> Result<()> {
    let id = lookup(conn, name, parent)?;
    let parent_id: Option<i64> = conn.query_row(
        "SELECT parent_id FROM categories WHERE id = ?1",
        [id],
        |row| row.get(0),
    )?;
    if exists(conn, new_name, parent_id)? {
        return Err(AppError::Other(format!("Category '{new_name}' already exists")));
    }
    conn.execute(
        "UPDATE categories SET name = ?1 WHERE id = ?2",
        rusqlite::params![new_name.trim(), id],
    )?;
    Ok(())
}

pub struct DeleteResult {
    pub transactions_cleared: usize,
    pub rules_disabled: usize,
}

/// Deactivate a category (and, for a top-level one, its subcategories).
/// Transactions assigned to it become uncategorized and rules targeting it
/// are disabled.
pub fn delete_category(conn: &mut Connection, name: &str, parent: Option<&str>) -> Result<DeleteResult> {
    let id = lookup(conn, name, parent)?;
    let tx = conn.transaction()?;

    let mut ids = vec![id];
    {
        let mut stmt = tx.prepare("SELECT id FROM categories WHERE parent_id = ?1")?;
        let subs = stmt.query_map([id], |row| row.get::<_, i64>(0))?;
        for sub in subs {
            ids.push(sub?);
        }
    }

    let mut transactions_cleared = 0usize;
    let mut rules_disabled = 0usize;
    for cat in &ids {
        tx.execute("UPDATE categories SET is_active = 0 WHERE id = ?1", [cat])?;
        transactions_cleared += tx.execute(
            "UPDATE transactions SET category_id = NULL, subcategory_id = NULL WHERE category_id = ?1",
            [cat],
        )?;
        transactions_cleared += tx.execute(
            "UPDATE transactions SET subcategory_id = NULL WHERE subcategory_id = ?1",
            [cat],
        )?;
        rules_disabled += tx.execute(
            "UPDATE rules SET is_active = 0 WHERE is_active = 1 AND (category_id = ?1 OR subcategory_id = ?1)",
            [cat],
        )?;
    }
    tx.commit()?;

    Ok(DeleteResult {
        transactions_cleared,
        rules_disabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::importer::insert_transaction;
    use crate::store::tests::txn;

    #[test]
    fn test_list_groups_subcategories_under_parent() {
        let (_dir, conn) = test_db();
        let cats = list_categories(&conn).unwrap();
        let transport = cats.iter().position(|c| c.name == "Transport").unwrap();
        assert!(cats[transport].parent_id.is_none());
        assert_eq!(cats[transport + 1].parent_id, Some(cats[transport].id));
    }

    #[test]
    fn test_add_category_and_subcategory() {
        let (_dir, conn) = test_db();
        let pets = add_category(&conn, "Pets", None).unwrap();
        let vet = add_category(&conn, "Vet", Some("pets")).unwrap();
        let (cat, sub) = resolve_category(&conn, "Pets", Some("Vet")).unwrap();
        assert_eq!((cat, sub), (pets, Some(vet)));
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let (_dir, conn) = test_db();
        assert!(add_category(&conn, "transport", None).is_err());
        // Same name under a different parent is fine.
        add_category(&conn, "Online", Some("Entertainment")).unwrap();
    }

    #[test]
    fn test_rename() {
        let (_dir, conn) = test_db();
        rename_category(&conn, "Cabs", Some("Transport"), "Ride Hailing").unwrap();
        assert!(resolve_category(&conn, "Transport", Some("Ride Hailing")).is_ok());
        assert!(rename_category(&conn, "Fuel", Some("Transport"), "ride hailing").is_err());
    }

    #[test]
    fn test_delete_clears_assignments_and_rules() {
        let (_dir, mut conn) = test_db();
        let (cat, sub) = resolve_category(&conn, "Travel", Some("Flights")).unwrap();
        let mut t = txn("2024-04-01", "INDIGO", 5000.0, 0.0);
        t.category_id = Some(cat);
        t.subcategory_id = sub;
        insert_transaction(&conn, &t, None).unwrap();
        conn.execute(
            "INSERT INTO rules (pattern, category_id, subcategory_id) VALUES ('INDIGO', ?1, ?2)",
            rusqlite::params![cat, sub],
        )
        .unwrap();

        let result = delete_category(&mut conn, "Travel", None).unwrap();
        assert_eq!(result.transactions_cleared, 1);
        assert_eq!(result.rules_disabled, 1);
        assert!(matches!(category_id(&conn, "Travel"), Err(AppError::UnknownCategory(_))));
        let names: Vec<String> = list_categories(&conn).unwrap().into_iter().map(|c| c.name).collect();
        assert!(!names.contains(&"Flights".to_string()));
    }
}
