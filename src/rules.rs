use regex::Regex;
use rusqlite::Connection;

use crate::db::resolve_category;
use crate::error::{AppError, Result};
use crate::models::{MatchType, Rule};

fn validate(pattern: &str, match_type: &str) -> Result<MatchType> {
    if pattern.trim().is_empty() {
        return Err(AppError::Other("Rule pattern cannot be empty".to_string()));
    }
    let match_type: MatchType = match_type.parse()?;
    if match_type == MatchType::Regex {
        Regex::new(pattern)?;
    }
    Ok(match_type)
}

pub fn add_rule(
    conn: &Connection,
    pattern: &str,
    category: &str,
    subcategory: Option<&str>,
    match_type: &str,
    priority: i64,
) -> Result<i64> {
    let match_type = validate(pattern, match_type)?;
    let (cat_id, sub_id) = resolve_category(conn, category, subcategory)?;
    conn.execute(
        "INSERT INTO rules (pattern, match_type, category_id, subcategory_id, priority) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![pattern, match_type.as_str(), cat_id, sub_id, priority],
    )?;
    Ok(conn.last_insert_rowid())
}

pub struct RuleRow {
    pub rule: Rule,
    pub category: String,
    pub subcategory: Option<String>,
    pub hit_count: i64,
}

/// Active rules in the order the categorizer tries them.
pub fn list_rules(conn: &Connection) -> Result<Vec<RuleRow>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.pattern, r.match_type, r.category_id, r.subcategory_id, r.priority, \
         c.name, sc.name, r.hit_count \
         FROM rules r JOIN categories c ON r.category_id = c.id \
         LEFT JOIN categories sc ON r.subcategory_id = sc.id \
         WHERE r.is_active = 1 ORDER BY r.priority DESC, r.id ASC",
    )?;
    let raw: Vec<(i64, String, String, i64, Option<i64>, i64, String, Option<String>, i64)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(id, pattern, match_type, category_id, subcategory_id, priority, category, subcategory, hit_count)| {
            Ok(RuleRow {
                rule: Rule {
                    id,
                    pattern,
                    match_type: match_type.parse()?,
                    category_id,
                    subcategory_id,
                    priority,
                },
                category,
                subcategory,
                hit_count,
            })
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct RuleUpdate<'a> {
    pub pattern: Option<&'a str>,
    pub category: Option<&'a str>,
    pub subcategory: Option<&'a str>,
    pub match_type: Option<&'a str>,
    pub priority: Option<i64>,
}

fn active_rule(conn: &Connection, id: i64) -> Result<(String, String, i64, Option<i64>, i64)> {
    conn.query_row(
        "SELECT pattern, match_type, category_id, subcategory_id, priority FROM rules WHERE id = ?1 AND is_active = 1",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::UnknownRule(id),
        other => AppError::Db(other),
    })
}

/// Change selected fields of a rule. A new category without a subcategory
/// clears the old subcategory.
pub fn update_rule(conn: &Connection, id: i64, update: &RuleUpdate<'_>) -> Result<()> {
    let (pattern, match_type, mut cat_id, mut sub_id, priority) = active_rule(conn, id)?;

    let pattern = update.pattern.unwrap_or(&pattern);
    let match_type = validate(pattern, update.match_type.unwrap_or(&match_type))?;
    if let Some(category) = update.category {
        (cat_id, sub_id) = resolve_category(conn, category, update.subcategory)?;
    } else if let Some(sub) = update.subcategory {
        let name: String = conn.query_row("SELECT name FROM categories WHERE id = ?1", [cat_id], |r| r.get(0))?;
        sub_id = resolve_category(conn, &name, Some(sub))?.1;
    }
    let priority = update.priority.unwrap_or(priority);

    conn.execute(
        "UPDATE rules SET pattern = ?1, match_type = ?2, category_id = ?3, subcategory_id = ?4, priority = ?5 WHERE id = ?6",
        rusqlite::params![pattern, match_type.as_str(), cat_id, sub_id, priority, id],
    )?;
    Ok(())
}

/// Deactivate a rule. Returns its pattern.
pub fn delete_rule(conn: &Connection, id: i64) -> Result<String> {
    let (pattern, ..) = active_rule(conn, id)?;
    conn.execute("UPDATE rules SET is_active = 0 WHERE id = ?1", [id])?;
    Ok(pattern)
}
