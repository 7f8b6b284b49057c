use comfy_table::{Cell, Table};

use crate::db;
use crate::error::Result;
use crate::rules::{add_rule, delete_rule, list_rules, update_rule, RuleUpdate};
use crate::settings::load_settings;

fn target(category: &str, subcategory: Option<&str>) -> String {
    match subcategory {
        Some(sub) => format!("{category} / {sub}"),
        None => category.to_string(),
    }
}

pub fn add(
    pattern: &str,
    category: &str,
    subcategory: Option<&str>,
    match_type: &str,
    priority: i64,
) -> Result<()> {
    let conn = db::open(&load_settings()?)?;
    let id = add_rule(&conn, pattern, category, subcategory, match_type, priority)?;
    println!("Added rule {id}: '{pattern}' \u{2192} {}", target(category, subcategory));
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = db::open(&load_settings()?)?;
    let rows = list_rules(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Pattern", "Type", "Category", "Priority", "Hits"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.rule.id),
            Cell::new(&row.rule.pattern),
            Cell::new(row.rule.match_type.as_str()),
            Cell::new(target(&row.category, row.subcategory.as_deref())),
            Cell::new(row.rule.priority),
            Cell::new(row.hit_count),
        ]);
    }
    println!("Rules\n{table}");
    Ok(())
}

pub fn update(id: i64, update: RuleUpdate<'_>) -> Result<()> {
    let conn = db::open(&load_settings()?)?;
    update_rule(&conn, id, &update)?;
    println!("Updated rule {id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = db::open(&load_settings()?)?;
    let pattern = delete_rule(&conn, id)?;
    println!("Deleted rule {id}: '{pattern}'");
    Ok(())
}
