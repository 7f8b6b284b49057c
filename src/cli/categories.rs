use comfy_table::{Cell, Table};

use crate::categories::{add_category, delete_category, list_categories, rename_category};
use crate::db;
use crate::error::Result;
use crate::settings::load_settings;

fn label(name: &str, parent: Option<&str>) -> String {
    match parent {
        Some(p) => format!("{p} / {name}"),
        None => name.to_string(),
    }
}

pub fn add(name: &str, parent: Option<&str>) -> Result<()> {
    let conn = db::open(&load_settings()?)?;
    add_category(&conn, name, parent)?;
    println!("Added category: {}", label(name.trim(), parent));
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = db::open(&load_settings()?)?;
    let categories = list_categories(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Category", "Subcategory"]);
    for cat in categories {
        let (category, subcategory) = match cat.parent_id {
            None => (cat.name, String::new()),
            Some(_) => (String::new(), cat.name),
        };
        table.add_row(vec![Cell::new(cat.id), Cell::new(category), Cell::new(subcategory)]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn rename(name: &str, parent: Option<&str>, new_name: &str) -> Result<()> {
    let conn = db::open(&load_settings()?)?;
    rename_category(&conn, name, parent, new_name)?;
    println!("Renamed {} to: {new_name}", label(name, parent));
    Ok(())
}

pub fn delete(name: &str, parent: Option<&str>) -> Result<()> {
    let mut conn = db::open(&load_settings()?)?;
    let result = delete_category(&mut conn, name, parent)?;
    println!(
        "Deleted {}: {} transactions uncategorized, {} rules disabled",
        label(name, parent),
        result.transactions_cleared,
        result.rules_disabled
    );
    Ok(())
}
