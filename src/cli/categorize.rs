use crate::categorizer::categorize_transactions;
use crate::db;
use crate::error::Result;
use crate::settings::load_settings;

pub fn run(all: bool) -> Result<()> {
    let settings = load_settings()?;
    let conn = db::open(&settings)?;
    let result = categorize_transactions(&conn, all)?;
    println!(
        "{} categorized, {} uncategorized",
        result.categorized, result.uncategorized
    );
    Ok(())
}
