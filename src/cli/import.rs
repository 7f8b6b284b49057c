use std::path::PathBuf;

use crate::categorizer::categorize_transactions;
use crate::db;
use crate::error::Result;
use crate::importer::import_file;
use crate::settings::load_settings;

pub fn run(file: &str, no_categorize: bool) -> Result<()> {
    let settings = load_settings()?;
    let mut conn = db::open(&settings)?;
    let file_path = PathBuf::from(file);

    let result = import_file(&mut conn, &file_path, &settings.column_roles)?;

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    println!("{} imported, {} skipped (duplicates)", result.imported, result.skipped);
    if result.dropped > 0 {
        println!("{} rows dropped (no usable date or description)", result.dropped);
    }

    if !no_categorize {
        let cat_result = categorize_transactions(&conn, false)?;
        println!(
            "{} categorized, {} uncategorized",
            cat_result.categorized, cat_result.uncategorized
        );
    }
    Ok(())
}
