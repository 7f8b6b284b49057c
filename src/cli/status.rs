use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::reports::totals;
use crate::settings::{load_settings, settings_path};
use crate::store::TransactionFilter;

pub fn run() -> Result<()> {
    let settings = load_settings()?;
    let db_path = settings.db_path();

    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `spendbook init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    let summary = totals(&conn, &TransactionFilter::default())?;
    let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;
    let uncategorized: i64 = conn.query_row(
        "SELECT count(*) FROM transactions WHERE category_id IS NULL",
        [],
        |r| r.get(0),
    )?;
    let rules: i64 = conn.query_row("SELECT count(*) FROM rules WHERE is_active = 1", [], |r| r.get(0))?;

    println!();
    println!("Imports:        {imports}");
    println!("Transactions:   {}", summary.count);
    println!("Uncategorized:  {uncategorized}");
    println!("Rules:          {rules}");
    if let (Some(first), Some(last)) = (&summary.first_date, &summary.last_date) {
        println!("Date range:     {first} to {last}");
    }
    println!("Income:         {}", money(summary.income, &settings.currency_symbol));
    println!("Spending:       {}", money(summary.spending, &settings.currency_symbol));
    Ok(())
}
