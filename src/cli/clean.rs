use crate::db;
use crate::error::Result;
use crate::settings::load_settings;
use crate::store::clean_descriptions;

pub fn run() -> Result<()> {
    let settings = load_settings()?;
    let mut conn = db::open(&settings)?;
    let changed = clean_descriptions(&mut conn)?;
    if changed == 0 {
        println!("All descriptions are already clean.");
    } else {
        println!("Cleaned {changed} descriptions");
    }
    Ok(())
}
