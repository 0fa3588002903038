use crate::db::get_connection;
use crate::error::Result;
use crate::settings::{get_data_dir, load_settings, DB_FILE};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = get_data_dir();
    let db_path = data_dir.join(DB_FILE);

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!("Row policy: {}", settings.row_policy);

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        let expenses: i64 = conn.query_row("SELECT count(*) FROM expenses", [], |r| r.get(0))?;
        let fixed: i64 = conn.query_row(
            "SELECT count(*) FROM expenses WHERE is_fixed_expense = 1",
            [],
            |r| r.get(0),
        )?;
        let categories: i64 = conn.query_row("SELECT count(*) FROM categories", [], |r| r.get(0))?;
        let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;

        println!();
        println!("Expenses:    {expenses}");
        println!("Fixed:       {fixed}");
        println!("Categories:  {categories}");
        println!("Imports:     {imports}");
    } else {
        println!();
        println!("Database not found. Run `centavo init` to set up.");
    }

    Ok(())
}
