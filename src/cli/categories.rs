use comfy_table::{Cell, Table};

use crate::cli::open_store;
use crate::error::{CentavoError, Result};
use crate::fmt::money;

pub fn list() -> Result<()> {
    let store = open_store()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Color", "Budget Limit"]);
    for cat in store.all_categories()? {
        table.add_row(vec![
            Cell::new(cat.id),
            Cell::new(cat.name),
            Cell::new(cat.color),
            Cell::new(if cat.budget_limit > 0.0 { money(cat.budget_limit) } else { String::new() }),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn add(name: &str, color: Option<&str>, limit: f64) -> Result<()> {
    let store = open_store()?;
    if store.category_exists(name)? {
        return Err(CentavoError::Other(format!("Category already exists: {name}")));
    }
    store.add_category_if_not_exists(name, color, limit)?;
    println!("Added category: {name}");
    Ok(())
}

pub fn set_limit(name: &str, limit: f64) -> Result<()> {
    open_store()?.set_budget_limit(name, limit)?;
    println!("Budget limit for {name}: {}", money(limit));
    Ok(())
}

pub fn delete(name: &str) -> Result<()> {
    open_store()?.delete_category(name)?;
    println!("Deleted category: {name}");
    Ok(())
}

pub fn dedupe() -> Result<()> {
    let removed = open_store()?.cleanup_duplicate_categories()?;
    println!("Cleaned up {removed} duplicate categories");
    Ok(())
}
