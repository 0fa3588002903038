use colored::Colorize;

use crate::cli::{open_store, resolve_month};
use crate::error::Result;
use crate::fmt::money;
use crate::reports::month_summary;

pub fn set(salary: f64, month: Option<String>) -> Result<()> {
    let (year, month) = resolve_month(month.as_deref())?;
    open_store()?.set_salary(year, month, salary)?;
    println!("Salary for {year:04}-{month:02}: {}", money(salary));
    Ok(())
}

pub fn show(month: Option<String>) -> Result<()> {
    let (year, month) = resolve_month(month.as_deref())?;
    let summary = month_summary(&open_store()?, year, month)?;

    println!("Budget {year:04}-{month:02}");
    println!("Salary:     {}", summary.salary.map(money).unwrap_or_else(|| "Not set".to_string()));
    println!("Spent:      {}", money(summary.total_spent));
    let remaining = match summary.remaining {
        Some(r) if r < 0.0 => money(r).red().bold().to_string(),
        Some(r) => money(r).green().to_string(),
        None => "N/A".to_string(),
    };
    println!("Remaining:  {remaining}");
    Ok(())
}
