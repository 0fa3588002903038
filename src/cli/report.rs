use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_store, resolve_month};
use crate::error::Result;
use crate::fmt::{installment, money};
use crate::reports;

pub fn month(month: Option<String>) -> Result<()> {
    let (y, m) = resolve_month(month.as_deref())?;
    let data = reports::month_summary(&open_store()?, y, m)?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "%", "Count", "Limit"]);
    for item in &data.by_category {
        let limit = if item.limit > 0.0 {
            let text = money(item.limit);
            if item.total > item.limit {
                text.red().to_string()
            } else {
                text
            }
        } else {
            String::new()
        };
        table.add_row(vec![
            Cell::new(&item.name),
            Cell::new(money(item.total)),
            Cell::new(format!("{:.1}%", item.pct)),
            Cell::new(item.count),
            Cell::new(limit),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(data.total_spent)),
        Cell::new(""),
        Cell::new(data.count),
        Cell::new(""),
    ]);
    println!("Spending {:04}-{:02}\n{table}", data.year, data.month);

    println!("Fixed expenses: {}", money(data.fixed_total));
    if let Some(remaining) = data.remaining {
        println!("Remaining budget: {}", money(remaining));
    }

    if !data.installments.is_empty() {
        let mut itable = Table::new();
        itable.set_header(vec!["Date", "Description", "Amount", "Installment"]);
        for e in &data.installments {
            if let Some(i) = e.installment {
                itable.add_row(vec![
                    Cell::new(e.date.format("%d/%m")),
                    Cell::new(&e.description),
                    Cell::new(money(e.amount)),
                    Cell::new(installment(i.current, i.total)),
                ]);
            }
        }
        println!("\nInstallments\n{itable}");
    }
    Ok(())
}

pub fn trend(month: Option<String>, months: u32) -> Result<()> {
    let (year, month) = resolve_month(month.as_deref())?;
    let data = reports::trend(&open_store()?, year, month, months)?;

    let mut table = Table::new();
    table.set_header(vec!["Month", "Total"]);
    for m in &data {
        table.add_row(vec![
            Cell::new(format!("{:04}-{:02}", m.year, m.month)),
            Cell::new(money(m.total)),
        ]);
    }
    println!("Monthly Trend\n{table}");
    Ok(())
}
