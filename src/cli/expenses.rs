use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use crate::categorizer::CategoryTable;
use crate::cli::{open_store, resolve_month};
use crate::error::{CentavoError, Result};
use crate::fmt::{installment, money};
use crate::reports::group_similar;
use crate::models::{Expense, ExpenseEdit, NormalizedExpense};
use crate::normalizer::{decode_amount, extract_installment};

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CentavoError::decode("date", raw, "expected YYYY-MM-DD"))
}

fn expense_table(expenses: &[Expense]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Category", "Amount", "Fixed", "Installment"]);
    for e in expenses {
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(e.date.format("%d/%m/%Y")),
            Cell::new(&e.description),
            Cell::new(&e.category),
            Cell::new(money(e.amount)),
            Cell::new(if e.is_fixed_expense { "yes" } else { "" }),
            Cell::new(
                e.installment
                    .map(|i| installment(i.current, i.total))
                    .unwrap_or_default(),
            ),
        ]);
    }
    table
}

pub fn list(month: Option<String>, fixed: bool) -> Result<()> {
    let store = open_store()?;
    if fixed {
        let expenses = store.fixed_expenses()?;
        println!("Fixed expenses\n{}", expense_table(&expenses));
        return Ok(());
    }
    let (year, month) = resolve_month(month.as_deref())?;
    let expenses = store.expenses_by_month(year, month)?;
    println!("Expenses {year:04}-{month:02}\n{}", expense_table(&expenses));
    Ok(())
}

pub fn search(term: &str) -> Result<()> {
    let store = open_store()?;
    let expenses = store.search_by_description(term)?;
    println!("{} matches\n{}", expenses.len(), expense_table(&expenses));
    Ok(())
}

pub fn set_category(id: i64, category: &str) -> Result<()> {
    open_store()?.update_category(id, category)?;
    println!("Expense {id} moved to {category}");
    Ok(())
}

pub fn set_fixed(id: i64, off: bool) -> Result<()> {
    open_store()?.set_fixed_expense(id, !off)?;
    if off {
        println!("Expense {id} is no longer fixed");
    } else {
        println!("Expense {id} marked as fixed");
    }
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    open_store()?.delete_expense(id)?;
    println!("Deleted expense {id}");
    Ok(())
}

/// Record an expense by hand. Without `--category` the description goes
/// through the keyword table like an imported row.
pub fn add(date: &str, description: &str, amount: &str, category: Option<&str>, fixed: bool) -> Result<()> {
    let date = parse_date(date)?;
    if description.trim().is_empty() {
        return Err(CentavoError::EmptyDescription);
    }
    let amount = decode_amount(amount)?;

    let store = open_store()?;
    let category = match category {
        Some(name) => {
            if !store.category_exists(name)? {
                return Err(CentavoError::UnknownCategory(name.to_string()));
            }
            name.to_string()
        }
        None => {
            let name = CategoryTable::default().categorize(description).to_string();
            store.add_category_if_not_exists(&name, None, 0.0)?;
            name
        }
    };

    let id = store.add_expense(&NormalizedExpense {
        date,
        description: description.to_string(),
        amount,
        category: category.clone(),
        is_fixed_expense: fixed,
        installment: extract_installment(description),
    })?;
    println!("Added expense {id} ({category}, {})", money(amount));
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let expense = open_store()?.get_expense(id)?;
    println!("{}", expense_table(std::slice::from_ref(&expense)));
    Ok(())
}

pub fn edit(id: i64, date: Option<&str>, description: Option<String>, amount: Option<&str>) -> Result<()> {
    let edit = ExpenseEdit {
        date: date.map(parse_date).transpose()?,
        description,
        amount: amount.map(decode_amount).transpose()?,
    };
    let store = open_store()?;
    store.update_expense(id, &edit)?;
    println!("{}", expense_table(&[store.get_expense(id)?]));
    Ok(())
}

pub fn similar(term: &str) -> Result<()> {
    let groups = group_similar(open_store()?.search_by_description(term)?);
    let mut table = Table::new();
    table.set_header(vec!["Description", "Count", "Total", "Categories", "IDs"]);
    for group in &groups {
        let mut categories: Vec<&str> = group.expenses.iter().map(|e| e.category.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();
        let ids: Vec<String> = group.ids().iter().map(|id| id.to_string()).collect();
        table.add_row(vec![
            Cell::new(&group.description),
            Cell::new(group.expenses.len()),
            Cell::new(money(group.expenses.iter().map(|e| e.amount).sum())),
            Cell::new(categories.join(", ")),
            Cell::new(ids.join(" ")),
        ]);
    }
    println!("{} groups\n{table}", groups.len());
    Ok(())
}

/// With `exact`, only descriptions equal to `term` ignoring case are moved.
pub fn recategorize(term: &str, category: &str, exact: bool) -> Result<()> {
    let mut store = open_store()?;
    let needle = term.to_lowercase();
    let ids: Vec<i64> = store
        .search_by_description(term)?
        .into_iter()
        .filter(|e| !exact || e.description.to_lowercase() == needle)
        .map(|e| e.id)
        .collect();
    let updated = store.update_expenses(&ids, category)?;
    println!("Updated {updated} expenses to {category}");
    Ok(())
}
